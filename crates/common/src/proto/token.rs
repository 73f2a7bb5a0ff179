use crate::domain::{Credential, DomainResult, IssuedToken, TokenIssuance};
use crate::proto::{datetime_to_timestamp, timestamp_to_datetime};
use meter_proto::meter_reading::v1::{TokenRequest, TokenResponse};

/// Convert protobuf TokenRequest to domain Credential
pub fn to_domain_credential(request: TokenRequest) -> Credential {
    Credential {
        username: request.username,
        secret: request.password,
    }
}

/// Convert domain Credential to protobuf TokenRequest
pub fn to_proto_token_request(credential: &Credential) -> TokenRequest {
    TokenRequest {
        username: credential.username.clone(),
        password: credential.secret.clone(),
    }
}

/// Convert a token issuance to the wire response.
///
/// A denied request carries no token and no expiration.
pub fn to_proto_token_response(issuance: TokenIssuance) -> TokenResponse {
    match issuance {
        TokenIssuance::Issued(token) => TokenResponse {
            success: true,
            token: token.value,
            expiration: Some(datetime_to_timestamp(token.expires_at)),
        },
        TokenIssuance::Denied => TokenResponse {
            success: false,
            token: String::new(),
            expiration: None,
        },
    }
}

/// Convert protobuf TokenResponse to a domain issuance.
///
/// A "successful" response missing its token or expiration is treated as denied.
pub fn to_domain_token_issuance(response: TokenResponse) -> DomainResult<TokenIssuance> {
    if !response.success || response.token.is_empty() {
        return Ok(TokenIssuance::Denied);
    }

    let Some(expiration) = response.expiration else {
        return Ok(TokenIssuance::Denied);
    };

    Ok(TokenIssuance::Issued(IssuedToken {
        value: response.token,
        expires_at: timestamp_to_datetime(&expiration)?,
    }))
}
