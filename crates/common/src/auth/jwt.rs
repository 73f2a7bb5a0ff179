use crate::auth::{AuthTokenProvider, JwtConfig};
use crate::domain::{DomainError, DomainResult, IssuedToken};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims carried by collector bearer tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct CollectorClaims {
    pub sub: String, // collector username
    pub exp: i64,
    pub iat: i64,
    pub jti: String, // unique per issuance
}

/// JWT-based implementation of AuthTokenProvider
pub struct JwtAuthTokenProvider {
    config: JwtConfig,
}

impl JwtAuthTokenProvider {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    fn strict_validation() -> Validation {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation
    }
}

impl AuthTokenProvider for JwtAuthTokenProvider {
    fn generate_token(
        &self,
        subject: &str,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<IssuedToken> {
        let now = Utc::now();
        let exp = expires_at.timestamp();

        if exp <= now.timestamp() {
            return Err(DomainError::TokenGenerationError(
                "Token expiry must be in the future".to_string(),
            ));
        }

        let claims = CollectorClaims {
            sub: subject.to_string(),
            exp,
            iat: now.timestamp(),
            jti: xid::new().to_string(),
        };

        let value = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?;

        // The wire format only carries whole seconds
        let expires_at = DateTime::from_timestamp(exp, 0).ok_or_else(|| {
            DomainError::TokenGenerationError(format!("Invalid expiry timestamp: {}", exp))
        })?;

        Ok(IssuedToken { value, expires_at })
    }

    fn validate_token(&self, token: &str) -> DomainResult<String> {
        let token_data = decode::<CollectorClaims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &Self::strict_validation(),
        )
        .map_err(|e| DomainError::InvalidToken(e.to_string()))?;

        // jsonwebtoken still accepts a token during its `exp` second
        if token_data.claims.exp <= Utc::now().timestamp() {
            return Err(DomainError::InvalidToken("Token has expired".to_string()));
        }

        Ok(token_data.claims.sub)
    }
}
