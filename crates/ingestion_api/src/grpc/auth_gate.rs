use std::sync::Arc;
use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::debug;

use crate::domain::TokenService;
use common::auth::{AuthenticatedCollector, extract_bearer_token};
use common::grpc::GrpcMethodPath;
use meter_proto::meter_reading::v1::CREATE_TOKEN_PATH;

/// Bearer token check run before any handler.
///
/// Calls on the allow-list pass through untouched. Every other call needs a
/// valid token; requests whose path was not recorded are treated as
/// protected. On success the collector identity is added to the request
/// extensions as [`AuthenticatedCollector`].
#[derive(Clone)]
pub struct AuthGate {
    token_service: Arc<TokenService>,
    public_paths: Arc<Vec<String>>,
}

impl AuthGate {
    /// Gate with only `CreateToken` open
    pub fn new(token_service: Arc<TokenService>) -> Self {
        Self::with_public_paths(token_service, vec![CREATE_TOKEN_PATH.to_string()])
    }

    pub fn with_public_paths(token_service: Arc<TokenService>, public_paths: Vec<String>) -> Self {
        Self {
            token_service,
            public_paths: Arc::new(public_paths),
        }
    }

    fn is_public(&self, path: Option<&GrpcMethodPath>) -> bool {
        path.is_some_and(|path| self.public_paths.iter().any(|p| p == path.as_str()))
    }
}

impl Interceptor for AuthGate {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        if self.is_public(request.extensions().get::<GrpcMethodPath>()) {
            return Ok(request);
        }

        let token = extract_bearer_token(request.metadata())?;
        let subject = self.token_service.authenticate(token).map_err(|e| {
            debug!(error = %e, "bearer token rejected");
            Status::unauthenticated("Invalid or expired token")
        })?;

        request
            .extensions_mut()
            .insert(AuthenticatedCollector { subject });
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::auth::MockAuthTokenProvider;
    use common::domain::{DomainError, MockCredentialStore};
    use tonic::Code;

    const ADD_BATCH_PATH: &str = "/meter_reading.v1.MeterReadingService/AddReadingBatch";

    fn gate() -> AuthGate {
        let mut provider = MockAuthTokenProvider::new();
        provider.expect_validate_token().returning(|token| match token {
            "valid-token" => Ok("collector".to_string()),
            _ => Err(DomainError::InvalidToken("signature mismatch".to_string())),
        });
        AuthGate::new(Arc::new(TokenService::new(
            Arc::new(MockCredentialStore::new()),
            Arc::new(provider),
        )))
    }

    fn request(path: Option<&str>, authorization: Option<&str>) -> Request<()> {
        let mut request = Request::new(());
        if let Some(path) = path {
            request
                .extensions_mut()
                .insert(GrpcMethodPath(path.to_string()));
        }
        if let Some(value) = authorization {
            request
                .metadata_mut()
                .insert("authorization", value.parse().unwrap());
        }
        request
    }

    #[test]
    fn test_create_token_passes_without_header() {
        let result = gate().call(request(Some(CREATE_TOKEN_PATH), None));
        let passed = result.unwrap();
        assert!(passed.extensions().get::<AuthenticatedCollector>().is_none());
    }

    #[test]
    fn test_protected_call_without_header_is_unauthenticated() {
        let status = gate().call(request(Some(ADD_BATCH_PATH), None)).unwrap_err();
        assert_eq!(status.code(), Code::Unauthenticated);
    }

    #[test]
    fn test_protected_call_with_bad_token_is_unauthenticated() {
        let status = gate()
            .call(request(Some(ADD_BATCH_PATH), Some("Bearer forged")))
            .unwrap_err();
        assert_eq!(status.code(), Code::Unauthenticated);
    }

    #[test]
    fn test_valid_token_attaches_collector() {
        let passed = gate()
            .call(request(Some(ADD_BATCH_PATH), Some("Bearer valid-token")))
            .unwrap();
        assert_eq!(
            passed.extensions().get::<AuthenticatedCollector>(),
            Some(&AuthenticatedCollector {
                subject: "collector".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_path_fails_closed() {
        let status = gate().call(request(None, None)).unwrap_err();
        assert_eq!(status.code(), Code::Unauthenticated);
    }
}
