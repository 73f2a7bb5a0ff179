use tonic::metadata::MetadataMap;
use tonic::{Request, Status};

/// Collector identity attached to a request once its bearer token is accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedCollector {
    pub subject: String,
}

/// Extract the bearer token from gRPC metadata
///
/// Expects `authorization: Bearer <token>`. Missing, non-ASCII or differently
/// schemed headers are rejected as unauthenticated.
pub fn extract_bearer_token(metadata: &MetadataMap) -> Result<&str, Status> {
    let auth_header = metadata
        .get("authorization")
        .ok_or_else(|| Status::unauthenticated("Missing authorization header"))?
        .to_str()
        .map_err(|_| Status::unauthenticated("Invalid authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .map(str::trim)
        .ok_or_else(|| {
            Status::unauthenticated("Invalid authorization format, expected 'Bearer <token>'")
        })?;

    if token.is_empty() {
        return Err(Status::unauthenticated("Empty bearer token"));
    }

    Ok(token)
}

/// Collector identity recorded by the auth gate, if any
pub fn authenticated_collector<T>(request: &Request<T>) -> Option<&AuthenticatedCollector> {
    request.extensions().get::<AuthenticatedCollector>()
}
