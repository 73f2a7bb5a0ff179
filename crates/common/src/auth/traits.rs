use crate::domain::{DomainResult, IssuedToken};
use chrono::{DateTime, Utc};

/// Trait for bearer token operations (JWT access tokens)
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait AuthTokenProvider: Send + Sync {
    /// Mint a token for `subject` that expires at `expires_at`
    fn generate_token(&self, subject: &str, expires_at: DateTime<Utc>)
        -> DomainResult<IssuedToken>;

    /// Validate a token and return its subject
    fn validate_token(&self, token: &str) -> DomainResult<String>;
}

/// Trait for hashing and verifying collector secrets
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SecretHasher: Send + Sync {
    /// Hash a plaintext secret into a PHC string
    fn hash_secret(&self, secret: &str) -> DomainResult<String>;

    /// Check a plaintext secret against a PHC string
    fn verify_secret(&self, secret: &str, hash: &str) -> DomainResult<bool>;
}
