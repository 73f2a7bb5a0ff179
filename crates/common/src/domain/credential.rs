use crate::domain::result::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use garde::Validate;
use std::fmt;

/// Collector identity presented when requesting a token. Never persisted.
#[derive(Clone, PartialEq, Eq, Validate)]
pub struct Credential {
    #[garde(length(min = 1))]
    pub username: String,
    #[garde(length(min = 1))]
    pub secret: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Result of checking credentials against the credential store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialCheck {
    /// Credentials matched; tokens minted for them expire at `expires_at`
    Valid { expires_at: DateTime<Utc> },
    Invalid,
}

/// Lookup of collector credentials
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn check(&self, username: &str, password: &str) -> DomainResult<CredentialCheck>;
}

/// Bearer token handed to a collector
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// A token is usable strictly before its expiry instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Outcome of a token request. Bad credentials are an expected result, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenIssuance {
    Issued(IssuedToken),
    Denied,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_credential_debug_redacts_secret() {
        let credential = Credential::new("collector-7", "hunter2");
        let debug = format!("{:?}", credential);
        assert!(debug.contains("collector-7"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_credential_validation_rejects_empty_fields() {
        assert!(Credential::new("collector", "secret").validate().is_ok());
        assert!(Credential::new("", "secret").validate().is_err());
        assert!(Credential::new("collector", "").validate().is_err());
    }

    #[test]
    fn test_token_expiry_boundary() {
        let now = Utc::now();
        let token = IssuedToken {
            value: "abc".to_string(),
            expires_at: now,
        };

        assert!(token.is_expired_at(now));
        assert!(token.is_expired_at(now + Duration::seconds(1)));
        assert!(!token.is_expired_at(now - Duration::seconds(1)));
    }
}
