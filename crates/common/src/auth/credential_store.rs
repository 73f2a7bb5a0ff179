use crate::auth::{CredentialStoreConfig, SecretHasher};
use crate::domain::{CredentialCheck, CredentialStore, DomainResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Credential store backed by a fixed set of `(username, secret hash)` entries
pub struct StaticCredentialStore {
    entries: HashMap<String, String>,
    hasher: Arc<dyn SecretHasher>,
    config: CredentialStoreConfig,
}

impl StaticCredentialStore {
    pub fn new(hasher: Arc<dyn SecretHasher>, config: CredentialStoreConfig) -> Self {
        Self {
            entries: HashMap::new(),
            hasher,
            config,
        }
    }

    /// Register a collector identity with an already hashed secret
    pub fn with_entry(mut self, username: impl Into<String>, secret_hash: impl Into<String>) -> Self {
        self.entries.insert(username.into(), secret_hash.into());
        self
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn check(&self, username: &str, password: &str) -> DomainResult<CredentialCheck> {
        let Some(hash) = self.entries.get(username) else {
            debug!(username = %username, "unknown collector username");
            return Ok(CredentialCheck::Invalid);
        };

        if !self.hasher.verify_secret(password, hash)? {
            debug!(username = %username, "collector secret mismatch");
            return Ok(CredentialCheck::Invalid);
        }

        Ok(CredentialCheck::Valid {
            expires_at: Utc::now() + self.config.token_lifetime,
        })
    }
}
