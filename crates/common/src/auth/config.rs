use chrono::Duration;

/// Configuration for JWT bearer tokens
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

impl JwtConfig {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }
}

/// Configuration for the static collector credential store
#[derive(Debug, Clone)]
pub struct CredentialStoreConfig {
    /// Lifetime of tokens minted for a successful credential check
    pub token_lifetime: Duration,
}

impl CredentialStoreConfig {
    pub fn with_lifetime_minutes(minutes: i64) -> Self {
        Self {
            token_lifetime: Duration::minutes(minutes),
        }
    }
}
