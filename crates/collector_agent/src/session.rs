use chrono::{DateTime, Utc};
use common::domain::IssuedToken;

/// Bearer token currently held by one agent
#[derive(Debug, Default)]
pub struct TokenSession {
    token: Option<IssuedToken>,
}

impl TokenSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// No token and an expired token are handled the same way
    pub fn needs_renewal(&self, now: DateTime<Utc>) -> bool {
        self.token
            .as_ref()
            .is_none_or(|token| token.is_expired_at(now))
    }

    /// Token value, if one is held and still usable at `now`
    pub fn usable_token(&self, now: DateTime<Utc>) -> Option<&str> {
        self.token
            .as_ref()
            .filter(|token| !token.is_expired_at(now))
            .map(|token| token.value.as_str())
    }

    pub fn store(&mut self, token: IssuedToken) {
        self.token = Some(token);
    }

    pub fn clear(&mut self) {
        self.token = None;
    }
}
