use crate::auth::SecretHasher;
use crate::domain::{DomainError, DomainResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};

/// Argon2id implementation of SecretHasher
#[derive(Default)]
pub struct Argon2SecretHasher;

impl Argon2SecretHasher {
    pub fn new() -> Self {
        Self
    }
}

impl SecretHasher for Argon2SecretHasher {
    fn hash_secret(&self, secret: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::PasswordHashingError(e.to_string()))
    }

    fn verify_secret(&self, secret: &str, hash: &str) -> DomainResult<bool> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| DomainError::PasswordHashingError(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_phc_string() {
        let hash = Argon2SecretHasher::new()
            .hash_secret("collector-secret")
            .unwrap();
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_verify_roundtrip() {
        let hasher = Argon2SecretHasher::new();
        let hash = hasher.hash_secret("collector-secret").unwrap();

        assert!(hasher.verify_secret("collector-secret", &hash).unwrap());
        assert!(!hasher.verify_secret("wrong-secret", &hash).unwrap());
    }

    #[test]
    fn test_verify_malformed_hash() {
        let result = Argon2SecretHasher::new().verify_secret("anything", "plaintext-not-a-hash");
        assert!(matches!(result, Err(DomainError::PasswordHashingError(_))));
    }
}
