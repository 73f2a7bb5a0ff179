use std::fmt;
use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Context describing why a reading failed the plausibility check.
///
/// Travels with the error instead of being folded into a message so callers on
/// both sides of the RPC boundary can read the fields programmatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRejection {
    pub field: String,
    pub bad_value: String,
    pub message: String,
}

impl fmt::Display for ValidationRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}={})", self.message, self.field, self.bad_value)
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Reading rejected: {0}")]
    ValidationRejected(ValidationRejection),

    #[error("Invalid reading: {0}")]
    InvalidReading(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Password hashing error: {0}")]
    PasswordHashingError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),
}
