//! Garde validation utilities.

use crate::domain::DomainError;
use garde::{Report, Validate};

/// Validate a struct, turning a garde report into `DomainError::ValidationError`
pub fn validate_struct<T>(value: &T) -> Result<(), DomainError>
where
    T: Validate,
    T::Context: Default,
{
    value
        .validate()
        .map_err(|report| DomainError::ValidationError(describe_report(&report)))
}

/// Flatten a garde report into "path: message" pairs
fn describe_report(report: &Report) -> String {
    report
        .iter()
        .map(|(path, error)| {
            let path = path.to_string();
            if path.is_empty() {
                error.message().to_string()
            } else {
                format!("{}: {}", path, error.message())
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Credential;

    #[test]
    fn test_valid_credential_passes() {
        let credential = Credential::new("collector", "s3cret");
        assert!(validate_struct(&credential).is_ok());
    }

    #[test]
    fn test_empty_username_reports_field() {
        let credential = Credential::new("", "s3cret");
        match validate_struct(&credential) {
            Err(DomainError::ValidationError(msg)) => assert!(msg.contains("username")),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_both_fields_reported() {
        let credential = Credential::new("", "");
        match validate_struct(&credential) {
            Err(DomainError::ValidationError(msg)) => {
                assert!(msg.contains("username"));
                assert!(msg.contains("secret"));
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }
}
