use crate::domain::DomainError;
use crate::grpc::validation_rejection_to_status;
use tonic::Status;
use tracing::error;

/// Message returned for faults whose detail must stay server-side
pub const INTERNAL_FAULT_MESSAGE: &str = "Internal error processing request";

/// Convert domain error to gRPC Status
///
/// Internal faults are logged with full detail here and leave the process as a
/// generic `INTERNAL` status.
pub fn domain_error_to_status(error: DomainError) -> Status {
    match error {
        DomainError::ValidationRejected(rejection) => validation_rejection_to_status(&rejection),

        DomainError::InvalidReading(msg) | DomainError::ValidationError(msg) => {
            Status::invalid_argument(msg)
        }

        DomainError::InvalidToken(msg) => {
            Status::unauthenticated(format!("Invalid token: {}", msg))
        }

        DomainError::TokenGenerationError(_)
        | DomainError::PasswordHashingError(_)
        | DomainError::RepositoryError(_) => {
            error!(error = %error, "internal fault while handling request");
            Status::internal(INTERNAL_FAULT_MESSAGE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationRejection;
    use tonic::Code;

    #[test]
    fn test_rejection_maps_to_out_of_range() {
        let status = domain_error_to_status(DomainError::ValidationRejected(ValidationRejection {
            field: "value".to_string(),
            bad_value: "12".to_string(),
            message: "Readings are invalid".to_string(),
        }));
        assert_eq!(status.code(), Code::OutOfRange);
        assert_eq!(
            status.metadata().get("bad-value").unwrap().to_str().unwrap(),
            "12"
        );
    }

    #[test]
    fn test_invalid_reading_maps_to_invalid_argument() {
        let status =
            domain_error_to_status(DomainError::InvalidReading("missing time".to_string()));
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[test]
    fn test_invalid_token_maps_to_unauthenticated() {
        let status = domain_error_to_status(DomainError::InvalidToken("expired".to_string()));
        assert_eq!(status.code(), Code::Unauthenticated);
    }

    #[test]
    fn test_repository_error_does_not_leak_detail() {
        let status = domain_error_to_status(DomainError::RepositoryError(anyhow::anyhow!(
            "connection refused to db-primary:5432"
        )));
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), INTERNAL_FAULT_MESSAGE);
        assert!(!status.message().contains("db-primary"));
    }
}
