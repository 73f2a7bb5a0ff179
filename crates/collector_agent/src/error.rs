use common::domain::{DomainError, ValidationRejection};
use common::grpc::validation_rejection_from_status;
use thiserror::Error;
use tonic::{Code, Status};

/// Failure of a call from the collector to the ingestion service
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Reading rejected by server: {0}")]
    ValidationRejected(ValidationRejection),

    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    #[error("Server returned {code:?}: {message}")]
    Server { code: Code, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// The held token should be dropped and re-issued
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ClientError::Unauthenticated(_))
    }
}

impl From<Status> for ClientError {
    fn from(status: Status) -> Self {
        if let Some(rejection) = validation_rejection_from_status(&status) {
            return ClientError::ValidationRejected(rejection);
        }

        match status.code() {
            Code::Unauthenticated => ClientError::Unauthenticated(status.message().to_string()),
            code => ClientError::Server {
                code,
                message: status.message().to_string(),
            },
        }
    }
}

impl From<DomainError> for ClientError {
    fn from(error: DomainError) -> Self {
        ClientError::InvalidResponse(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::grpc::validation_rejection_to_status;

    #[test]
    fn test_rejection_status_is_classified() {
        let rejection = ValidationRejection {
            field: "value".to_string(),
            bad_value: "999".to_string(),
            message: "Readings are invalid".to_string(),
        };

        match ClientError::from(validation_rejection_to_status(&rejection)) {
            ClientError::ValidationRejected(decoded) => assert_eq!(decoded, rejection),
            other => panic!("Expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_without_metadata_is_server_error() {
        let error = ClientError::from(Status::out_of_range("too far"));
        assert!(matches!(
            error,
            ClientError::Server {
                code: Code::OutOfRange,
                ..
            }
        ));
    }

    #[test]
    fn test_unauthenticated_is_classified() {
        let error = ClientError::from(Status::unauthenticated("Invalid or expired token"));
        assert!(error.is_unauthenticated());
    }

    #[test]
    fn test_internal_keeps_message() {
        match ClientError::from(Status::internal("Internal error processing request")) {
            ClientError::Server { code, message } => {
                assert_eq!(code, Code::Internal);
                assert_eq!(message, "Internal error processing request");
            }
            other => panic!("Expected server error, got {:?}", other),
        }
    }
}
