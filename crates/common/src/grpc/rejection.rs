use crate::domain::ValidationRejection;
use tonic::metadata::{Ascii, MetadataMap, MetadataValue};
use tonic::{Code, Status};

/// Metadata key carrying the offending value
pub const REJECTION_BAD_VALUE_KEY: &str = "bad-value";
/// Metadata key carrying the offending field name
pub const REJECTION_FIELD_KEY: &str = "field";
/// Metadata key carrying the human-readable rejection message
pub const REJECTION_MESSAGE_KEY: &str = "message";

/// Status code used for plausibility rejections
pub const REJECTION_CODE: Code = Code::OutOfRange;

/// Build the status returned when a reading fails validation.
///
/// The rejection context rides in the status metadata, separate from the
/// status message.
pub fn validation_rejection_to_status(rejection: &ValidationRejection) -> Status {
    let mut metadata = MetadataMap::new();

    for (key, value) in [
        (REJECTION_BAD_VALUE_KEY, &rejection.bad_value),
        (REJECTION_FIELD_KEY, &rejection.field),
        (REJECTION_MESSAGE_KEY, &rejection.message),
    ] {
        if let Ok(value) = value.parse::<MetadataValue<Ascii>>() {
            metadata.insert(key, value);
        }
    }

    Status::with_metadata(REJECTION_CODE, "Value too low", metadata)
}

/// Recover rejection context from a status, if it is a validation rejection.
///
/// An `OUT_OF_RANGE` status without a `field` entry is not treated as one.
pub fn validation_rejection_from_status(status: &Status) -> Option<ValidationRejection> {
    let metadata = status.metadata();
    if status.code() != REJECTION_CODE || !metadata.contains_key(REJECTION_FIELD_KEY) {
        return None;
    }

    let read = |key: &str| {
        metadata
            .get(key)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_default()
    };

    Some(ValidationRejection {
        field: read(REJECTION_FIELD_KEY),
        bad_value: read(REJECTION_BAD_VALUE_KEY),
        message: read(REJECTION_MESSAGE_KEY),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection() -> ValidationRejection {
        ValidationRejection {
            field: "value".to_string(),
            bad_value: "999".to_string(),
            message: "Readings are invalid".to_string(),
        }
    }

    #[test]
    fn test_status_carries_metadata_apart_from_message() {
        let status = validation_rejection_to_status(&rejection());

        assert_eq!(status.code(), Code::OutOfRange);
        assert_eq!(status.message(), "Value too low");
        let metadata = status.metadata();
        assert_eq!(metadata.get("bad-value").unwrap().to_str().unwrap(), "999");
        assert_eq!(metadata.get("field").unwrap().to_str().unwrap(), "value");
        assert_eq!(
            metadata.get("message").unwrap().to_str().unwrap(),
            "Readings are invalid"
        );
    }

    #[test]
    fn test_rejection_recovered_from_status() {
        let status = validation_rejection_to_status(&rejection());
        assert_eq!(validation_rejection_from_status(&status), Some(rejection()));
    }

    #[test]
    fn test_other_codes_are_not_rejections() {
        let status = Status::internal("boom");
        assert_eq!(validation_rejection_from_status(&status), None);
    }

    #[test]
    fn test_out_of_range_without_field_is_not_a_rejection() {
        let status = Status::out_of_range("Value too low");
        assert_eq!(validation_rejection_from_status(&status), None);
    }

    #[test]
    fn test_partial_metadata_yields_empty_fields() {
        let mut metadata = MetadataMap::new();
        metadata.insert(REJECTION_FIELD_KEY, "value".parse().unwrap());
        let status = Status::with_metadata(REJECTION_CODE, "Value too low", metadata);

        let recovered = validation_rejection_from_status(&status).unwrap();
        assert_eq!(recovered.field, "value");
        assert_eq!(recovered.bad_value, "");
    }
}
