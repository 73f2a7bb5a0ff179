use common::domain::{Reading, ValidationRejection};

/// Plausibility floor; anything below is treated as a misread meter
pub const MIN_READING_VALUE: f64 = 1000.0;

pub const READING_VALUE_FIELD: &str = "value";
pub const INVALID_READINGS_MESSAGE: &str = "Readings are invalid";

/// Result of checking a single reading
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Accepted(Reading),
    Rejected {
        reading: Reading,
        field_name: String,
        reason: String,
    },
}

impl ValidationOutcome {
    /// Accepted reading, or the rejection in the form carried across the RPC boundary
    pub fn into_result(self) -> Result<Reading, ValidationRejection> {
        match self {
            ValidationOutcome::Accepted(reading) => Ok(reading),
            ValidationOutcome::Rejected {
                reading,
                field_name,
                reason,
            } => Err(ValidationRejection {
                field: field_name,
                bad_value: reading.value.to_string(),
                message: reason,
            }),
        }
    }
}

/// Check a reading against the plausibility floor.
///
/// NaN and infinities are rejected along with values under the floor.
pub fn validate_reading(reading: Reading) -> ValidationOutcome {
    if reading.value.is_finite() && reading.value >= MIN_READING_VALUE {
        return ValidationOutcome::Accepted(reading);
    }

    ValidationOutcome::Rejected {
        reading,
        field_name: READING_VALUE_FIELD.to_string(),
        reason: INVALID_READINGS_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reading(value: f64) -> Reading {
        Reading {
            customer_id: 1,
            value,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_floor_is_inclusive() {
        let accepted = reading(1000.0);
        assert_eq!(
            validate_reading(accepted.clone()),
            ValidationOutcome::Accepted(accepted)
        );
    }

    #[test]
    fn test_just_below_floor_is_rejected() {
        let outcome = validate_reading(reading(999.99));
        match &outcome {
            ValidationOutcome::Rejected {
                field_name, reason, ..
            } => {
                assert_eq!(field_name, "value");
                assert_eq!(reason, "Readings are invalid");
            }
            ValidationOutcome::Accepted(_) => panic!("Expected rejection"),
        }

        let rejection = outcome.into_result().unwrap_err();
        assert_eq!(rejection.bad_value, "999.99");
    }

    #[test]
    fn test_whole_bad_value_has_no_fraction() {
        let rejection = validate_reading(reading(999.0)).into_result().unwrap_err();
        assert_eq!(rejection.bad_value, "999");
    }

    #[test]
    fn test_non_finite_values_rejected() {
        assert!(validate_reading(reading(f64::NAN)).into_result().is_err());
        assert!(validate_reading(reading(f64::INFINITY)).into_result().is_err());
        assert!(validate_reading(reading(f64::NEG_INFINITY)).into_result().is_err());
    }

    #[test]
    fn test_large_values_accepted() {
        assert!(validate_reading(reading(1_000_000.5)).into_result().is_ok());
        assert_eq!(validate_reading(reading(1500.0)).into_result().unwrap().value, 1500.0);
    }
}
