use crate::domain::{DomainError, DomainResult};
use chrono::{DateTime, Utc};
use prost_types::Timestamp;

/// Convert chrono DateTime to protobuf Timestamp
pub fn datetime_to_timestamp(dt: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: dt.timestamp(),
        nanos: dt.timestamp_subsec_nanos() as i32,
    }
}

/// Convert protobuf Timestamp to chrono DateTime
pub fn timestamp_to_datetime(ts: &Timestamp) -> DomainResult<DateTime<Utc>> {
    u32::try_from(ts.nanos)
        .ok()
        .and_then(|nanos| DateTime::from_timestamp(ts.seconds, nanos))
        .ok_or_else(|| {
            DomainError::InvalidReading(format!(
                "Invalid timestamp: {} seconds, {} nanos",
                ts.seconds, ts.nanos
            ))
        })
}
