use crate::domain::{
    BatchStatus, DomainError, DomainResult, Reading, ReadingBatch, SubmissionStatus,
};
use crate::proto::{datetime_to_timestamp, timestamp_to_datetime};
use meter_proto::meter_reading::v1::{ReadingMessage, ReadingPacket, ReadingStatus, StatusMessage};

/// Convert domain Reading to protobuf ReadingMessage
pub fn to_proto_reading(reading: &Reading) -> ReadingMessage {
    ReadingMessage {
        customer_id: reading.customer_id,
        reading_value: reading.value,
        reading_time: Some(datetime_to_timestamp(reading.timestamp)),
    }
}

/// Convert protobuf ReadingMessage to domain Reading
///
/// A reading without a time is malformed input, not a plausibility failure.
pub fn to_domain_reading(message: &ReadingMessage) -> DomainResult<Reading> {
    let reading_time = message.reading_time.as_ref().ok_or_else(|| {
        DomainError::InvalidReading(format!(
            "Reading for customer {} has no reading_time",
            message.customer_id
        ))
    })?;

    Ok(Reading {
        customer_id: message.customer_id,
        value: message.reading_value,
        timestamp: timestamp_to_datetime(reading_time)?,
    })
}

pub fn to_proto_batch_status(status: BatchStatus) -> ReadingStatus {
    match status {
        BatchStatus::Pending => ReadingStatus::Pending,
        BatchStatus::Success => ReadingStatus::Success,
        BatchStatus::Failure => ReadingStatus::Failure,
    }
}

/// Unspecified is treated as pending: the client never declared the batch ready
pub fn to_domain_batch_status(status: ReadingStatus) -> BatchStatus {
    match status {
        ReadingStatus::Success => BatchStatus::Success,
        ReadingStatus::Failure => BatchStatus::Failure,
        ReadingStatus::Pending | ReadingStatus::Unspecified => BatchStatus::Pending,
    }
}

/// Convert domain ReadingBatch to protobuf ReadingPacket
pub fn to_proto_packet(batch: &ReadingBatch) -> ReadingPacket {
    ReadingPacket {
        status: to_proto_batch_status(batch.status) as i32,
        notes: batch.notes.clone(),
        readings: batch.readings.iter().map(to_proto_reading).collect(),
    }
}

pub fn to_proto_status_message(status: SubmissionStatus) -> StatusMessage {
    let success = match status {
        SubmissionStatus::Success => ReadingStatus::Success,
        SubmissionStatus::Failure => ReadingStatus::Failure,
    };

    StatusMessage {
        success: success as i32,
    }
}

/// Anything but an explicit SUCCESS counts as a failed submission
pub fn to_domain_submission_status(message: &StatusMessage) -> SubmissionStatus {
    match message.success() {
        ReadingStatus::Success => SubmissionStatus::Success,
        _ => SubmissionStatus::Failure,
    }
}
