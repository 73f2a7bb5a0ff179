use crate::domain::result::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A single meter reading as produced by a collector
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub customer_id: i32,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Client-declared state of a batch.
///
/// `Success` means "ready to send". It is never taken as proof that the
/// readings themselves are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Pending,
    Success,
    Failure,
}

impl BatchStatus {
    pub fn is_ready(self) -> bool {
        self == BatchStatus::Success
    }
}

/// Ordered group of readings submitted in one call
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingBatch {
    pub status: BatchStatus,
    pub notes: String,
    pub readings: Vec<Reading>,
}

impl ReadingBatch {
    /// Create an empty pending batch
    pub fn new(notes: impl Into<String>) -> Self {
        Self {
            status: BatchStatus::Pending,
            notes: notes.into(),
            readings: Vec::new(),
        }
    }

    pub fn push(&mut self, reading: Reading) {
        self.readings.push(reading);
    }

    /// Flag the batch as ready to send
    pub fn mark_ready(&mut self) {
        self.status = BatchStatus::Success;
    }
}

/// Server-determined outcome of a batch submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Success,
    Failure,
}

/// Persistence shape of an accepted reading
#[derive(Debug, Clone, PartialEq)]
pub struct MeterReading {
    pub customer_id: i32,
    pub value: f64,
    pub reading_date: DateTime<Utc>,
    pub received_at: DateTime<Utc>,
}

impl MeterReading {
    pub fn from_reading(reading: Reading, received_at: DateTime<Utc>) -> Self {
        Self {
            customer_id: reading.customer_id,
            value: reading.value,
            reading_date: reading.timestamp,
            received_at,
        }
    }
}

/// Readings staged by a single submission call, in submission order.
///
/// Each call owns its own unit of work; nothing is shared between concurrent
/// submissions until the repository commits it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagedReadings {
    readings: Vec<MeterReading>,
}

impl StagedReadings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&mut self, reading: MeterReading) {
        self.readings.push(reading);
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn readings(&self) -> &[MeterReading] {
        &self.readings
    }

    pub fn into_readings(self) -> Vec<MeterReading> {
        self.readings
    }
}

/// Repository trait for reading persistence
/// Infrastructure layer implements this trait
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// Atomically persist every staged reading.
    ///
    /// Returns `false` when nothing was written.
    async fn commit_all(&self, staged: StagedReadings) -> DomainResult<bool>;
}
