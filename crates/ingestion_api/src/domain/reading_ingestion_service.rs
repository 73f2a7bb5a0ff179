use chrono::Utc;
use common::domain::{
    BatchStatus, DomainError, DomainResult, MeterReading, Reading, ReadingRepository,
    StagedReadings, SubmissionStatus,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::validate_reading;

/// Domain service accepting reading batches from collectors
///
/// Flow:
/// 1. Refuse batches the client has not flagged ready
/// 2. Validate readings in order, stopping at the first rejection
/// 3. Stage every mapped reading in a per-call unit of work
/// 4. Commit the unit of work once
pub struct ReadingIngestionService {
    reading_repository: Arc<dyn ReadingRepository>,
}

impl ReadingIngestionService {
    pub fn new(reading_repository: Arc<dyn ReadingRepository>) -> Self {
        Self { reading_repository }
    }

    /// Validate and persist a batch atomically.
    ///
    /// `readings` is pulled lazily: nothing is decoded unless the batch is
    /// flagged ready, and each reading is decoded and validated before the
    /// next one is touched, so the first bad reading decides the error.
    /// A rejected reading surfaces as `DomainError::ValidationRejected` and
    /// nothing from the batch is committed.
    #[instrument(skip(self, readings), fields(status = ?status, notes = %notes))]
    pub async fn add_reading_batch<I>(
        &self,
        status: BatchStatus,
        notes: &str,
        readings: I,
    ) -> DomainResult<SubmissionStatus>
    where
        I: IntoIterator<Item = DomainResult<Reading>> + Send,
        I::IntoIter: Send,
    {
        if !status.is_ready() {
            debug!("batch not flagged ready, skipping");
            return Ok(SubmissionStatus::Failure);
        }

        let received_at = Utc::now();
        let mut staged = StagedReadings::new();

        for reading in readings {
            let reading = validate_reading(reading?).into_result().map_err(|rejection| {
                warn!(
                    field = %rejection.field,
                    bad_value = %rejection.bad_value,
                    "reading rejected, dropping batch"
                );
                DomainError::ValidationRejected(rejection)
            })?;
            staged.stage(MeterReading::from_reading(reading, received_at));
        }

        let staged_count = staged.len();
        match self.reading_repository.commit_all(staged).await {
            Ok(true) => {
                info!(committed = staged_count, "reading batch committed");
                Ok(SubmissionStatus::Success)
            }
            Ok(false) => {
                warn!(staged = staged_count, "repository committed nothing");
                Ok(SubmissionStatus::Failure)
            }
            Err(e) => {
                error!(error = %e, "failed to commit reading batch");
                Err(e)
            }
        }
    }
}
