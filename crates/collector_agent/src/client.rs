use crate::error::ClientError;
use async_trait::async_trait;
use common::domain::{Credential, Reading, ReadingBatch, SubmissionStatus, TokenIssuance};
use tokio_stream::wrappers::ReceiverStream;

/// Calls the collector makes against the ingestion service
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IngestionClient: Send + Sync {
    /// Exchange credentials for a bearer token
    async fn create_token(&self, credential: Credential) -> Result<TokenIssuance, ClientError>;

    /// Submit one batch under `token`
    async fn add_reading_batch(
        &self,
        batch: ReadingBatch,
        token: &str,
    ) -> Result<SubmissionStatus, ClientError>;

    /// Send every reading from `readings`, then wait for the single acknowledgement
    async fn stream_diagnostics(
        &self,
        readings: ReceiverStream<Reading>,
        token: &str,
    ) -> Result<(), ClientError>;
}
