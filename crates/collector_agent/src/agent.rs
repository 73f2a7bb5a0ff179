use chrono::Utc;
use common::domain::{
    Credential, ReadingBatch, SubmissionStatus, TokenIssuance, ValidationRejection,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::client::IngestionClient;
use crate::error::ClientError;
use crate::generator::ReadingGenerator;
use crate::session::TokenSession;

/// Behaviour of one collector agent
#[derive(Debug, Clone)]
pub struct CollectorAgentConfig {
    pub customer_id: i32,
    pub credential: Credential,
    pub notes: String,
    /// Readings per submitted batch
    pub batch_size: usize,
    /// Readings per diagnostics stream
    pub diagnostics_batch_size: usize,
    /// Stream diagnostics on every Nth cycle; 0 disables diagnostics
    pub diagnostics_every: u64,
    /// Pause between cycles
    pub delay_interval: Duration,
}

impl Default for CollectorAgentConfig {
    fn default() -> Self {
        Self {
            customer_id: 1,
            credential: Credential::new("", ""),
            notes: "This is test".to_string(),
            batch_size: 5,
            diagnostics_batch_size: 5,
            diagnostics_every: 10,
            delay_interval: Duration::from_secs(1),
        }
    }
}

/// What happened to the primary batch of a cycle
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Accepted,
    /// The server answered but committed nothing
    NotCommitted,
    Rejected(ValidationRejection),
    /// No usable token could be obtained; nothing was sent
    NoToken,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticsOutcome {
    Sent(usize),
    NoToken,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub cycle: u64,
    pub diagnostics: Option<DiagnosticsOutcome>,
    pub submission: SubmissionOutcome,
}

/// Periodic client loop: obtain a token, generate a batch, submit it
pub struct CollectorAgent {
    client: Arc<dyn IngestionClient>,
    generator: Arc<dyn ReadingGenerator>,
    config: CollectorAgentConfig,
    session: TokenSession,
    cycle: u64,
}

impl CollectorAgent {
    pub fn new(
        client: Arc<dyn IngestionClient>,
        generator: Arc<dyn ReadingGenerator>,
        config: CollectorAgentConfig,
    ) -> Self {
        Self {
            client,
            generator,
            config,
            session: TokenSession::new(),
            cycle: 0,
        }
    }

    #[cfg(test)]
    fn cycle_count(&self) -> u64 {
        self.cycle
    }

    #[cfg(test)]
    fn session(&self) -> &TokenSession {
        &self.session
    }

    pub fn into_runner_process(
        mut self,
    ) -> impl FnOnce(CancellationToken) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>
    {
        move |ctx| Box::pin(async move { self.run(ctx).await })
    }

    /// Run cycles until cancelled. Cancellation drops whatever call is in flight.
    pub async fn run(&mut self, ctx: CancellationToken) -> anyhow::Result<()> {
        info!(
            customer_id = self.config.customer_id,
            interval_ms = self.config.delay_interval.as_millis() as u64,
            "Collector agent started"
        );

        loop {
            tokio::select! {
                biased;
                _ = ctx.cancelled() => break,
                report = self.run_cycle() => {
                    debug!(cycle = report.cycle, submission = ?report.submission, "cycle finished");
                }
            }

            tokio::select! {
                biased;
                _ = ctx.cancelled() => break,
                _ = tokio::time::sleep(self.config.delay_interval) => {}
            }
        }

        info!(cycles = self.cycle, "Collector agent stopped gracefully");
        Ok(())
    }

    /// One iteration: diagnostics when due, then the primary batch
    #[instrument(skip(self), fields(cycle = self.cycle + 1))]
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycle += 1;

        let diagnostics_due =
            self.config.diagnostics_every > 0 && self.cycle % self.config.diagnostics_every == 0;
        let diagnostics = if diagnostics_due {
            Some(self.send_diagnostics().await)
        } else {
            None
        };

        let batch = self.generate_batch().await;
        let submission = self.submit(batch).await;

        CycleReport {
            cycle: self.cycle,
            diagnostics,
            submission,
        }
    }

    async fn generate_batch(&self) -> ReadingBatch {
        let mut batch = ReadingBatch::new(self.config.notes.clone());
        for _ in 0..self.config.batch_size {
            batch.push(self.generator.generate(self.config.customer_id).await);
        }
        batch.mark_ready();
        batch
    }

    /// Current token, renewing it when absent or expired
    async fn ensure_token(&mut self) -> Option<String> {
        let now = Utc::now();
        if !self.session.needs_renewal(now) {
            return self.session.usable_token(now).map(str::to_string);
        }

        match self.client.create_token(self.config.credential.clone()).await {
            Ok(TokenIssuance::Issued(token)) => {
                info!(expires_at = %token.expires_at, "token issued");
                let value = token.value.clone();
                self.session.store(token);
                Some(value)
            }
            Ok(TokenIssuance::Denied) => {
                warn!(username = %self.config.credential.username, "token request denied");
                None
            }
            Err(e) => {
                error!(error = %e, "token request failed");
                None
            }
        }
    }

    async fn submit(&mut self, batch: ReadingBatch) -> SubmissionOutcome {
        let Some(token) = self.ensure_token().await else {
            debug!("no token, skipping submission this cycle");
            return SubmissionOutcome::NoToken;
        };

        let reading_count = batch.readings.len();
        match self.client.add_reading_batch(batch, &token).await {
            Ok(SubmissionStatus::Success) => {
                info!(reading_count, "reading batch accepted");
                SubmissionOutcome::Accepted
            }
            Ok(SubmissionStatus::Failure) => {
                warn!(reading_count, "reading batch not committed");
                SubmissionOutcome::NotCommitted
            }
            Err(ClientError::ValidationRejected(rejection)) => {
                warn!(
                    field = %rejection.field,
                    bad_value = %rejection.bad_value,
                    message = %rejection.message,
                    "reading batch rejected"
                );
                SubmissionOutcome::Rejected(rejection)
            }
            Err(e) => {
                self.handle_fault(&e);
                SubmissionOutcome::Failed(e.to_string())
            }
        }
    }

    /// Write diagnostics one reading at a time while the call is in flight
    async fn send_diagnostics(&mut self) -> DiagnosticsOutcome {
        let Some(token) = self.ensure_token().await else {
            debug!("no token, skipping diagnostics this cycle");
            return DiagnosticsOutcome::NoToken;
        };

        let count = self.config.diagnostics_batch_size;
        let (tx, rx) = mpsc::channel(count.max(1));
        let generator = Arc::clone(&self.generator);
        let customer_id = self.config.customer_id;

        let produce = async move {
            let mut written = 0usize;
            for _ in 0..count {
                let reading = generator.generate(customer_id).await;
                if tx.send(reading).await.is_err() {
                    break;
                }
                written += 1;
            }
            written
        };

        let (written, result) = tokio::join!(
            produce,
            self.client
                .stream_diagnostics(ReceiverStream::new(rx), &token)
        );

        match result {
            Ok(()) => {
                info!(written, "diagnostics acknowledged");
                DiagnosticsOutcome::Sent(written)
            }
            Err(e) => {
                self.handle_fault(&e);
                DiagnosticsOutcome::Failed(e.to_string())
            }
        }
    }

    fn handle_fault(&mut self, error: &ClientError) {
        if error.is_unauthenticated() {
            warn!(error = %error, "token refused, re-issuing next cycle");
            self.session.clear();
        } else {
            error!(error = %error, "call to ingestion service failed");
        }
    }
}
