use anyhow::Context;
use std::sync::Arc;
use tracing::debug;

use crate::agent::CollectorAgent;
use crate::generator::RandomReadingGenerator;
use crate::grpc_client::GrpcIngestionClient;
use crate::settings::CollectorSettings;

/// Wire a collector agent against the configured ingestion service.
///
/// The channel is lazy, so this succeeds even while the service is down.
pub fn build_collector_agent(settings: &CollectorSettings) -> anyhow::Result<CollectorAgent> {
    debug!(
        service_url = %settings.service_url,
        customer_id = settings.customer_id,
        "Initializing collector agent"
    );

    let client = GrpcIngestionClient::connect_lazy(settings.service_url.clone())
        .with_context(|| format!("Invalid ingestion service URL {}", settings.service_url))?;
    let generator =
        RandomReadingGenerator::new(settings.min_reading_value, settings.max_reading_value)
            .context("Invalid reading value range")?;

    Ok(CollectorAgent::new(
        Arc::new(client),
        Arc::new(generator),
        settings.agent_config(),
    ))
}
