use crate::grpc::{IngestionApiServices, run_ingestion_grpc_server};
use common::grpc::GrpcServerConfig;
use std::future::Future;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Ingestion API module, packaged for the process runner
pub struct IngestionApi {
    services: IngestionApiServices,
    config: GrpcServerConfig,
}

impl IngestionApi {
    pub fn new(services: IngestionApiServices, config: GrpcServerConfig) -> Self {
        debug!(host = %config.host, port = config.port, "Initializing ingestion API module");
        Self { services, config }
    }

    pub fn into_runner_process(
        self,
    ) -> impl FnOnce(CancellationToken) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>
    {
        move |ctx| {
            Box::pin(async move { run_ingestion_grpc_server(self.config, self.services, ctx).await })
        }
    }
}
