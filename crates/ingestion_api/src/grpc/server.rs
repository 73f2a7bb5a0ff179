use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tonic::service::Routes;

use crate::domain::{ReadingIngestionService, TokenService};
use crate::grpc::{AuthGate, MeterReadingServiceHandler};
use common::grpc::{GrpcServerConfig, run_grpc_server, serve_grpc};
use meter_proto::meter_reading::v1::FILE_DESCRIPTOR_SET;
use meter_proto::meter_reading::v1::meter_reading_service_server::MeterReadingServiceServer;

/// Domain services needed by the ingestion API gRPC server
#[derive(Clone)]
pub struct IngestionApiServices {
    pub token_service: Arc<TokenService>,
    pub ingestion_service: Arc<ReadingIngestionService>,
}

/// Build routes for the meter reading service, guarded by the auth gate
pub fn build_ingestion_api_routes(services: IngestionApiServices) -> Routes {
    let gate = AuthGate::new(services.token_service.clone());
    let handler =
        MeterReadingServiceHandler::new(services.token_service, services.ingestion_service);

    Routes::new(MeterReadingServiceServer::with_interceptor(handler, gate))
}

/// Bind the configured address and serve the ingestion API until cancelled
pub async fn run_ingestion_grpc_server(
    config: GrpcServerConfig,
    services: IngestionApiServices,
    cancellation_token: CancellationToken,
) -> anyhow::Result<()> {
    run_grpc_server(
        config,
        build_ingestion_api_routes(services),
        &[FILE_DESCRIPTOR_SET],
        cancellation_token,
    )
    .await
}

/// Serve the ingestion API on an already bound listener until cancelled
pub async fn serve_ingestion_grpc(
    config: GrpcServerConfig,
    services: IngestionApiServices,
    listener: TcpListener,
    cancellation_token: CancellationToken,
) -> anyhow::Result<()> {
    serve_grpc(
        config,
        build_ingestion_api_routes(services),
        &[FILE_DESCRIPTOR_SET],
        listener,
        cancellation_token,
    )
    .await
}
