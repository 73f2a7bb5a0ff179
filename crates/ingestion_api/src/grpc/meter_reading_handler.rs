use futures::StreamExt;
use std::sync::Arc;
use tonic::{Request, Response, Status, Streaming};
use tracing::{debug, info, instrument};

use crate::domain::{ReadingIngestionService, TokenService, drain_diagnostics};
use common::auth::authenticated_collector;
use common::grpc::domain_error_to_status;
use common::proto::{
    to_domain_batch_status, to_domain_credential, to_domain_reading, to_proto_status_message,
    to_proto_token_response,
};
use meter_proto::meter_reading::v1::meter_reading_service_server::MeterReadingService;
use meter_proto::meter_reading::v1::{
    ReadingMessage, ReadingPacket, StatusMessage, TokenRequest, TokenResponse,
};

/// gRPC handler for MeterReadingService
///
/// Authentication happens in [`crate::grpc::AuthGate`] before any of these
/// methods run.
pub struct MeterReadingServiceHandler {
    token_service: Arc<TokenService>,
    ingestion_service: Arc<ReadingIngestionService>,
}

impl MeterReadingServiceHandler {
    pub fn new(
        token_service: Arc<TokenService>,
        ingestion_service: Arc<ReadingIngestionService>,
    ) -> Self {
        Self {
            token_service,
            ingestion_service,
        }
    }
}

fn collector_subject<T>(request: &Request<T>) -> String {
    authenticated_collector(request)
        .map(|collector| collector.subject.clone())
        .unwrap_or_default()
}

#[tonic::async_trait]
impl MeterReadingService for MeterReadingServiceHandler {
    #[instrument(
        name = "CreateToken",
        skip(self, request),
        fields(username = %request.get_ref().username)
    )]
    async fn create_token(
        &self,
        request: Request<TokenRequest>,
    ) -> Result<Response<TokenResponse>, Status> {
        let credential = to_domain_credential(request.into_inner());

        let issuance = self
            .token_service
            .issue_token(credential)
            .await
            .map_err(domain_error_to_status)?;

        Ok(Response::new(to_proto_token_response(issuance)))
    }

    #[instrument(
        name = "AddReadingBatch",
        skip(self, request),
        fields(
            collector = %collector_subject(&request),
            reading_count = request.get_ref().readings.len()
        )
    )]
    async fn add_reading_batch(
        &self,
        request: Request<ReadingPacket>,
    ) -> Result<Response<StatusMessage>, Status> {
        let packet = request.into_inner();
        let readings = packet.readings.iter().map(to_domain_reading);

        let status = self
            .ingestion_service
            .add_reading_batch(to_domain_batch_status(packet.status()), &packet.notes, readings)
            .await
            .map_err(domain_error_to_status)?;

        debug!(status = ?status, "reading batch handled");
        Ok(Response::new(to_proto_status_message(status)))
    }

    #[instrument(
        name = "StreamDiagnostics",
        skip(self, request),
        fields(collector = %collector_subject(&request))
    )]
    async fn stream_diagnostics(
        &self,
        request: Request<Streaming<ReadingMessage>>,
    ) -> Result<Response<()>, Status> {
        let readings = request.into_inner().map(|message| {
            message.and_then(|message| {
                to_domain_reading(&message).map_err(domain_error_to_status)
            })
        });

        let received = drain_diagnostics(readings).await?;

        info!(received, "diagnostics stream closed by client");
        Ok(Response::new(()))
    }
}
