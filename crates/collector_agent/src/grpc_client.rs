use crate::client::IngestionClient;
use crate::error::ClientError;
use async_trait::async_trait;
use common::domain::{Credential, Reading, ReadingBatch, SubmissionStatus, TokenIssuance};
use common::proto::{
    to_domain_submission_status, to_domain_token_issuance, to_proto_packet, to_proto_reading,
    to_proto_token_request,
};
use meter_proto::meter_reading::v1::meter_reading_service_client::MeterReadingServiceClient;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tonic::Request;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

/// Tonic-backed ingestion client
#[derive(Clone)]
pub struct GrpcIngestionClient {
    client: MeterReadingServiceClient<Channel>,
}

impl GrpcIngestionClient {
    /// Build a client whose channel connects on first use
    pub fn connect_lazy(service_url: impl Into<String>) -> Result<Self, ClientError> {
        let service_url = service_url.into();
        debug!(service_url = %service_url, "creating lazy ingestion channel");
        let channel = Endpoint::from_shared(service_url)?.connect_lazy();
        Ok(Self::new(channel))
    }

    pub fn new(channel: Channel) -> Self {
        Self {
            client: MeterReadingServiceClient::new(channel),
        }
    }
}

fn with_bearer<T>(message: T, token: &str) -> Result<Request<T>, ClientError> {
    let value: MetadataValue<Ascii> = format!("Bearer {}", token)
        .parse()
        .map_err(|_| ClientError::Unauthenticated("token is not valid header text".to_string()))?;

    let mut request = Request::new(message);
    request.metadata_mut().insert("authorization", value);
    Ok(request)
}

#[async_trait]
impl IngestionClient for GrpcIngestionClient {
    async fn create_token(&self, credential: Credential) -> Result<TokenIssuance, ClientError> {
        let response = self
            .client
            .clone()
            .create_token(to_proto_token_request(&credential))
            .await?
            .into_inner();

        Ok(to_domain_token_issuance(response)?)
    }

    async fn add_reading_batch(
        &self,
        batch: ReadingBatch,
        token: &str,
    ) -> Result<SubmissionStatus, ClientError> {
        let request = with_bearer(to_proto_packet(&batch), token)?;
        let response = self
            .client
            .clone()
            .add_reading_batch(request)
            .await?
            .into_inner();

        Ok(to_domain_submission_status(&response))
    }

    async fn stream_diagnostics(
        &self,
        readings: ReceiverStream<Reading>,
        token: &str,
    ) -> Result<(), ClientError> {
        let outbound = readings.map(|reading| to_proto_reading(&reading));
        let request = with_bearer(outbound, token)?;

        self.client.clone().stream_diagnostics(request).await?;
        Ok(())
    }
}
