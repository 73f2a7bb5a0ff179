//! Reusable gRPC server with logging, tracing and reflection.
//!
//! # Example
//!
//! ```ignore
//! use common::grpc::{run_grpc_server, GrpcServerConfig};
//! use tonic::service::Routes;
//!
//! let routes = Routes::new(MeterReadingServiceServer::new(handler));
//!
//! run_grpc_server(
//!     GrpcServerConfig::default(),
//!     routes,
//!     &[meter_proto::meter_reading::v1::FILE_DESCRIPTOR_SET],
//!     cancellation_token,
//! )
//! .await?;
//! ```

use std::net::SocketAddr;

use anyhow::Context as _;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::service::Routes;
use tonic::transport::Server;
use tracing::{debug, error, info};

use super::{GrpcLoggingLayer, GrpcMethodPathLayer, GrpcTracingLayer, IgnoredPaths};

/// Configuration for the gRPC server.
#[derive(Debug, Clone)]
pub struct GrpcServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Calls that get neither a log line nor a span.
    pub ignored_paths: IgnoredPaths,
}

impl Default for GrpcServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 50051,
            ignored_paths: IgnoredPaths::default(),
        }
    }
}

impl GrpcServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid server address {}:{}", self.host, self.port))
    }
}

/// Bind the configured address and serve until cancelled.
pub async fn run_grpc_server(
    config: GrpcServerConfig,
    routes: Routes,
    reflection_descriptors: &[&'static [u8]],
    cancellation_token: CancellationToken,
) -> Result<(), anyhow::Error> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind gRPC server to {}", addr))?;

    serve_grpc(
        config,
        routes,
        reflection_descriptors,
        listener,
        cancellation_token,
    )
    .await
}

/// Serve on an already bound listener until cancelled.
///
/// Layers, outermost first: method path recording, tracing, logging.
pub async fn serve_grpc(
    config: GrpcServerConfig,
    routes: Routes,
    reflection_descriptors: &[&'static [u8]],
    listener: TcpListener,
    cancellation_token: CancellationToken,
) -> Result<(), anyhow::Error> {
    let local_addr = listener.local_addr()?;
    info!(address = %local_addr, "Starting gRPC server");

    let mut reflection = tonic_reflection::server::Builder::configure();
    for descriptor in reflection_descriptors {
        reflection = reflection.register_encoded_file_descriptor_set(descriptor);
    }
    let reflection_service = reflection
        .build_v1()
        .context("Failed to build reflection service")?;

    let router = Server::builder()
        .layer(GrpcMethodPathLayer::new())
        .layer(GrpcTracingLayer::new(config.ignored_paths.clone()))
        .layer(GrpcLoggingLayer::new(config.ignored_paths.clone()))
        .add_routes(routes)
        .add_service(reflection_service);

    let serve = router.serve_with_incoming_shutdown(
        TcpListenerStream::new(listener),
        async move {
            cancellation_token.cancelled().await;
            debug!("gRPC server shutdown signal received");
        },
    );

    match serve.await {
        Ok(_) => {
            info!("gRPC server stopped gracefully");
            Ok(())
        }
        Err(e) => {
            error!("gRPC server error: {}", e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = GrpcServerConfig {
            host: "127.0.0.1".to_string(),
            port: 6000,
            ..Default::default()
        };
        assert_eq!(config.socket_addr().unwrap().port(), 6000);
    }

    #[test]
    fn test_invalid_socket_addr() {
        let config = GrpcServerConfig {
            host: "not an address".to_string(),
            ..Default::default()
        };
        assert!(config.socket_addr().is_err());
    }
}
