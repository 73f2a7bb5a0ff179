mod config;

use collector_agent::{CollectorSettings, build_collector_agent};
use common::auth::{
    Argon2SecretHasher, CredentialStoreConfig, JwtAuthTokenProvider, JwtConfig,
    StaticCredentialStore,
};
use common::grpc::{GrpcServerConfig, IgnoredPaths};
use common::telemetry::{TelemetryConfig, TelemetryProviders, init_telemetry, shutdown_telemetry};
use crate::config::ServiceConfig;
use ingestion_api::{
    InMemoryReadingRepository, IngestionApi, IngestionApiServices, ReadingIngestionService,
    TokenService,
};
use meter_runner::Runner;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const EMBEDDED_COLLECTOR_ENV_PREFIX: &str = "METER_COLLECTOR";

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let telemetry_providers: Option<TelemetryProviders> = match init_telemetry(
        &TelemetryConfig::new(config.otel_service_name.clone())
            .with_log_level(config.log_level.clone())
            .with_otel(config.otel_enabled, config.otel_endpoint.clone()),
    ) {
        Ok(providers) => providers,
        Err(e) => {
            eprintln!("Failed to initialize telemetry: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        otel_enabled = config.otel_enabled,
        otel_endpoint = %config.otel_endpoint,
        "Starting meter-all-in-one service"
    );
    debug!(
        grpc_host = %config.grpc_host,
        grpc_port = config.grpc_port,
        token_lifetime_minutes = config.token_lifetime_minutes,
        embedded_collector_enabled = config.embedded_collector_enabled,
        "Configuration loaded"
    );

    let services = build_services(&config);

    let grpc_config = GrpcServerConfig {
        host: config.grpc_host.clone(),
        port: config.grpc_port,
        ignored_paths: IgnoredPaths::from_comma_separated(&config.grpc_ignored_paths),
    };

    let mut runner = Runner::new().with_named_process(
        "ingestion_api",
        IngestionApi::new(services, grpc_config).into_runner_process(),
    );

    if config.embedded_collector_enabled {
        let agent = CollectorSettings::from_env_prefix(EMBEDDED_COLLECTOR_ENV_PREFIX)
            .map_err(anyhow::Error::from)
            .and_then(|settings| build_collector_agent(&settings));

        match agent {
            Ok(agent) => {
                runner = runner.with_named_process("collector_agent", agent.into_runner_process());
            }
            Err(e) => {
                error!("Failed to initialize embedded collector: {:#}", e);
                std::process::exit(1);
            }
        }
    }

    runner = runner
        .with_closer(move || async move {
            info!("Running cleanup tasks...");
            shutdown_telemetry(telemetry_providers);
            info!("Cleanup complete");
            Ok(())
        })
        .with_closer_timeout(Duration::from_secs(10));

    runner.run().await;
}

fn build_services(config: &ServiceConfig) -> IngestionApiServices {
    let mut credential_store = StaticCredentialStore::new(
        Arc::new(Argon2SecretHasher::new()),
        CredentialStoreConfig::with_lifetime_minutes(config.token_lifetime_minutes),
    );
    if config.collector_password_hash.is_empty() {
        warn!("No collector password hash configured, every token request will be denied");
    } else {
        credential_store = credential_store.with_entry(
            config.collector_username.clone(),
            config.collector_password_hash.clone(),
        );
    }

    let token_service = Arc::new(TokenService::new(
        Arc::new(credential_store),
        Arc::new(JwtAuthTokenProvider::new(JwtConfig::new(
            config.jwt_secret.clone(),
        ))),
    ));

    let ingestion_service = Arc::new(ReadingIngestionService::new(Arc::new(
        InMemoryReadingRepository::new(),
    )));

    IngestionApiServices {
        token_service,
        ingestion_service,
    }
}
