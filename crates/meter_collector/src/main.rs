use collector_agent::{CollectorSettings, build_collector_agent};
use common::telemetry::{TelemetryConfig, TelemetryProviders, init_telemetry, shutdown_telemetry};
use meter_runner::Runner;
use std::time::Duration;
use tracing::{error, info};

const ENV_PREFIX: &str = "COLLECTOR";

#[tokio::main]
async fn main() {
    let settings = match CollectorSettings::from_env_prefix(ENV_PREFIX) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let telemetry_providers: Option<TelemetryProviders> = match init_telemetry(
        &TelemetryConfig::new(settings.otel_service_name.clone())
            .with_log_level(settings.log_level.clone())
            .with_otel(settings.otel_enabled, settings.otel_endpoint.clone()),
    ) {
        Ok(providers) => providers,
        Err(e) => {
            eprintln!("Failed to initialize telemetry: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        service_url = %settings.service_url,
        customer_id = settings.customer_id,
        "Starting meter-collector"
    );

    let agent = match build_collector_agent(&settings) {
        Ok(agent) => agent,
        Err(e) => {
            error!("Failed to initialize collector agent: {:#}", e);
            std::process::exit(1);
        }
    };

    Runner::new()
        .with_named_process("collector_agent", agent.into_runner_process())
        .with_closer(move || async move {
            shutdown_telemetry(telemetry_providers);
            Ok(())
        })
        .with_closer_timeout(Duration::from_secs(5))
        .run()
        .await;
}
