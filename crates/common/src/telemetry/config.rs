use opentelemetry_sdk::{logs::LoggerProvider, trace::TracerProvider as SdkTracerProvider};

const DEFAULT_OTEL_ENDPOINT: &str = "http://localhost:4317";

/// Settings shared by every binary that emits logs and traces
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub otel_endpoint: String,
    pub otel_enabled: bool,
    pub log_level: String,
}

impl TelemetryConfig {
    /// JSON logging only, at `info`
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Self::default()
        }
    }

    pub fn with_log_level(mut self, log_level: impl Into<String>) -> Self {
        self.log_level = log_level.into();
        self
    }

    /// Export traces and logs over OTLP to `endpoint`
    pub fn with_otel(mut self, enabled: bool, endpoint: impl Into<String>) -> Self {
        self.otel_enabled = enabled;
        self.otel_endpoint = endpoint.into();
        self
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "meter-service".to_string(),
            otel_endpoint: DEFAULT_OTEL_ENDPOINT.to_string(),
            otel_enabled: false,
            log_level: "info".to_string(),
        }
    }
}

/// Handles that must be flushed on shutdown
pub struct TelemetryProviders {
    pub tracer_provider: SdkTracerProvider,
    pub logger_provider: LoggerProvider,
}
