use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // gRPC server configuration
    #[serde(default = "default_grpc_host")]
    pub grpc_host: String,

    #[serde(default = "default_grpc_port")]
    pub grpc_port: u16,

    /// Comma-separated gRPC paths left out of request logging and tracing
    #[serde(default = "default_grpc_ignored_paths")]
    pub grpc_ignored_paths: String,

    // Auth configuration
    /// HMAC secret for signing bearer tokens
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    #[serde(default = "default_token_lifetime_minutes")]
    pub token_lifetime_minutes: i64,

    /// Collector allowed to request tokens
    #[serde(default = "default_collector_username")]
    pub collector_username: String,

    /// Argon2 PHC hash of the collector password; empty disables token issuance
    #[serde(default)]
    pub collector_password_hash: String,

    // Telemetry configuration
    #[serde(default)]
    pub otel_enabled: bool,

    #[serde(default = "default_otel_endpoint")]
    pub otel_endpoint: String,

    #[serde(default = "default_otel_service_name")]
    pub otel_service_name: String,

    /// Run a collector agent in-process against this service,
    /// configured from `METER_COLLECTOR_*` variables
    #[serde(default)]
    pub embedded_collector_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_grpc_host() -> String {
    "0.0.0.0".to_string()
}

fn default_grpc_port() -> u16 {
    50051
}

fn default_grpc_ignored_paths() -> String {
    "/grpc.reflection.".to_string()
}

fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_token_lifetime_minutes() -> i64 {
    15
}

fn default_collector_username() -> String {
    "collector".to_string()
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_otel_service_name() -> String {
    "meter-all-in-one".to_string()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("METER"))
            .build()?
            .try_deserialize()
    }
}
