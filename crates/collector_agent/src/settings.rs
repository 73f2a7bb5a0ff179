use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::agent::CollectorAgentConfig;
use common::domain::Credential;

/// Collector settings read from `<PREFIX>_*` environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CollectorSettings {
    /// Ingestion service URL
    #[serde(default = "default_service_url")]
    pub service_url: String,

    #[serde(default = "default_customer_id")]
    pub customer_id: i32,

    /// Pause between cycles in milliseconds
    #[serde(default = "default_delay_interval_ms")]
    pub delay_interval_ms: u64,

    /// Stream diagnostics every N cycles (0 disables)
    #[serde(default = "default_diagnostics_every")]
    pub diagnostics_every: u64,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_diagnostics_batch_size")]
    pub diagnostics_batch_size: usize,

    /// Notes attached to every submitted batch
    #[serde(default = "default_notes")]
    pub notes: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Lower bound of generated reading values
    #[serde(default = "default_min_reading_value")]
    pub min_reading_value: f64,

    /// Upper bound (exclusive) of generated reading values
    #[serde(default = "default_max_reading_value")]
    pub max_reading_value: f64,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable OpenTelemetry export
    #[serde(default)]
    pub otel_enabled: bool,

    #[serde(default = "default_otel_endpoint")]
    pub otel_endpoint: String,

    #[serde(default = "default_otel_service_name")]
    pub otel_service_name: String,
}

fn default_service_url() -> String {
    "http://localhost:50051".to_string()
}

fn default_customer_id() -> i32 {
    1
}

fn default_delay_interval_ms() -> u64 {
    1000
}

fn default_diagnostics_every() -> u64 {
    10
}

fn default_batch_size() -> usize {
    5
}

fn default_diagnostics_batch_size() -> usize {
    5
}

fn default_notes() -> String {
    "This is test".to_string()
}

fn default_username() -> String {
    "collector".to_string()
}

fn default_min_reading_value() -> f64 {
    1000.0
}

fn default_max_reading_value() -> f64 {
    5000.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_otel_service_name() -> String {
    "meter-collector".to_string()
}

impl CollectorSettings {
    /// Load from environment variables named `<prefix>_<FIELD>`
    pub fn from_env_prefix(prefix: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix(prefix))
            .build()?
            .try_deserialize()
    }

    pub fn agent_config(&self) -> CollectorAgentConfig {
        CollectorAgentConfig {
            customer_id: self.customer_id,
            credential: Credential::new(self.username.clone(), self.password.clone()),
            notes: self.notes.clone(),
            batch_size: self.batch_size,
            diagnostics_batch_size: self.diagnostics_batch_size,
            diagnostics_every: self.diagnostics_every,
            delay_interval: Duration::from_millis(self.delay_interval_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults() {
        let _lock = TEST_LOCK.lock().unwrap();

        let settings = CollectorSettings::from_env_prefix("COLLECTOR_AGENT_TEST_DEFAULTS").unwrap();
        assert_eq!(settings.service_url, "http://localhost:50051");
        assert_eq!(settings.delay_interval_ms, 1000);
        assert_eq!(settings.diagnostics_every, 10);
        assert_eq!(settings.batch_size, 5);
        assert_eq!(settings.diagnostics_batch_size, 5);
        assert_eq!(settings.notes, "This is test");
        assert!(!settings.otel_enabled);
    }

    #[test]
    fn test_prefixed_overrides() {
        let _lock = TEST_LOCK.lock().unwrap();

        // SAFETY: Test runs with mutex lock to prevent concurrent env access
        unsafe {
            std::env::set_var("COLLECTOR_AGENT_TEST_CUSTOMER_ID", "42");
            std::env::set_var("COLLECTOR_AGENT_TEST_DELAY_INTERVAL_MS", "250");
            std::env::set_var("COLLECTOR_AGENT_TEST_PASSWORD", "s3cret");
        }

        let settings = CollectorSettings::from_env_prefix("COLLECTOR_AGENT_TEST").unwrap();
        assert_eq!(settings.customer_id, 42);

        let agent_config = settings.agent_config();
        assert_eq!(agent_config.delay_interval, Duration::from_millis(250));
        assert_eq!(agent_config.credential, Credential::new("collector", "s3cret"));

        // SAFETY: Test runs with mutex lock to prevent concurrent env access
        unsafe {
            std::env::remove_var("COLLECTOR_AGENT_TEST_CUSTOMER_ID");
            std::env::remove_var("COLLECTOR_AGENT_TEST_DELAY_INTERVAL_MS");
            std::env::remove_var("COLLECTOR_AGENT_TEST_PASSWORD");
        }
    }
}
