use common::telemetry::{LogFormat, TelemetryConfig};
use config::{Config, ConfigError, Environment};
use ingest_worker::domain::RuntimeEnvironment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format (json, text)
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Deployment environment; anything other than "production" enables the sample event
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Service name attached to log output
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_service_name() -> String {
    "change-ingest-handler".to_string()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("INGEST"))
            .build()?
            .try_deserialize()
    }

    pub fn runtime_environment(&self) -> RuntimeEnvironment {
        RuntimeEnvironment::from_name(&self.environment)
    }

    pub fn telemetry_config(&self) -> Result<TelemetryConfig, ConfigError> {
        let log_format = self
            .log_format
            .parse::<LogFormat>()
            .map_err(ConfigError::Message)?;

        Ok(TelemetryConfig {
            service_name: self.service_name.clone(),
            log_level: self.log_level.clone(),
            log_format,
        })
    }
}
