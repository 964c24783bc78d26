//! Telemetry configuration.

use crate::error::TelemetryError;
use crate::logging::LogConfig;
use crate::TelemetryResult;

/// Configuration for all telemetry subsystems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name (used in logs).
    pub service_name: String,

    /// Environment (production, staging, development).
    pub environment: String,

    /// Whether metric descriptions are registered at startup.
    pub metrics_enabled: bool,

    /// Logging configuration.
    pub logging: LogConfig,
}

impl TelemetryConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> TelemetryConfigBuilder {
        TelemetryConfigBuilder::new()
    }

    /// Checks the configuration for values that cannot work.
    pub fn validate(&self) -> TelemetryResult<()> {
        if self.service_name.trim().is_empty() {
            return Err(TelemetryError::InvalidConfig(
                "service name must not be empty".to_string(),
            ));
        }
        if self.logging.enabled && self.logging.level.trim().is_empty() {
            return Err(TelemetryError::InvalidConfig(
                "log level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "heron-service".to_string(),
            environment: "production".to_string(),
            metrics_enabled: true,
            logging: LogConfig::default(),
        }
    }
}

/// Builder for [`TelemetryConfig`].
#[derive(Debug, Default)]
pub struct TelemetryConfigBuilder {
    service_name: Option<String>,
    environment: Option<String>,
    metrics_enabled: Option<bool>,
    logging: Option<LogConfig>,
}

impl TelemetryConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the service name.
    #[must_use]
    pub fn service_name(mut self, name: &str) -> Self {
        self.service_name = Some(name.to_string());
        self
    }

    /// Sets the environment.
    #[must_use]
    pub fn environment(mut self, env: &str) -> Self {
        self.environment = Some(env.to_string());
        self
    }

    /// Enables or disables metric descriptions.
    #[must_use]
    pub fn metrics_enabled(mut self, enabled: bool) -> Self {
        self.metrics_enabled = Some(enabled);
        self
    }

    /// Sets the logging configuration.
    #[must_use]
    pub fn logging(mut self, config: LogConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// Sets the log filter directive.
    #[must_use]
    pub fn log_level(mut self, level: &str) -> Self {
        let config = self.logging.take().unwrap_or_default();
        self.logging = Some(LogConfig {
            level: level.to_string(),
            ..config
        });
        self
    }

    /// Builds the configuration.
    ///
    /// Without an explicit logging configuration, `development` gets
    /// pretty output and every other environment gets JSON.
    #[must_use]
    pub fn build(self) -> TelemetryConfig {
        let defaults = TelemetryConfig::default();

        let service_name = self.service_name.unwrap_or(defaults.service_name);
        let environment = self.environment.unwrap_or(defaults.environment);

        let mut logging = self.logging.unwrap_or_else(|| {
            if environment == "development" {
                LogConfig::development()
            } else {
                LogConfig::production()
            }
        });
        logging.service_name = service_name.clone();

        TelemetryConfig {
            service_name,
            environment,
            metrics_enabled: self.metrics_enabled.unwrap_or(defaults.metrics_enabled),
            logging,
        }
    }
}
