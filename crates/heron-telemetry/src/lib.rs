//! Observability for Heron.
//!
//! This crate provides the logging and metrics plumbing used by the
//! dispatcher:
//!
//! - **Logging**: structured logs via `tracing` and `tracing-subscriber`
//!   (JSON in production, pretty in development)
//! - **Metrics**: dispatch counters and latency via the `metrics` facade
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `heron_dispatch_total` | Counter | `controller`, `action`, `status` | Completed dispatches |
//! | `heron_dispatch_duration_seconds` | Histogram | `controller`, `action` | Dispatch latency |
//! | `heron_error_cascade_total` | Counter | `level` | Error cascade entries by level |
//!
//! No exporter is bundled. Install any `metrics` recorder in the host
//! application to collect these.
//!
//! # Example
//!
//! ```rust,ignore
//! use heron_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::builder()
//!     .service_name("bookshop")
//!     .environment("development")
//!     .build();
//!
//! let _guard = init_telemetry(config)?;
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{describe_metrics, record_cascade, record_dispatch, CascadeLevel, InFlightGuard};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Marker returned by [`init_telemetry`].
///
/// Keep it alive for the lifetime of the application. Dropping it logs
/// that telemetry is shutting down.
#[derive(Debug)]
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    /// Creates a new telemetry guard.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Returns the service the guard was created for.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::debug!(service = %self.service_name, "telemetry shut down");
    }
}

/// Initializes all telemetry subsystems.
///
/// Logging is installed first so that metric setup can log.
///
/// # Errors
///
/// Returns `TelemetryError` if the configuration is invalid or a global
/// subscriber is already installed.
pub fn init_telemetry(config: TelemetryConfig) -> TelemetryResult<TelemetryGuard> {
    config.validate()?;

    init_logging(&config.logging)?;

    if config.metrics_enabled {
        describe_metrics();
    }

    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        "telemetry initialized"
    );

    Ok(TelemetryGuard::new(config.service_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telemetry_guard_creation() {
        let guard = TelemetryGuard::new("bookshop");
        assert_eq!(guard.service_name(), "bookshop");
        drop(guard);
    }

    #[test]
    fn test_init_with_logging_disabled() {
        let config = TelemetryConfig::builder()
            .service_name("bookshop")
            .logging(LogConfig {
                enabled: false,
                ..LogConfig::default()
            })
            .build();

        let guard = init_telemetry(config).unwrap();
        assert_eq!(guard.service_name(), "bookshop");
    }

    #[test]
    fn test_init_rejects_invalid_config() {
        let config = TelemetryConfig::builder().service_name("").build();
        assert!(init_telemetry(config).is_err());
    }
}
