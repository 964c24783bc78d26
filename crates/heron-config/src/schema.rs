//! Configuration section types.
//!
//! Each section maps one table of the configuration file. All sections
//! reject unknown fields and fill missing ones with defaults.

use heron_router::{MatchOptions, RouteDefinition};
use heron_telemetry::{LogConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Application section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AppSection {
    /// Environment name (`development`, `staging`, `production`, ...).
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Render debug text for errors into response bodies.
    ///
    /// When unset, errors are displayed only in `development`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_errors: Option<bool>,
}

impl AppSection {
    /// Returns the effective display-errors flag.
    #[must_use]
    pub fn display_errors(&self) -> bool {
        self.display_errors
            .unwrap_or_else(|| self.environment == "development")
    }
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            display_errors: None,
        }
    }
}

fn default_environment() -> String {
    "production".to_string()
}

/// Routing section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RoutingSection {
    /// Controller used for `@default` directives, callables and error fallback.
    #[serde(default = "default_controller")]
    pub default_controller: String,

    /// Action used when a directive omits one.
    #[serde(default = "default_action")]
    pub default_action: String,

    /// Compile the matcher in Unicode mode.
    #[serde(default = "default_true")]
    pub unicode: bool,

    /// Percent-decode request paths before matching.
    #[serde(default = "default_true")]
    pub decode_uri: bool,

    /// Accept an optional trailing slash on every route.
    #[serde(default)]
    pub trailing_slash_optional: bool,

    /// Routes registered at startup, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouteDefinition>,
}

impl RoutingSection {
    /// Returns the matcher options for this section.
    #[must_use]
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions::default()
            .with_unicode(self.unicode)
            .with_decode_uri(self.decode_uri)
            .with_trailing_slash_optional(self.trailing_slash_optional)
    }
}

impl Default for RoutingSection {
    fn default() -> Self {
        Self {
            default_controller: default_controller(),
            default_action: default_action(),
            unicode: true,
            decode_uri: true,
            trailing_slash_optional: false,
            routes: Vec::new(),
        }
    }
}

fn default_controller() -> String {
    "Index".to_string()
}

fn default_action() -> String {
    "index".to_string()
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or per-target).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telemetry section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// Service name used in logs.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Register metric descriptions at startup.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            metrics_enabled: true,
            logging: LoggingSection::default(),
        }
    }
}

fn default_service_name() -> String {
    "heron-service".to_string()
}

impl TelemetrySection {
    /// Returns the logging configuration for `heron-telemetry`.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let pretty = self.logging.format == LogFormat::Pretty;
        LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            json_format: !pretty,
            span_events: pretty,
            file_line_info: self.logging.include_location,
            include_target: true,
            service_name: self.service_name.clone(),
        }
    }

    /// Returns the full telemetry configuration for an environment.
    #[must_use]
    pub fn telemetry_config(&self, environment: &str) -> TelemetryConfig {
        TelemetryConfig::builder()
            .service_name(&self.service_name)
            .environment(environment)
            .metrics_enabled(self.metrics_enabled)
            .logging(self.log_config())
            .build()
    }
}
