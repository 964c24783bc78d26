//! Main configuration types.
//!
//! This module provides the top-level [`HeronConfig`] struct and its builder.

use heron_core::AppSettings;
use heron_router::{CallResolver, CompiledPattern, MatchOptions, RouteCalls};
use heron_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};

use crate::{AppSection, ConfigError, LogFormat, RoutingSection, TelemetrySection};

/// Complete Heron configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from
/// files and environment variables.
///
/// # Example
///
/// ```
/// use heron_config::HeronConfig;
///
/// let config = HeronConfig::default();
/// assert_eq!(config.routing.default_controller, "Index");
/// assert!(!config.app_settings().display_errors);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct HeronConfig {
    /// Application configuration.
    #[serde(default)]
    pub app: AppSection,

    /// Routing configuration.
    #[serde(default)]
    pub routing: RoutingSection,

    /// Telemetry configuration (logging, metrics).
    #[serde(default)]
    pub telemetry: TelemetrySection,
}

impl HeronConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> HeronConfigBuilder {
        HeronConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// Every configured route is compiled and every directive parsed, so a
    /// malformed route fails here rather than at registration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.routing.default_controller.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "routing.default_controller",
                "must not be empty",
            ));
        }
        if self.routing.default_action.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "routing.default_action",
                "must not be empty",
            ));
        }
        if self.telemetry.service_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "telemetry.service_name",
                "must not be empty",
            ));
        }
        if self.telemetry.logging.enabled {
            heron_telemetry::logging::create_env_filter(&self.telemetry.logging.level).map_err(
                |e| ConfigError::invalid_value("telemetry.logging.level", e.to_string()),
            )?;
        }

        let options = self.match_options();
        let resolver = self.resolver();
        for (index, route) in self.routing.routes.iter().enumerate() {
            let field = format!("routing.routes[{index}]");
            CompiledPattern::compile(&route.pattern, &options)
                .map_err(|e| ConfigError::invalid_value(format!("{field}.pattern"), e.to_string()))?;
            route
                .call_table::<()>()
                .map_err(|e| ConfigError::invalid_value(format!("{field}.call"), e.to_string()))?;

            let directives: Vec<&str> = match &route.call {
                RouteCalls::Single(directive) => vec![directive.as_str()],
                RouteCalls::PerMethod(calls) => calls.values().map(String::as_str).collect(),
            };
            for directive in directives {
                resolver.parse(directive).map_err(|e| {
                    ConfigError::invalid_value(format!("{field}.call"), e.to_string())
                })?;
            }
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty debug logging with source locations, and error display on.
    ///
    /// # Example
    ///
    /// ```
    /// use heron_config::HeronConfig;
    ///
    /// let config = HeronConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// assert!(config.app_settings().display_errors);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.app.environment = "development".to_string();

        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.include_location = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON info logging and error display explicitly off.
    ///
    /// # Example
    ///
    /// ```
    /// use heron_config::{HeronConfig, LogFormat};
    ///
    /// let config = HeronConfig::production();
    /// assert_eq!(config.telemetry.logging.format, LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.app.environment = "production".to_string();
        config.app.display_errors = Some(false);

        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;

        config
    }

    /// Returns the dispatch settings.
    #[must_use]
    pub fn app_settings(&self) -> AppSettings {
        AppSettings {
            environment: self.app.environment.clone(),
            display_errors: self.app.display_errors(),
            default_controller: self.routing.default_controller.clone(),
            default_action: self.routing.default_action.clone(),
        }
    }

    /// Returns the matcher options.
    #[must_use]
    pub fn match_options(&self) -> MatchOptions {
        self.routing.match_options()
    }

    /// Returns a directive resolver for the configured defaults.
    #[must_use]
    pub fn resolver(&self) -> CallResolver {
        CallResolver::new(
            self.routing.default_controller.clone(),
            self.routing.default_action.clone(),
        )
    }

    /// Returns the telemetry configuration.
    #[must_use]
    pub fn telemetry_config(&self) -> TelemetryConfig {
        self.telemetry.telemetry_config(&self.app.environment)
    }
}

/// Builder for [`HeronConfig`].
#[derive(Debug, Default)]
pub struct HeronConfigBuilder {
    app: Option<AppSection>,
    routing: Option<RoutingSection>,
    telemetry: Option<TelemetrySection>,
}

impl HeronConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application section.
    #[must_use]
    pub fn app(mut self, app: AppSection) -> Self {
        self.app = Some(app);
        self
    }

    /// Set the routing section.
    #[must_use]
    pub fn routing(mut self, routing: RoutingSection) -> Self {
        self.routing = Some(routing);
        self
    }

    /// Set the telemetry section.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetrySection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> HeronConfig {
        HeronConfig {
            app: self.app.unwrap_or_default(),
            routing: self.routing.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<HeronConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_router::RouteDefinition;

    fn with_routes(routes: Vec<RouteDefinition>) -> HeronConfig {
        HeronConfig::builder()
            .routing(RoutingSection {
                routes,
                ..RoutingSection::default()
            })
            .build()
    }

    #[test]
    fn test_default_config() {
        let config = HeronConfig::default();
        assert_eq!(config.app.environment, "production");
        assert_eq!(config.telemetry.service_name, "heron-service");
        assert!(config.routing.routes.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_settings_conversion() {
        let config = HeronConfig::builder()
            .routing(RoutingSection {
                default_controller: "Home".to_string(),
                default_action: "welcome".to_string(),
                ..RoutingSection::default()
            })
            .build();

        let settings = config.app_settings();
        assert_eq!(settings.default_controller, "Home");
        assert_eq!(settings.default_action, "welcome");
        assert_eq!(settings.environment, "production");

        let directive = config.resolver().parse("@default").unwrap();
        assert_eq!(directive.controller, "Home");
        assert_eq!(directive.action, "welcome");
    }

    #[test]
    fn test_presets() {
        let dev = HeronConfig::development();
        assert_eq!(dev.telemetry.logging.format, LogFormat::Pretty);
        assert!(dev.app_settings().display_errors);
        assert!(!dev.telemetry_config().logging.json_format);

        let prod = HeronConfig::production();
        assert!(!prod.app_settings().display_errors);
        assert_eq!(prod.telemetry_config().environment, "production");
    }

    #[test]
    fn test_validate_routes() {
        let config = with_routes(vec![
            RouteDefinition::new("/book/:id[\\d]", "Book.show"),
            RouteDefinition::methods("/book", [("GET", "Book.list"), ("POST", "Book.create")]),
        ]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_malformed_pattern() {
        let config = with_routes(vec![RouteDefinition::new("/book/:id[", "Book.show")]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("routing.routes[0].pattern"));
    }

    #[test]
    fn test_validate_rejects_bad_directive() {
        let config = with_routes(vec![RouteDefinition::new("/book", ".show")]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("routing.routes[0].call"));
    }

    #[test]
    fn test_validate_rejects_empty_default_controller() {
        let config = HeronConfig::builder()
            .routing(RoutingSection {
                default_controller: String::new(),
                ..RoutingSection::default()
            })
            .build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_validated_rejects_bad_log_level() {
        let mut telemetry = TelemetrySection::default();
        telemetry.logging.level = "heron=notalevel".to_string();
        let result = HeronConfig::builder().telemetry(telemetry).build_validated();
        assert!(result.is_err());
    }
}
