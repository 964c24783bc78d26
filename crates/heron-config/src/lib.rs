//! Typed configuration for Heron.
//!
//! This crate provides a strongly-typed configuration system with support for:
//! - TOML and JSON configuration files
//! - `.env` files and environment variable overrides
//! - Strict validation (fails on unknown fields and malformed routes)
//! - Layered configuration (defaults → file → `.env` → env)
//!
//! # Overview
//!
//! [`HeronConfig`] has three sections:
//!
//! - [`AppSection`] - environment name and error display
//! - [`RoutingSection`] - default controller/action, matcher options and
//!   routes registered at startup
//! - [`TelemetrySection`] - service name, logging and metrics
//!
//! # Example
//!
//! ```no_run
//! use heron_config::ConfigLoader;
//!
//! # fn main() -> Result<(), heron_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("heron.toml")?
//!     .with_env_prefix("HERON")
//!     .load()?;
//!
//! println!("Default controller: {}", config.routing.default_controller);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [app]
//! environment = "production"
//! display_errors = false
//!
//! [routing]
//! default_controller = "Index"
//! default_action = "index"
//! unicode = true
//! decode_uri = true
//! trailing_slash_optional = false
//!
//! [[routing.routes]]
//! pattern = "/book/:id[\\d]"
//! call = "Book.show"
//!
//! [[routing.routes]]
//! pattern = "/book"
//! call = { GET = "Book.list", POST = "Book.create" }
//!
//! [telemetry]
//! service_name = "bookshop"
//! metrics_enabled = true
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Scalar values can be overridden with `PREFIX__SECTION__KEY`:
//!
//! - `HERON__APP__DISPLAY_ERRORS=true`
//! - `HERON__ROUTING__TRAILING_SLASH_OPTIONAL=true`
//! - `HERON__TELEMETRY__LOGGING__LEVEL=debug`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::*;
