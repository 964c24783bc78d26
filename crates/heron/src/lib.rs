//! # Heron
//!
//! **Request routing and controller dispatch engine**
//!
//! Heron maps a request path and method to a controller action:
//!
//! - 🧭 **Pattern routes** – `/book/:id[\d]`, `/lang/:code{en|fr}`, escaped literals
//! - ⚡ **One combined matcher** – every route compiled into a single regex
//! - 🧩 **Typed controllers** – registry lookups, typed dependency injection
//! - 🛟 **Error cascade** – status derivation, error actions, debug fallback
//! - 📊 **Observability** – structured logs and metrics via `heron-telemetry`
//!
//! ## Quick Start
//!
//! ```rust
//! use heron::prelude::*;
//! use heron::testing::{RecordingResponse, TestRequest};
//! use serde_json::json;
//!
//! struct Index {
//!     base: ControllerBase,
//! }
//!
//! impl Controller for Index {
//!     fn construct(deps: &mut Dependencies<'_>) -> Result<Self, InjectionError> {
//!         Ok(Self { base: deps.base() })
//!     }
//!
//!     fn base(&self) -> &ControllerBase {
//!         &self.base
//!     }
//!
//!     fn base_mut(&mut self) -> &mut ControllerBase {
//!         &mut self.base
//!     }
//! }
//!
//! let mut app = Application::new(AppSettings::default());
//! app.controller::<Index>("Index")
//!     .index([], |_, _| Ok(json!("welcome")))
//!     .error_action(|_, ctx| Ok(json!(ctx.error_envelope())));
//! app.get("/", "@default")?;
//!
//! let mut response = RecordingResponse::new();
//! app.run(&TestRequest::get("/missing"), &mut response)?;
//! response.assert_status(http::StatusCode::NOT_FOUND);
//! # Ok::<(), HeronError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! RequestView → RouteTable::resolve → CallResolver::prepare → ControllerBuilder
//!                                                                   ↓
//! ResponseSink ← ErrorCascade (on failure) ← ActionHandle::invoke ←─┘
//! ```

#![doc(html_root_url = "https://docs.rs/heron/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
pub mod builder;
pub mod cascade;
pub mod dispatch;
pub mod events;
pub mod testing;

pub use app::{Application, ApplicationBuilder, DispatchOutcome, RouteInfo};

// Re-export core types
pub use heron_core as core;

// Re-export router types
pub use heron_router as router;

// Re-export configuration types
pub use heron_config as config;

// Re-export telemetry types
pub use heron_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use heron::prelude::*;
///
/// let app = Application::new(AppSettings::development());
/// assert!(app.settings().display_errors);
/// ```
pub mod prelude {
    pub use crate::{Application, ApplicationBuilder, DispatchOutcome, RouteInfo};

    pub use crate::events::DispatchEvents;

    pub use heron_core::{
        ActionContext, ActionHandle, AppHandle, AppSettings, CodedError, Controller,
        ControllerBase, Dependencies, HeronError, HeronResult, HttpError, InjectionError,
        ParamKind, ParamSpec, RequestView, ResponseSink,
    };

    // Re-export DI types
    pub use heron_core::di::{Container, Inject};

    pub use heron_router::{ExtraArgs, MatchOptions, RouteDefinition};

    pub use heron_config::{ConfigLoader, HeronConfig};
}
