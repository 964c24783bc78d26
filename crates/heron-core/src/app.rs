//! Application settings and the shared application handle.
//!
//! Every controller receives an [`AppHandle`] during base initialization.
//! The handle is a cheap `Arc` clone over the settings and the dependency
//! container, so controllers can keep it for their whole lifetime.

use std::sync::Arc;

use heron_router::CallResolver;
use serde::{Deserialize, Serialize};

use crate::di::Container;

/// Settings that shape dispatch behavior.
///
/// # Example
///
/// ```
/// use heron_core::AppSettings;
///
/// let settings = AppSettings::default();
/// assert_eq!(settings.default_controller, "Index");
/// assert_eq!(settings.default_action, "index");
/// assert!(!settings.display_errors);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Environment name (`development`, `production`, ...).
    pub environment: String,
    /// Render debug text for errors into response bodies.
    pub display_errors: bool,
    /// Controller used for `@default` directives, callables and error fallback.
    pub default_controller: String,
    /// Action used when a directive omits one.
    pub default_action: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            environment: "production".to_string(),
            display_errors: false,
            default_controller: "Index".to_string(),
            default_action: "index".to_string(),
        }
    }
}

impl AppSettings {
    /// Development settings with error display enabled.
    #[must_use]
    pub fn development() -> Self {
        Self {
            environment: "development".to_string(),
            display_errors: true,
            ..Self::default()
        }
    }

    /// Returns a directive resolver for these defaults.
    #[must_use]
    pub fn resolver(&self) -> CallResolver {
        CallResolver::new(&self.default_controller, &self.default_action)
    }
}

#[derive(Debug)]
struct AppInner {
    settings: AppSettings,
    container: Container,
}

/// Shared handle to the owning application.
#[derive(Debug, Clone)]
pub struct AppHandle {
    inner: Arc<AppInner>,
}

impl AppHandle {
    /// Creates a handle from settings and a container.
    #[must_use]
    pub fn new(settings: AppSettings, container: Container) -> Self {
        Self {
            inner: Arc::new(AppInner {
                settings,
                container,
            }),
        }
    }

    /// Returns the settings.
    #[must_use]
    pub fn settings(&self) -> &AppSettings {
        &self.inner.settings
    }

    /// Returns the dependency container.
    #[must_use]
    pub fn container(&self) -> &Container {
        &self.inner.container
    }

    /// Returns the environment name.
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.inner.settings.environment
    }

    /// Returns true if error details should be rendered into bodies.
    #[must_use]
    pub fn display_errors(&self) -> bool {
        self.inner.settings.display_errors
    }

    /// Returns true if both handles point at the same application.
    #[must_use]
    pub fn same_app(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for AppHandle {
    fn default() -> Self {
        Self::new(AppSettings::default(), Container::new())
    }
}
