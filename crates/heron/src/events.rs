//! Dispatch observers.
//!
//! Observers are notified at three points of every dispatch:
//!
//! - **before dispatch**: the request entered the dispatcher
//! - **error**: a dispatch error entered the error cascade
//! - **after dispatch**: a response (normal or from the cascade) was produced
//!
//! Hooks run in registration order. They observe; they cannot change the
//! outcome.
//!
//! # Example
//!
//! ```rust
//! use heron::events::DispatchEvents;
//!
//! let events = DispatchEvents::new()
//!     .on_before_dispatch("audit", |state| tracing::debug!(path = %state.path, "incoming"))
//!     .on_error("alert", |_state, error| tracing::warn!(%error, "dispatch failed"));
//!
//! assert_eq!(events.len(), 2);
//! ```

use std::fmt;
use std::sync::Arc;

use heron_core::DispatchState;
use http::StatusCode;

/// Hook run before dispatch.
pub type BeforeDispatchHook = Arc<dyn Fn(&DispatchState) + Send + Sync>;

/// Hook run after a response was produced.
pub type AfterDispatchHook = Arc<dyn Fn(&DispatchState, StatusCode) + Send + Sync>;

/// Hook run when an error enters the cascade.
pub type ErrorHook = Arc<dyn Fn(&DispatchState, &anyhow::Error) + Send + Sync>;

/// Registered dispatch observers.
#[derive(Clone, Default)]
#[must_use]
pub struct DispatchEvents {
    before: Vec<(String, BeforeDispatchHook)>,
    after: Vec<(String, AfterDispatchHook)>,
    error: Vec<(String, ErrorHook)>,
}

impl fmt::Debug for DispatchEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchEvents")
            .field("before_dispatch", &self.before.len())
            .field("after_dispatch", &self.after.len())
            .field("error", &self.error.len())
            .finish()
    }
}

impl DispatchEvents {
    /// Creates an empty observer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a before-dispatch hook.
    pub fn on_before_dispatch<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&DispatchState) + Send + Sync + 'static,
    {
        self.add_before_dispatch(name, hook);
        self
    }

    /// Registers an after-dispatch hook.
    pub fn on_after_dispatch<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&DispatchState, StatusCode) + Send + Sync + 'static,
    {
        self.add_after_dispatch(name, hook);
        self
    }

    /// Registers an error hook.
    pub fn on_error<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&DispatchState, &anyhow::Error) + Send + Sync + 'static,
    {
        self.add_error(name, hook);
        self
    }

    /// Registers a before-dispatch hook in place.
    pub fn add_before_dispatch<F>(&mut self, name: impl Into<String>, hook: F)
    where
        F: Fn(&DispatchState) + Send + Sync + 'static,
    {
        self.before.push((name.into(), Arc::new(hook)));
    }

    /// Registers an after-dispatch hook in place.
    pub fn add_after_dispatch<F>(&mut self, name: impl Into<String>, hook: F)
    where
        F: Fn(&DispatchState, StatusCode) + Send + Sync + 'static,
    {
        self.after.push((name.into(), Arc::new(hook)));
    }

    /// Registers an error hook in place.
    pub fn add_error<F>(&mut self, name: impl Into<String>, hook: F)
    where
        F: Fn(&DispatchState, &anyhow::Error) + Send + Sync + 'static,
    {
        self.error.push((name.into(), Arc::new(hook)));
    }

    pub(crate) fn fire_before(&self, state: &DispatchState) {
        for (name, hook) in &self.before {
            tracing::trace!(hook = %name, "before_dispatch");
            hook(state);
        }
    }

    pub(crate) fn fire_after(&self, state: &DispatchState, status: StatusCode) {
        for (name, hook) in &self.after {
            tracing::trace!(hook = %name, "after_dispatch");
            hook(state, status);
        }
    }

    pub(crate) fn fire_error(&self, state: &DispatchState, error: &anyhow::Error) {
        for (name, hook) in &self.error {
            tracing::trace!(hook = %name, "error");
            hook(state, error);
        }
    }

    /// Returns the total number of hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.before.len() + self.after.len() + self.error.len()
    }

    /// Returns true if no hooks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns hook names in registration order, grouped by event.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.before
            .iter()
            .map(|(name, _)| name.as_str())
            .chain(self.error.iter().map(|(name, _)| name.as_str()))
            .chain(self.after.iter().map(|(name, _)| name.as_str()))
            .collect()
    }
}
