//! Controller construction.
//!
//! [`ControllerBuilder`] turns a registry entry into a live controller:
//! it hands the entry's constructor a [`Dependencies`] set, then makes
//! sure the controller's base is initialized with the owning application.
//! Controllers that build their base through [`Dependencies::base`] come
//! back initialized; for the rest the builder initializes it.

use heron_core::controller::extract_options;
use heron_core::{AppHandle, Controller, ControllerEntry, Dependencies, InjectionError};
use heron_router::{controller_ident, Args};

/// Builds controllers for one application.
#[derive(Debug, Clone, Copy)]
pub struct ControllerBuilder<'a> {
    app: &'a AppHandle,
}

impl<'a> ControllerBuilder<'a> {
    /// Creates a builder for an application.
    #[must_use]
    pub const fn new(app: &'a AppHandle) -> Self {
        Self { app }
    }

    /// Builds a controller with caller-supplied values.
    ///
    /// Values on the option allow-list (`layout`, `format`, `charset`)
    /// become the controller's framework options.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError`] when a required dependency has no provider.
    pub fn build(
        &self,
        entry: &ControllerEntry,
        values: &Args,
    ) -> Result<Box<dyn Controller>, InjectionError> {
        let ident = controller_ident(entry.name());
        let mut deps = Dependencies::new(self.app, &ident, values);
        let mut controller = entry.construct(&mut deps)?;

        if !controller.base().is_initialized() {
            tracing::trace!(controller = %ident, "initializing controller base");
            controller
                .base_mut()
                .init(self.app.clone(), extract_options(values));
        }

        tracing::debug!(controller = %ident, "controller built");
        Ok(controller)
    }

    /// Builds a controller with no caller values or options.
    ///
    /// Used by the error cascade, which must not reuse arguments from the
    /// request that failed.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError`] when a required dependency has no provider.
    pub fn build_bare(&self, entry: &ControllerEntry) -> Result<Box<dyn Controller>, InjectionError> {
        self.build(entry, &Args::new())
    }
}
