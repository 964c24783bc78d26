//! The error cascade.
//!
//! Every recoverable dispatch error ends here, and every pass through the
//! cascade ends with a response:
//!
//! | Level | What happens |
//! |-------|--------------|
//! | 0 | Log the error, notify observers, derive and set the status |
//! | 1 | Run the `error` action of the resolved (or default) controller |
//! | 2 | Level 1 failed: log it, and with error display on render it |
//!
//! The result is then composed with whatever the failed request echoed:
//! a null or string result gets the output buffer appended and, with
//! error display on, a debug rendering of the original error prepended.
//! An empty composed string becomes no body at all.
//!
//! Errors raised inside the cascade are logged and never re-thrown.

use heron_core::{
    derive_status, render_debug, ActionContext, AppHandle, ControllerRegistry, DispatchState,
    HeronError, ResponseSink,
};
use heron_telemetry::{log_dispatch_error, record_cascade, CascadeLevel};
use http::StatusCode;
use serde_json::Value;

use crate::builder::ControllerBuilder;
use crate::events::DispatchEvents;

/// What the cascade produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    /// The derived response status.
    pub status: StatusCode,
    /// The composed response body.
    pub body: Option<Value>,
    /// The deepest level reached.
    pub level: CascadeLevel,
}

/// Runs the error cascade for one application.
#[derive(Debug, Clone, Copy)]
pub struct ErrorCascade<'a> {
    app: &'a AppHandle,
    controllers: &'a ControllerRegistry,
    events: &'a DispatchEvents,
}

impl<'a> ErrorCascade<'a> {
    /// Creates a cascade over an application's controllers and observers.
    #[must_use]
    pub const fn new(
        app: &'a AppHandle,
        controllers: &'a ControllerRegistry,
        events: &'a DispatchEvents,
    ) -> Self {
        Self {
            app,
            controllers,
            events,
        }
    }

    /// Handles a dispatch error.
    ///
    /// Sets the response status; the caller hands the returned body to
    /// the response.
    pub fn handle(
        &self,
        state: &mut DispatchState,
        error: &anyhow::Error,
        response: &mut dyn ResponseSink,
    ) -> CascadeOutcome {
        // Level 0
        let status = derive_status(error);
        log_dispatch_error!(state.request_id(), status.as_u16(), error);
        record_cascade(CascadeLevel::Status);
        state.error = Some(error.to_string());
        self.events.fire_error(state, error);
        response.set_status(status);

        // Level 1, falling back to level 2
        let (result, level) = match self.run_error_action(state, error) {
            Ok(value) => {
                record_cascade(CascadeLevel::Handler);
                (value, CascadeLevel::Handler)
            }
            Err(secondary) => {
                tracing::error!(
                    request_id = %state.request_id(),
                    error = %secondary,
                    original = %error,
                    "error action failed"
                );
                record_cascade(CascadeLevel::Fallback);
                let value = if self.app.display_errors() {
                    Value::String(render_debug(&secondary))
                } else {
                    Value::Null
                };
                (value, CascadeLevel::Fallback)
            }
        };

        let body = self.compose(state, error, result);
        CascadeOutcome {
            status,
            body,
            level,
        }
    }

    /// Builds the fallback controller bare and runs its error action.
    fn run_error_action(
        &self,
        state: &mut DispatchState,
        error: &anyhow::Error,
    ) -> anyhow::Result<Value> {
        let fallback = state
            .controller
            .clone()
            .unwrap_or_else(|| self.app.settings().default_controller.clone());

        let entry = self.controllers.get_by_name(&fallback).ok_or_else(|| {
            HeronError::internal(format!(
                "fallback controller `{fallback}` is not registered"
            ))
        })?;
        let action = entry.error_action().ok_or_else(|| {
            HeronError::internal(format!(
                "fallback controller `{fallback}` has no error action"
            ))
        })?;

        let mut controller = ControllerBuilder::new(self.app).build_bare(entry)?;
        tracing::debug!(controller = %fallback, "running error action");

        let mut ctx = ActionContext::for_error(self.app, state, error);
        action.invoke(controller.as_mut(), &mut ctx)
    }

    fn compose(
        &self,
        state: &mut DispatchState,
        error: &anyhow::Error,
        result: Value,
    ) -> Option<Value> {
        let mut text = match result {
            Value::Null => String::new(),
            Value::String(text) => text,
            other => return Some(other),
        };

        text.push_str(&state.take_output());
        if self.app.display_errors() {
            text.insert_str(0, &render_debug(error));
        }

        (!text.is_empty()).then_some(Value::String(text))
    }
}
