//! Per-request dispatch state.
//!
//! A [`DispatchState`] is created when a request enters the dispatcher,
//! updated by each phase (resolve, check, construct, invoke) and read by
//! the error cascade. It also owns the implicit output buffer that actions
//! write to with [`ActionContext::echo`](crate::ActionContext::echo).

use std::time::{Duration, Instant};

use heron_router::Args;
use http::Method;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use heron_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// State of one dispatch cycle.
///
/// # Example
///
/// ```
/// use heron_core::DispatchState;
/// use http::Method;
///
/// let mut state = DispatchState::new(Method::GET, "/book/7");
/// state.echo("partial ");
/// state.echo("body");
/// assert_eq!(state.take_output(), "partial body");
/// assert!(state.output().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct DispatchState {
    request_id: RequestId,
    /// The request method.
    pub method: Method,
    /// The raw request path.
    pub path: String,
    /// Pattern of the matched route.
    pub matched_route: Option<String>,
    /// Controller name, set once the controller is known to exist.
    pub controller: Option<String>,
    /// Action name, set once the action is known to exist.
    pub action: Option<String>,
    /// Arguments prepared for the action.
    pub action_params: Args,
    /// Message of the error being handled, if any.
    pub error: Option<String>,
    output: String,
    started_at: Instant,
}

impl DispatchState {
    /// Creates the state for a new request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            matched_route: None,
            controller: None,
            action: None,
            action_params: Args::new(),
            error: None,
            output: String::new(),
            started_at: Instant::now(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the time since the request entered the dispatcher.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Appends to the output buffer.
    pub fn echo(&mut self, text: &str) {
        self.output.push_str(text);
    }

    /// Returns the output buffer.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Takes the output buffer, leaving it empty.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}
