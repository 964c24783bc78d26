//! Error types for Heron.
//!
//! This module provides [`HeronError`], the dispatch error taxonomy, plus
//! two small error types that user code can return from actions to steer
//! the response status:
//!
//! - [`HttpError`] carries an explicit HTTP status
//! - [`CodedError`] carries a free-form numeric code, used as the status
//!   only when it lies in the error range `400..=599`
//!
//! Action code returns `anyhow::Result`, so [`derive_status`] walks the
//! whole cause chain looking for an HTTP-specific error first.
//!
//! # Error classes
//!
//! | Class | Variants | Handling |
//! |---|---|---|
//! | Configuration | `Route`, `Injection`, `AlreadyDispatched` | fatal, returned to the caller |
//! | Resolution | `NotFound`, `MethodNotAllowed`, `ControllerNotFound`, `ActionNotFound` | error cascade, 404/405 |
//! | Internal | `Internal` | error cascade, 500 |

use std::fmt::Write as _;

use heron_router::RouteError;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::di::InjectionError;

/// Result type alias using [`HeronError`].
pub type HeronResult<T> = Result<T, HeronError>;

/// Errors produced by the dispatcher.
///
/// # Example
///
/// ```
/// use heron_core::HeronError;
/// use http::StatusCode;
///
/// let err = HeronError::not_found("/missing");
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// assert!(!err.is_fatal());
/// ```
#[derive(Error, Debug)]
pub enum HeronError {
    /// No route matched the request path.
    #[error("Not found: no route matches `{path}`")]
    NotFound {
        /// The normalized request path.
        path: String,
    },

    /// A route matched but has no call for the request method.
    #[error("Method not allowed: {method} `{path}` (allowed: {})", .allowed.join(", "))]
    MethodNotAllowed {
        /// The request method.
        method: String,
        /// The request path.
        path: String,
        /// Methods registered for the route.
        allowed: Vec<String>,
    },

    /// The resolved controller is not registered.
    #[error("Not found: controller `{0}` is not registered")]
    ControllerNotFound(String),

    /// The resolved action does not exist on the controller.
    #[error("Not found: action `{action}` does not exist on `{controller}`")]
    ActionNotFound {
        /// Controller identifier.
        controller: String,
        /// Action identifier.
        action: String,
    },

    /// The route table is broken.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// A controller dependency could not be provided.
    #[error(transparent)]
    Injection(#[from] InjectionError),

    /// `run` was called more than once on the same application.
    #[error("application has already dispatched a request")]
    AlreadyDispatched,

    /// Internal framework error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HeronError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true for configuration errors that bypass the error cascade.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Route(_) | Self::Injection(_) | Self::AlreadyDispatched
        )
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } | Self::ControllerNotFound(_) | Self::ActionNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Route(_) | Self::Injection(_) | Self::AlreadyDispatched | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            Self::ControllerNotFound(_) => "CONTROLLER_NOT_FOUND",
            Self::ActionNotFound { .. } => "ACTION_NOT_FOUND",
            Self::Route(_) => "ROUTE_CONFIGURATION",
            Self::Injection(_) => "MISSING_DEPENDENCY",
            Self::AlreadyDispatched => "ALREADY_DISPATCHED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// An error carrying an explicit HTTP status.
///
/// ```
/// use heron_core::{derive_status, HttpError};
/// use http::StatusCode;
///
/// let err = anyhow::Error::new(HttpError::new(StatusCode::FORBIDDEN, "read only"));
/// assert_eq!(derive_status(&err), StatusCode::FORBIDDEN);
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{status}: {message}")]
pub struct HttpError {
    /// The response status.
    pub status: StatusCode,
    /// Human-readable message.
    pub message: String,
}

impl HttpError {
    /// Creates an HTTP error.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 403 error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Creates a 404 error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

/// An error with a free-form numeric code.
///
/// The code becomes the response status only when it is in `400..=599`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct CodedError {
    /// Application-defined code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
}

impl CodedError {
    /// Creates a coded error.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Returns the code as an error status, if it is in range.
    #[must_use]
    pub fn http_status(&self) -> Option<StatusCode> {
        u16::try_from(self.code)
            .ok()
            .filter(|code| (400..=599).contains(code))
            .and_then(|code| StatusCode::from_u16(code).ok())
    }
}

/// Derives the response status for an error.
///
/// An [`HttpError`] or [`HeronError`] anywhere in the cause chain wins;
/// otherwise a top-level [`CodedError`] code in `400..=599` is used;
/// otherwise 500.
#[must_use]
pub fn derive_status(error: &anyhow::Error) -> StatusCode {
    for cause in error.chain() {
        if let Some(http) = cause.downcast_ref::<HttpError>() {
            return http.status;
        }
        if let Some(heron) = cause.downcast_ref::<HeronError>() {
            return heron.status_code();
        }
    }

    error
        .downcast_ref::<CodedError>()
        .and_then(CodedError::http_status)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Returns a machine-readable code for any error.
#[must_use]
pub fn error_code(error: &anyhow::Error) -> String {
    if let Some(heron) = error.downcast_ref::<HeronError>() {
        return heron.error_code().to_string();
    }
    if let Some(http) = error.downcast_ref::<HttpError>() {
        return format!("HTTP_{}", http.status.as_u16());
    }
    if let Some(coded) = error.downcast_ref::<CodedError>() {
        return format!("CODE_{}", coded.code);
    }
    "INTERNAL_ERROR".to_string()
}

/// Renders an error and its causes as human-readable debug text.
///
/// ```
/// let err = anyhow::anyhow!("disk full").context("saving book");
/// let text = heron_core::render_debug(&err);
/// assert!(text.starts_with("Error: saving book"));
/// assert!(text.contains("Caused by: disk full"));
/// ```
#[must_use]
pub fn render_debug(error: &anyhow::Error) -> String {
    let mut out = format!("Error: {error}");
    for cause in error.chain().skip(1) {
        let _ = write!(out, "\nCaused by: {cause}");
    }
    out.push('\n');
    out
}

/// Serializable error envelope for error action bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// HTTP status.
    pub status: u16,
}

impl ErrorEnvelope {
    /// Builds an envelope for an error.
    #[must_use]
    pub fn from_error(error: &anyhow::Error, request_id: Option<&str>) -> Self {
        Self {
            error: ErrorDetail {
                code: error_code(error),
                message: error.to_string(),
                status: derive_status(error).as_u16(),
            },
            request_id: request_id.map(ToString::to_string),
        }
    }
}
