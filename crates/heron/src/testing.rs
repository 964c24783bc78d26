//! Test collaborators.
//!
//! [`TestRequest`] and [`RecordingResponse`] stand in for the HTTP layer
//! so an [`Application`](crate::Application) can be driven without a
//! server.
//!
//! ```
//! use heron::testing::{RecordingResponse, TestRequest};
//! use heron::core::{RequestView, ResponseSink};
//! use http::{Method, StatusCode};
//!
//! let request = TestRequest::post("/book");
//! assert_eq!(request.method(), Method::POST);
//!
//! let mut response = RecordingResponse::new();
//! response.set_status(StatusCode::NOT_FOUND);
//! response.assert_status(StatusCode::NOT_FOUND);
//! ```

use heron_core::{RequestView, ResponseSink};
use http::{Method, StatusCode};
use serde_json::Value;

/// A request built from a method and a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRequest {
    method: Method,
    path: String,
}

impl TestRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Creates a PATCH request.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }
}

impl RequestView for TestRequest {
    fn path(&self) -> &str {
        &self.path
    }

    fn method(&self) -> &Method {
        &self.method
    }
}

/// A response sink that records what the dispatcher wrote.
///
/// The status starts at `200 OK`; the dispatcher only sets it on the
/// error path.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResponse {
    status: StatusCode,
    body: Option<Value>,
    writes: usize,
}

impl Default for RecordingResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            body: None,
            writes: 0,
        }
    }
}

impl RecordingResponse {
    /// Creates an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the recorded body.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Returns the body if it is a string.
    #[must_use]
    pub fn body_str(&self) -> Option<&str> {
        self.body.as_ref().and_then(Value::as_str)
    }

    /// Returns how many times a body was written.
    #[must_use]
    pub const fn body_writes(&self) -> usize {
        self.writes
    }

    /// Asserts the recorded status.
    ///
    /// # Panics
    ///
    /// Panics if the status differs.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {expected}, got {}",
            self.status
        );
        self
    }

    /// Asserts the recorded body.
    ///
    /// # Panics
    ///
    /// Panics if the body differs.
    pub fn assert_body_eq(&self, expected: &Value) -> &Self {
        assert_eq!(self.body.as_ref(), Some(expected), "Body mismatch");
        self
    }

    /// Asserts that the body is a string containing `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the body is not a string or does not contain `expected`.
    pub fn assert_body_contains(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        let body = self.body_str().unwrap_or_default();
        assert!(
            body.contains(expected),
            "Body does not contain '{expected}': {body:?}"
        );
        self
    }

    /// Asserts that no body was set.
    ///
    /// # Panics
    ///
    /// Panics if a body is present.
    pub fn assert_no_body(&self) -> &Self {
        assert!(self.body.is_none(), "Expected no body, got {:?}", self.body);
        self
    }
}

impl ResponseSink for RecordingResponse {
    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn set_body(&mut self, body: Option<Value>) {
        self.body = body;
        self.writes += 1;
    }
}
