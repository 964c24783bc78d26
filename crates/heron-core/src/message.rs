//! Narrow contracts with the HTTP layer.
//!
//! The dispatcher never owns request or response objects. It reads the
//! path and method through [`RequestView`] and writes the status and the
//! raw body value through [`ResponseSink`]. Serializing that value is the
//! job of whatever sits behind the sink.
//!
//! Both traits are implemented for the `http` crate's message types so an
//! embedding server can hand its own objects straight to the dispatcher.

use http::{Method, StatusCode};
use serde_json::Value;

/// Read access to an incoming request.
pub trait RequestView {
    /// Returns the request path (without query string).
    fn path(&self) -> &str;

    /// Returns the request method.
    fn method(&self) -> &Method;
}

/// Write access to the outgoing response.
pub trait ResponseSink {
    /// Sets the response status.
    fn set_status(&mut self, status: StatusCode);

    /// Sets the raw body value; `None` means no body.
    fn set_body(&mut self, body: Option<Value>);
}

impl<B> RequestView for http::Request<B> {
    fn path(&self) -> &str {
        self.uri().path()
    }

    fn method(&self) -> &Method {
        Self::method(self)
    }
}

impl ResponseSink for http::Response<Option<Value>> {
    fn set_status(&mut self, status: StatusCode) {
        *self.status_mut() = status;
    }

    fn set_body(&mut self, body: Option<Value>) {
        *self.body_mut() = body;
    }
}
