//! Per-method call tables.
//!
//! This module provides [`CallTable`], which maps HTTP methods (plus the
//! `*` wildcard) to the call registered for a single route pattern, and
//! [`Call`], the registered value itself.

use std::fmt;

use http::Method;
use indexmap::IndexMap;

use crate::RouteError;

/// The method slot a call is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodKey {
    /// Matches any request method (`*` or an empty method list).
    Any,
    /// Matches exactly one method.
    Exact(Method),
}

impl MethodKey {
    /// Parses a comma-separated method list such as `"get, POST"`.
    ///
    /// An empty list or a `*` token means "any method".
    ///
    /// ```rust
    /// use heron_router::MethodKey;
    /// use http::Method;
    ///
    /// let keys = MethodKey::parse_list("get, POST").unwrap();
    /// assert_eq!(keys, [MethodKey::Exact(Method::GET), MethodKey::Exact(Method::POST)]);
    /// assert_eq!(MethodKey::parse_list("").unwrap(), [MethodKey::Any]);
    /// ```
    pub fn parse_list(methods: &str) -> Result<Vec<Self>, RouteError> {
        let tokens: Vec<&str> = methods
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect();

        if tokens.is_empty() {
            return Ok(vec![Self::Any]);
        }
        tokens.into_iter().map(Self::parse).collect()
    }

    /// Parses a single method token.
    pub fn parse(token: &str) -> Result<Self, RouteError> {
        if token == "*" {
            return Ok(Self::Any);
        }
        let upper = token.to_ascii_uppercase();
        Method::from_bytes(upper.as_bytes())
            .map(Self::Exact)
            .map_err(|_| RouteError::InvalidMethod(token.to_string()))
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Exact(method) => f.write_str(method.as_str()),
        }
    }
}

impl From<Method> for MethodKey {
    fn from(method: Method) -> Self {
        Self::Exact(method)
    }
}

/// A call registered for one method of a route.
///
/// Either a short directive string (`"Book.show"`) that is resolved
/// against the controller registry, or a handler value invoked directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call<H> {
    /// A `"Controller.action"` directive.
    Directive(String),
    /// A directly registered handler.
    Handler(H),
}

impl<H> Call<H> {
    /// Returns the directive string, if this is a directive.
    #[must_use]
    pub fn as_directive(&self) -> Option<&str> {
        match self {
            Self::Directive(directive) => Some(directive),
            Self::Handler(_) => None,
        }
    }
}

impl<H> From<&str> for Call<H> {
    fn from(directive: &str) -> Self {
        Self::Directive(directive.to_string())
    }
}

impl<H> From<String> for Call<H> {
    fn from(directive: String) -> Self {
        Self::Directive(directive)
    }
}

/// Maps methods to calls for a single route.
///
/// # Example
///
/// ```rust
/// use heron_router::{Call, CallTable};
/// use http::Method;
///
/// let table: CallTable<()> = CallTable::new().get("Book.list").post("Book.create");
///
/// assert_eq!(table.lookup(&Method::GET).and_then(Call::as_directive), Some("Book.list"));
/// assert!(table.lookup(&Method::DELETE).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallTable<H> {
    entries: IndexMap<MethodKey, Call<H>>,
}

impl<H> Default for CallTable<H> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<H> CallTable<H> {
    /// Creates a new empty call table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a call, replacing any previous call for the same key.
    pub fn insert(&mut self, key: MethodKey, call: impl Into<Call<H>>) -> Option<Call<H>> {
        self.entries.insert(key, call.into())
    }

    /// Registers a call for a specific method.
    #[must_use]
    pub fn method(mut self, method: Method, call: impl Into<Call<H>>) -> Self {
        self.insert(MethodKey::Exact(method), call);
        self
    }

    /// Registers a GET call.
    #[must_use]
    pub fn get(self, call: impl Into<Call<H>>) -> Self {
        self.method(Method::GET, call)
    }

    /// Registers a POST call.
    #[must_use]
    pub fn post(self, call: impl Into<Call<H>>) -> Self {
        self.method(Method::POST, call)
    }

    /// Registers a PUT call.
    #[must_use]
    pub fn put(self, call: impl Into<Call<H>>) -> Self {
        self.method(Method::PUT, call)
    }

    /// Registers a DELETE call.
    #[must_use]
    pub fn delete(self, call: impl Into<Call<H>>) -> Self {
        self.method(Method::DELETE, call)
    }

    /// Registers a PATCH call.
    #[must_use]
    pub fn patch(self, call: impl Into<Call<H>>) -> Self {
        self.method(Method::PATCH, call)
    }

    /// Registers a wildcard call used when no exact method matches.
    #[must_use]
    pub fn any(mut self, call: impl Into<Call<H>>) -> Self {
        self.insert(MethodKey::Any, call);
        self
    }

    /// Returns the call registered for exactly this method.
    #[must_use]
    pub fn exact(&self, method: &Method) -> Option<&Call<H>> {
        self.entries.get(&MethodKey::Exact(method.clone()))
    }

    /// Returns the wildcard call.
    #[must_use]
    pub fn wildcard(&self) -> Option<&Call<H>> {
        self.entries.get(&MethodKey::Any)
    }

    /// Returns the call for a method, falling back to the wildcard.
    #[must_use]
    pub fn lookup(&self, method: &Method) -> Option<&Call<H>> {
        self.exact(method).or_else(|| self.wildcard())
    }

    /// Returns true if a request with this method has a call.
    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        self.lookup(method).is_some()
    }

    /// Merges another table into this one.
    ///
    /// Entries from `other` overwrite entries for the same method.
    pub fn merge(&mut self, other: CallTable<H>) {
        for (key, call) in other.entries {
            self.entries.insert(key, call);
        }
    }

    /// Returns true if any methods are registered.
    #[must_use]
    pub fn has_any_method(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Returns the registered method tokens in registration order.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<String> {
        self.entries.keys().map(ToString::to_string).collect()
    }

    /// Returns the number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entries are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&MethodKey, &Call<H>)> {
        self.entries.iter()
    }
}
