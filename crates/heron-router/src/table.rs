//! The route table.
//!
//! This module provides [`RouteTable`], the ordered collection of
//! registered routes, and [`Route`], a single pattern with its per-method
//! call table and fixed extra arguments.
//!
//! Routes are identified by their normalized pattern. Registering the same
//! pattern twice merges the new method entries into the existing route
//! instead of appending a second one, so a pattern is only ever compiled
//! into one branch of the combined matcher.

use std::sync::Arc;

use http::Method;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;

use crate::{
    normalize_path, normalize_pattern, Call, CallResolver, CallTable, CompiledPattern,
    MatchOptions, Matcher, MethodKey, RouteDefinition, RouteError, RouteMatch,
};

/// Fixed extra arguments attached to a route.
pub type ExtraArgs = IndexMap<String, Value>;

/// A registered route.
#[derive(Debug, Clone)]
pub struct Route<H> {
    compiled: CompiledPattern,
    calls: CallTable<H>,
    extra_args: ExtraArgs,
}

impl<H> Route<H> {
    /// Returns the normalized pattern, which is the route's identity.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.compiled.pattern()
    }

    /// Returns the compiled pattern.
    #[must_use]
    pub fn compiled(&self) -> &CompiledPattern {
        &self.compiled
    }

    /// Returns the per-method call table.
    #[must_use]
    pub fn calls(&self) -> &CallTable<H> {
        &self.calls
    }

    /// Returns the fixed extra arguments.
    #[must_use]
    pub fn extra_args(&self) -> &ExtraArgs {
        &self.extra_args
    }

    /// Returns the call for a method, falling back to the wildcard entry.
    #[must_use]
    pub fn call_for(&self, method: &Method) -> Option<&Call<H>> {
        self.calls.lookup(method)
    }

    /// Returns the registered method tokens (`*` for the wildcard).
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<String> {
        self.calls.allowed_methods()
    }
}

/// The outcome of resolving a path against the table.
#[derive(Debug)]
pub struct Resolution<'a, H> {
    /// The matched route.
    pub route: &'a Route<H>,
    /// Match details: route index, normalized path and parameters.
    pub matched: RouteMatch,
    /// The call for the requested method, if one was requested and found.
    pub call: Option<&'a Call<H>>,
}

/// Ordered collection of routes with a lazily built combined matcher.
///
/// The matcher is built on the first resolution and cached until the next
/// registration. Registration takes `&mut self`, so it can never race a
/// resolution in progress.
///
/// # Example
///
/// ```rust
/// use heron_router::{Call, RouteTable};
/// use http::Method;
///
/// let mut table: RouteTable<()> = RouteTable::new();
/// table.get("/b", "A.one").unwrap();
/// table.post("/b", "A.two").unwrap();
/// assert_eq!(table.len(), 1);
///
/// let found = table.resolve("/b", Some(&Method::GET)).unwrap().unwrap();
/// assert_eq!(found.call.and_then(Call::as_directive), Some("A.one"));
///
/// let wrong = table.resolve("/b", Some(&Method::PUT)).unwrap().unwrap();
/// assert!(wrong.call.is_none());
/// ```
#[derive(Debug)]
pub struct RouteTable<H> {
    routes: Vec<Route<H>>,
    options: MatchOptions,
    matcher: RwLock<Option<Arc<Matcher>>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self::with_options(MatchOptions::default())
    }
}

impl<H> RouteTable<H> {
    /// Creates an empty table with default matching options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table with the given matching options.
    #[must_use]
    pub fn with_options(options: MatchOptions) -> Self {
        Self {
            routes: Vec::new(),
            options,
            matcher: RwLock::new(None),
        }
    }

    /// Returns the matching options.
    #[must_use]
    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Registers a call for a comma-separated method list.
    ///
    /// `"*"` or an empty list registers the call for any method. If a route
    /// with the same normalized pattern exists, the new entries are merged
    /// into it (last write wins per method, extra arguments likewise).
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is empty or malformed, or if the
    /// method list contains an invalid token.
    pub fn add_route(
        &mut self,
        pattern: &str,
        methods: &str,
        call: impl Into<Call<H>>,
        extra_args: ExtraArgs,
    ) -> Result<(), RouteError>
    where
        H: Clone,
    {
        let keys = MethodKey::parse_list(methods)?;
        let call = call.into();

        let mut calls = CallTable::new();
        for key in keys {
            calls.insert(key, call.clone());
        }
        self.insert(pattern, calls, extra_args)
    }

    /// Registers a prepared call table for a pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is empty or malformed, or if a call
    /// directive has no controller segment.
    pub fn insert(
        &mut self,
        pattern: &str,
        calls: CallTable<H>,
        extra_args: ExtraArgs,
    ) -> Result<(), RouteError> {
        let normalized = normalize_pattern(pattern)?;

        // The controller segment never depends on the resolver defaults.
        let resolver = CallResolver::default();
        for (_, call) in calls.iter() {
            if let Some(directive) = call.as_directive() {
                resolver.parse(directive)?;
            }
        }

        if let Some(route) = self.routes.iter_mut().find(|r| r.pattern() == normalized) {
            tracing::debug!(
                pattern = %normalized,
                methods = calls.len(),
                "merging methods into existing route"
            );
            route.calls.merge(calls);
            route.extra_args.extend(extra_args);
            return Ok(());
        }

        let compiled = CompiledPattern::compile(&normalized, &self.options)?;
        tracing::debug!(
            pattern = %normalized,
            index = self.routes.len(),
            params = compiled.params().len(),
            "registered route"
        );
        self.routes.push(Route {
            compiled,
            calls,
            extra_args,
        });
        *self.matcher.get_mut() = None;
        Ok(())
    }

    /// Registers a GET call.
    ///
    /// # Errors
    ///
    /// See [`RouteTable::add_route`].
    pub fn get(&mut self, pattern: &str, call: impl Into<Call<H>>) -> Result<(), RouteError> {
        self.insert(pattern, CallTable::new().get(call), ExtraArgs::new())
    }

    /// Registers a POST call.
    ///
    /// # Errors
    ///
    /// See [`RouteTable::add_route`].
    pub fn post(&mut self, pattern: &str, call: impl Into<Call<H>>) -> Result<(), RouteError> {
        self.insert(pattern, CallTable::new().post(call), ExtraArgs::new())
    }

    /// Registers a PUT call.
    ///
    /// # Errors
    ///
    /// See [`RouteTable::add_route`].
    pub fn put(&mut self, pattern: &str, call: impl Into<Call<H>>) -> Result<(), RouteError> {
        self.insert(pattern, CallTable::new().put(call), ExtraArgs::new())
    }

    /// Registers a DELETE call.
    ///
    /// # Errors
    ///
    /// See [`RouteTable::add_route`].
    pub fn delete(&mut self, pattern: &str, call: impl Into<Call<H>>) -> Result<(), RouteError> {
        self.insert(pattern, CallTable::new().delete(call), ExtraArgs::new())
    }

    /// Registers a PATCH call.
    ///
    /// # Errors
    ///
    /// See [`RouteTable::add_route`].
    pub fn patch(&mut self, pattern: &str, call: impl Into<Call<H>>) -> Result<(), RouteError> {
        self.insert(pattern, CallTable::new().patch(call), ExtraArgs::new())
    }

    /// Registers a call for any method.
    ///
    /// # Errors
    ///
    /// See [`RouteTable::add_route`].
    pub fn any(&mut self, pattern: &str, call: impl Into<Call<H>>) -> Result<(), RouteError> {
        self.insert(pattern, CallTable::new().any(call), ExtraArgs::new())
    }

    /// Imports a bulk list of route definitions in order.
    ///
    /// # Errors
    ///
    /// Stops at the first definition that fails to register.
    pub fn add_routes(
        &mut self,
        definitions: impl IntoIterator<Item = RouteDefinition>,
    ) -> Result<(), RouteError> {
        for definition in definitions {
            let calls = definition.call_table()?;
            self.insert(&definition.pattern, calls, definition.args)?;
        }
        Ok(())
    }

    /// Resolves a path, and optionally a method, to a route.
    ///
    /// Returns `Ok(None)` when no route matches the path. When a route
    /// matches but `method` has no entry (and there is no wildcard), the
    /// resolution is returned with `call` set to `None` so the caller can
    /// tell "not allowed" from "not found". Passing `None` as the method
    /// returns the route regardless of its call table.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::EmptyTable`] if no routes are registered.
    pub fn resolve(
        &self,
        path: &str,
        method: Option<&Method>,
    ) -> Result<Option<Resolution<'_, H>>, RouteError> {
        let matcher = self.matcher()?;
        let normalized = normalize_path(path, &self.options);

        let Some(matched) = matcher.find(&normalized) else {
            tracing::trace!(path = %normalized, "no route matched");
            return Ok(None);
        };

        let route = &self.routes[matched.route_index];
        let call = method.and_then(|m| route.call_for(m));
        Ok(Some(Resolution {
            route,
            matched,
            call,
        }))
    }

    /// Returns the combined matcher, building it if the cache is cold.
    fn matcher(&self) -> Result<Arc<Matcher>, RouteError> {
        if let Some(matcher) = self.matcher.read().as_ref() {
            return Ok(Arc::clone(matcher));
        }

        let mut slot = self.matcher.write();
        if let Some(matcher) = slot.as_ref() {
            return Ok(Arc::clone(matcher));
        }
        let matcher = Arc::new(Matcher::build(
            self.routes.iter().map(Route::compiled),
            &self.options,
        )?);
        *slot = Some(Arc::clone(&matcher));
        Ok(matcher)
    }

    /// Returns the routes in declaration order.
    #[must_use]
    pub fn routes(&self) -> &[Route<H>] {
        &self.routes
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    type Table = RouteTable<()>;

    fn directive<'a>(resolution: &Resolution<'a, ()>) -> Option<&'a str> {
        resolution.call.and_then(Call::as_directive)
    }

    #[test]
    fn test_empty_table_resolution_is_fatal() {
        let table = Table::new();
        let err = table.resolve("/", None).unwrap_err();
        assert_eq!(err, RouteError::EmptyTable);
    }

    #[test]
    fn test_empty_pattern_is_rejected() {
        let mut table = Table::new();
        assert_eq!(table.get("", "A.b").unwrap_err(), RouteError::EmptyPattern);
        assert!(table.is_empty());
    }

    #[test]
    fn test_directive_without_controller_rejected_at_registration() {
        let mut table = Table::new();
        let err = table.get("/x", ".show").unwrap_err();
        assert_eq!(err, RouteError::InvalidCallDirective(".show".to_string()));
        assert!(table.is_empty());

        table.get("/x", "Book.show").unwrap();
        let err = table.post("/x", "  ").unwrap_err();
        assert!(matches!(err, RouteError::InvalidCallDirective(_)));
        assert_eq!(table.routes()[0].allowed_methods(), ["GET"]);
    }

    #[test]
    fn test_malformed_pattern_rejected_at_registration() {
        let mut table = Table::new();
        let err = table.get("/x/:id[", "A.b").unwrap_err();
        assert!(matches!(err, RouteError::MalformedPattern { .. }));
    }

    #[test]
    fn test_same_pattern_merges_methods() {
        let mut table = Table::new();
        table.add_route("/b", "GET", "A.one", ExtraArgs::new()).unwrap();
        table.add_route("/b/", "post", "A.two", ExtraArgs::new()).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.routes()[0].allowed_methods(), ["GET", "POST"]);
    }

    #[test]
    fn test_method_table_precedence() {
        let mut table = Table::new();
        table.add_route("/b", "GET", "A.one", ExtraArgs::new()).unwrap();
        table.add_route("/b", "POST", "A.two", ExtraArgs::new()).unwrap();

        let get = table.resolve("/b", Some(&Method::GET)).unwrap().unwrap();
        assert_eq!(directive(&get), Some("A.one"));

        let post = table.resolve("/b", Some(&Method::POST)).unwrap().unwrap();
        assert_eq!(directive(&post), Some("A.two"));

        let put = table.resolve("/b", Some(&Method::PUT)).unwrap().unwrap();
        assert!(put.call.is_none());
        assert_eq!(put.route.pattern(), "/b");
    }

    #[test]
    fn test_wildcard_any_method() {
        let mut table = Table::new();
        table.add_route("/c", "*", "A.any", ExtraArgs::new()).unwrap();

        for method in [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS] {
            let found = table.resolve("/c", Some(&method)).unwrap().unwrap();
            assert_eq!(directive(&found), Some("A.any"));
        }
    }

    #[test]
    fn test_multiple_methods_in_one_registration() {
        let mut table = Table::new();
        table.add_route("/m", "GET, PUT", "A.m", ExtraArgs::new()).unwrap();

        assert!(table.resolve("/m", Some(&Method::PUT)).unwrap().unwrap().call.is_some());
        assert!(table.resolve("/m", Some(&Method::POST)).unwrap().unwrap().call.is_none());
    }

    #[test]
    fn test_not_found_is_none() {
        let mut table = Table::new();
        table.get("/a", "A.a").unwrap();
        assert!(table.resolve("/nope", Some(&Method::GET)).unwrap().is_none());
    }

    #[test]
    fn test_registration_invalidates_matcher() {
        let mut table = Table::new();
        table.get("/a", "A.a").unwrap();
        assert!(table.resolve("/b", None).unwrap().is_none());

        table.get("/b", "A.b").unwrap();
        let found = table.resolve("/b", Some(&Method::GET)).unwrap().unwrap();
        assert_eq!(found.matched.route_index, 1);
    }

    #[test]
    fn test_normalized_paths_resolve_identically() {
        let options = MatchOptions::default().with_trailing_slash_optional(true);
        let mut table = Table::with_options(options);
        table.get("/a/:name", "A.show").unwrap();

        let results: Vec<_> = ["/a/b", "/a//b", "/a/b/"]
            .iter()
            .map(|path| {
                let found = table.resolve(path, None).unwrap().unwrap();
                (found.matched.route_index, found.matched.params)
            })
            .collect();

        assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(results[0].1.get("name"), Some("b"));
    }

    #[test]
    fn test_extra_args_merge() {
        let mut table = Table::new();
        let mut first = ExtraArgs::new();
        first.insert("format".to_string(), json!("html"));
        table.add_route("/p", "GET", "Page.show", first).unwrap();

        let mut second = ExtraArgs::new();
        second.insert("format".to_string(), json!("json"));
        second.insert("layout".to_string(), json!("bare"));
        table.add_route("/p", "POST", "Page.save", second).unwrap();

        let args = table.routes()[0].extra_args();
        assert_eq!(args["format"], json!("json"));
        assert_eq!(args["layout"], json!("bare"));
    }

    #[test]
    fn test_invalid_method_token() {
        let mut table = Table::new();
        let err = table
            .add_route("/x", "GET,NOT VALID", "A.x", ExtraArgs::new())
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidMethod(_)));
        assert!(table.is_empty());
    }
}
