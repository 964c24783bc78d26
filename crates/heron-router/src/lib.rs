//! Single-regex route compiler and matcher for Heron.
//!
//! This crate turns a set of path patterns into one combined regex and
//! resolves incoming paths against it. Every route becomes one branch of
//! the alternation, so finding "which of N routes matched" is a single
//! regex pass.
//!
//! # Features
//!
//! - **Typed Parameters**: bare (`:id`), class-restricted (`:id[\d]`) and
//!   alternated (`:tab{show|hide}`) captures
//! - **Declaration Order**: when patterns overlap the first registered route wins
//! - **Method Tables**: per-method calls with a `*` wildcard fallback
//! - **Eager Validation**: malformed patterns fail at registration
//! - **Call Directives**: `"Controller.action"` strings expanded with defaults
//!
//! # Example
//!
//! ```rust
//! use heron_router::{Call, CallResolver, RouteTable};
//! use http::Method;
//!
//! let mut table: RouteTable<()> = RouteTable::new();
//! table.get("/book/:id[\\d]", "Book.show").unwrap();
//! table.get("/book/:tab{new|popular}", "Book.list").unwrap();
//!
//! let found = table.resolve("/book/7", Some(&Method::GET)).unwrap().unwrap();
//! assert_eq!(found.matched.params.get("id"), Some("7"));
//!
//! let call = found.call.unwrap();
//! let prepared = CallResolver::default()
//!     .prepare(call, &found.matched.params, found.route.extra_args())
//!     .unwrap();
//! assert_eq!(prepared.target.controller(), "Book");
//! assert_eq!(prepared.args["id"], "7");
//! ```
//!
//! # Architecture
//!
//! ```text
//!  "/book/:id[\d]"  ──compile──▶  /book/(?P<id>[\d]+)
//!  "/user/:name"    ──compile──▶  /user/(?P<name>[^/]+)
//!                                   │
//!                                combine
//!                                   ▼
//!  ^(?:(?P<r0>/book/(?P<r0p0>[\d]+))|(?P<r1>/user/(?P<r1p0>[^/]+)))$
//! ```

mod call_table;
mod definition;
mod directive;
mod error;
mod matcher;
mod options;
mod params;
mod pattern;
mod table;

pub use call_table::{Call, CallTable, MethodKey};
pub use definition::{RouteCalls, RouteDefinition};
pub use directive::{
    action_ident, controller_ident, Args, CallDirective, CallResolver, PreparedCall, Target,
    DEFAULT_CONTROLLER_TOKEN, RESERVED_ACTIONS, SEPARATOR,
};
pub use error::RouteError;
pub use matcher::{normalize_path, Matcher, RouteMatch};
pub use options::MatchOptions;
pub use params::Params;
pub use pattern::{normalize_pattern, CompiledPattern};
pub use table::{ExtraArgs, Resolution, Route, RouteTable};

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use proptest::prelude::*;

    fn table(patterns: &[(&str, &str)]) -> RouteTable<()> {
        let mut table = RouteTable::new();
        for (pattern, call) in patterns {
            table.get(pattern, *call).unwrap();
        }
        table
    }

    #[test]
    fn test_class_restricted_capture() {
        let t = table(&[(r"/x/:id[\d]", "X.show")]);

        let found = t.resolve("/x/42", None).unwrap().unwrap();
        assert_eq!(found.matched.params.get("id"), Some("42"));
        assert!(t.resolve("/x/abc", None).unwrap().is_none());
    }

    #[test]
    fn test_alternation_capture() {
        let t = table(&[("/x/:tab{show|hide}", "X.tab")]);

        assert!(t.resolve("/x/show", None).unwrap().is_some());
        assert!(t.resolve("/x/hide", None).unwrap().is_some());
        assert!(t.resolve("/x/other", None).unwrap().is_none());
    }

    #[test]
    fn test_declaration_order_precedence() {
        let t = table(&[("/x/:id", "X.param"), ("/x/fixed", "X.fixed")]);

        let found = t.resolve("/x/fixed", Some(&Method::GET)).unwrap().unwrap();
        assert_eq!(found.matched.route_index, 0);
        assert_eq!(found.call.and_then(Call::as_directive), Some("X.param"));
    }

    #[test]
    fn test_mixed_parameter_order() {
        let t = table(&[(r"/:a{x|y}/:b[\d]/:c", "M.m")]);
        let found = t.resolve("/y/12/zed", None).unwrap().unwrap();

        let params: Vec<_> = found.matched.params.present().collect();
        assert_eq!(params, [("a", "y"), ("b", "12"), ("c", "zed")]);
    }

    #[test]
    fn test_escaped_colon_is_literal() {
        let t = table(&[(r"/time/\:now", "T.now")]);
        assert!(t.resolve("/time/:now", None).unwrap().is_some());
        assert!(t.resolve("/time/later", None).unwrap().is_none());
    }

    fn segment() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9]{0,6}"
    }

    fn value() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_~.-]{1,10}".prop_filter("not a dot segment", |v| v != "." && v != "..")
    }

    proptest! {
        #[test]
        fn prop_bare_pattern_round_trip(
            parts in proptest::collection::vec((segment(), any::<bool>()), 1..6),
            values in proptest::collection::vec(value(), 6),
        ) {
            let mut pattern = String::new();
            let mut path = String::new();
            let mut expected = Vec::new();

            for (i, (literal, is_param)) in parts.iter().enumerate() {
                pattern.push('/');
                path.push('/');
                if *is_param {
                    let name = format!("p{i}");
                    pattern.push(':');
                    pattern.push_str(&name);
                    path.push_str(&values[i]);
                    expected.push((name, values[i].clone()));
                } else {
                    pattern.push_str(literal);
                    path.push_str(literal);
                }
            }

            let mut t: RouteTable<()> = RouteTable::new();
            t.get(&pattern, "P.p").unwrap();
            let found = t.resolve(&path, None).unwrap();
            prop_assert!(found.is_some(), "{} should match {}", pattern, path);

            let found = found.unwrap();
            let actual: Vec<(String, String)> = found
                .matched
                .params
                .present()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
