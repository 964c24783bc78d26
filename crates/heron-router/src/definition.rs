//! Bulk route definitions.
//!
//! A [`RouteDefinition`] is the serializable form of one route, used for
//! importing routes from configuration:
//!
//! ```toml
//! [[routing.routes]]
//! pattern = "/book/:id[\\d]"
//! call = "Book.show"
//!
//! [[routing.routes]]
//! pattern = "/book"
//! call = { GET = "Book.list", POST = "Book.create" }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{CallTable, ExtraArgs, MethodKey, RouteError};

/// The call part of a route definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteCalls {
    /// One directive for any method.
    Single(String),
    /// Directives keyed by method list (`"GET"`, `"GET,POST"`, `"*"`).
    PerMethod(IndexMap<String, String>),
}

/// One route in a bulk import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteDefinition {
    /// The route pattern.
    pub pattern: String,
    /// The directive or per-method directives.
    pub call: RouteCalls,
    /// Fixed extra arguments passed to the action.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub args: ExtraArgs,
}

impl RouteDefinition {
    /// Creates a definition with one directive for any method.
    pub fn new(pattern: impl Into<String>, call: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            call: RouteCalls::Single(call.into()),
            args: ExtraArgs::new(),
        }
    }

    /// Creates a definition with per-method directives.
    pub fn methods<M, C>(pattern: impl Into<String>, calls: impl IntoIterator<Item = (M, C)>) -> Self
    where
        M: Into<String>,
        C: Into<String>,
    {
        Self {
            pattern: pattern.into(),
            call: RouteCalls::PerMethod(
                calls
                    .into_iter()
                    .map(|(m, c)| (m.into(), c.into()))
                    .collect(),
            ),
            args: ExtraArgs::new(),
        }
    }

    /// Adds a fixed extra argument.
    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Builds the call table described by this definition.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidMethod`] for a bad method token.
    pub fn call_table<H>(&self) -> Result<CallTable<H>, RouteError> {
        let mut table = CallTable::new();
        match &self.call {
            RouteCalls::Single(call) => {
                table.insert(MethodKey::Any, call.as_str());
            }
            RouteCalls::PerMethod(calls) => {
                for (methods, call) in calls {
                    for key in MethodKey::parse_list(methods)? {
                        table.insert(key, call.as_str());
                    }
                }
            }
        }
        Ok(table)
    }
}
