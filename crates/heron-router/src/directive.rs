//! Call directive resolution.
//!
//! A directive is the short `"Controller.action"` string registered for a
//! route. [`CallResolver`] expands it with the configured defaults:
//!
//! | Directive | Controller | Action |
//! |-----------|------------|--------|
//! | `Book.show` | `Book` | `show` |
//! | `Book` or `Book.` | `Book` | default action |
//! | `@default.about` | default controller | `about` |
//! | `.show` or empty | invalid | invalid |
//!
//! Identifiers used for registry lookups add a `Controller` suffix to the
//! controller name and an `Action` suffix to the action name, except for
//! the reserved `index` and `error` actions which keep their bare names.

use indexmap::IndexMap;
use serde_json::Value;

use crate::{Call, ExtraArgs, Params, RouteError};

/// Token that stands for the configured default controller.
pub const DEFAULT_CONTROLLER_TOKEN: &str = "@default";

/// Separator between controller and action.
pub const SEPARATOR: char = '.';

/// Action names that never receive the `Action` suffix.
pub const RESERVED_ACTIONS: [&str; 2] = ["index", "error"];

const CONTROLLER_SUFFIX: &str = "Controller";
const ACTION_SUFFIX: &str = "Action";

/// Ordered arguments handed to an action.
pub type Args = IndexMap<String, Value>;

/// Returns the registry identifier for a controller name.
///
/// ```rust
/// assert_eq!(heron_router::controller_ident("Book"), "BookController");
/// ```
#[must_use]
pub fn controller_ident(name: &str) -> String {
    format!("{name}{CONTROLLER_SUFFIX}")
}

/// Returns the registry identifier for an action name.
///
/// ```rust
/// assert_eq!(heron_router::action_ident("show"), "showAction");
/// assert_eq!(heron_router::action_ident("index"), "index");
/// ```
#[must_use]
pub fn action_ident(name: &str) -> String {
    if RESERVED_ACTIONS.contains(&name) {
        name.to_string()
    } else {
        format!("{name}{ACTION_SUFFIX}")
    }
}

/// A resolved controller/action pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallDirective {
    /// Controller name without suffix.
    pub controller: String,
    /// Action name without suffix.
    pub action: String,
}

impl CallDirective {
    /// Creates a directive from bare names.
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
        }
    }

    /// Returns the controller identifier.
    #[must_use]
    pub fn controller_ident(&self) -> String {
        controller_ident(&self.controller)
    }

    /// Returns the action identifier.
    #[must_use]
    pub fn action_ident(&self) -> String {
        action_ident(&self.action)
    }
}

/// What a prepared call will invoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<H> {
    /// A named action on a named controller.
    Action(CallDirective),
    /// A handler registered directly on the route, owned nominally by the
    /// default controller.
    Callable {
        /// The owning controller name.
        controller: String,
        /// The handler.
        handler: H,
    },
}

impl<H> Target<H> {
    /// Returns the controller name.
    #[must_use]
    pub fn controller(&self) -> &str {
        match self {
            Self::Action(directive) => &directive.controller,
            Self::Callable { controller, .. } => controller,
        }
    }
}

/// A call ready for dispatch: target plus merged arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCall<H> {
    /// What to invoke.
    pub target: Target<H>,
    /// Captured parameters followed by the route's extra arguments.
    pub args: Args,
}

/// Expands directives using the configured defaults.
///
/// # Example
///
/// ```rust
/// use heron_router::{CallDirective, CallResolver};
///
/// let resolver = CallResolver::new("Index", "index");
///
/// assert_eq!(resolver.parse("Book.show").unwrap(), CallDirective::new("Book", "show"));
/// assert_eq!(resolver.parse("Book").unwrap(), CallDirective::new("Book", "index"));
/// assert_eq!(resolver.parse("@default.about").unwrap(), CallDirective::new("Index", "about"));
/// assert!(resolver.parse(".show").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResolver {
    default_controller: String,
    default_action: String,
}

impl Default for CallResolver {
    fn default() -> Self {
        Self::new("Index", "index")
    }
}

impl CallResolver {
    /// Creates a resolver with the given defaults.
    pub fn new(default_controller: impl Into<String>, default_action: impl Into<String>) -> Self {
        Self {
            default_controller: default_controller.into(),
            default_action: default_action.into(),
        }
    }

    /// Returns the default controller name.
    #[must_use]
    pub fn default_controller(&self) -> &str {
        &self.default_controller
    }

    /// Returns the default action name.
    #[must_use]
    pub fn default_action(&self) -> &str {
        &self.default_action
    }

    /// Parses a directive string.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidCallDirective`] when the controller
    /// segment is missing.
    pub fn parse(&self, directive: &str) -> Result<CallDirective, RouteError> {
        let trimmed = directive.trim();
        let (controller, action) = trimmed
            .split_once(SEPARATOR)
            .unwrap_or((trimmed, ""));
        let (controller, action) = (controller.trim(), action.trim());

        if controller.is_empty() {
            return Err(RouteError::InvalidCallDirective(directive.to_string()));
        }

        let controller = if controller == DEFAULT_CONTROLLER_TOKEN {
            self.default_controller.clone()
        } else {
            controller.to_string()
        };
        let action = if action.is_empty() {
            self.default_action.clone()
        } else {
            action.to_string()
        };
        Ok(CallDirective { controller, action })
    }

    /// Prepares a route call for dispatch.
    ///
    /// Arguments are the captured parameters that took part in the match,
    /// in declaration order, followed by extra arguments whose keys were
    /// not captured.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidCallDirective`] for a bad directive.
    pub fn prepare<H: Clone>(
        &self,
        call: &Call<H>,
        params: &Params,
        extra_args: &ExtraArgs,
    ) -> Result<PreparedCall<H>, RouteError> {
        let target = match call {
            Call::Directive(directive) => Target::Action(self.parse(directive)?),
            Call::Handler(handler) => Target::Callable {
                controller: self.default_controller.clone(),
                handler: handler.clone(),
            },
        };

        let mut args: Args = params
            .present()
            .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
            .collect();
        for (key, value) in extra_args {
            if !args.contains_key(key) {
                args.insert(key.clone(), value.clone());
            }
        }

        Ok(PreparedCall { target, args })
    }
}
