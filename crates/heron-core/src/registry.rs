//! Controller registry.
//!
//! The registry answers the two existence questions the dispatcher asks:
//! does a controller exist, and does it have a given action. Controllers
//! are keyed by their identifier (`BookController`) and actions by theirs
//! (`showAction`, or the bare reserved names `index` and `error`).
//!
//! # Example
//!
//! ```
//! use heron_core::{Controller, ControllerBase, ControllerRegistry, Dependencies, InjectionError, ParamSpec};
//! use serde_json::json;
//!
//! struct BookController { base: ControllerBase }
//!
//! impl Controller for BookController {
//!     fn construct(deps: &mut Dependencies<'_>) -> Result<Self, InjectionError> {
//!         Ok(Self { base: deps.base() })
//!     }
//!     fn base(&self) -> &ControllerBase { &self.base }
//!     fn base_mut(&mut self) -> &mut ControllerBase { &mut self.base }
//! }
//!
//! let mut registry = ControllerRegistry::new();
//! registry
//!     .register::<BookController>("Book")
//!     .action("show", [ParamSpec::int("id")], |_, ctx| Ok(json!({ "id": ctx.get("id") })));
//!
//! assert!(registry.contains("Book"));
//! assert!(registry.action_exists("Book", "show"));
//! assert!(!registry.action_exists("Book", "delete"));
//! ```

use std::fmt;
use std::marker::PhantomData;

use heron_router::{action_ident, controller_ident};
use indexmap::IndexMap;
use serde_json::Value;

use crate::action::{ActionContext, ActionHandle, ParamSpec};
use crate::controller::{Controller, Dependencies};
use crate::di::InjectionError;

/// Builds a boxed controller from its dependencies.
pub type ConstructFn = fn(&mut Dependencies<'_>) -> Result<Box<dyn Controller>, InjectionError>;

fn construct_boxed<C: Controller>(
    deps: &mut Dependencies<'_>,
) -> Result<Box<dyn Controller>, InjectionError> {
    C::construct(deps).map(|controller| Box::new(controller) as Box<dyn Controller>)
}

/// A registered controller and its actions.
#[derive(Clone)]
pub struct ControllerEntry {
    name: String,
    type_name: &'static str,
    construct: ConstructFn,
    actions: IndexMap<String, ActionHandle>,
}

impl ControllerEntry {
    /// Returns the controller name (without suffix).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the Rust type name of the controller.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Builds the controller.
    pub fn construct(
        &self,
        deps: &mut Dependencies<'_>,
    ) -> Result<Box<dyn Controller>, InjectionError> {
        (self.construct)(deps)
    }

    /// Returns an action by identifier.
    #[must_use]
    pub fn action(&self, ident: &str) -> Option<&ActionHandle> {
        self.actions.get(ident)
    }

    /// Returns the dedicated error action.
    #[must_use]
    pub fn error_action(&self) -> Option<&ActionHandle> {
        self.actions.get("error")
    }

    /// Iterates over action identifiers in registration order.
    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

impl fmt::Debug for ControllerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerEntry")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Registry of controllers keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct ControllerRegistry {
    entries: IndexMap<String, ControllerEntry>,
}

impl ControllerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller type under a name and returns a builder for
    /// its actions. Registering a name twice replaces the earlier entry.
    pub fn register<C: Controller>(&mut self, name: &str) -> ControllerRegistration<'_, C> {
        let ident = controller_ident(name);
        let entry = ControllerEntry {
            name: name.to_string(),
            type_name: std::any::type_name::<C>(),
            construct: construct_boxed::<C>,
            actions: IndexMap::new(),
        };

        let (index, previous) = self.entries.insert_full(ident, entry);
        let ident = self.entries.get_index(index).map_or("", |(k, _)| k.as_str());
        if previous.is_some() {
            tracing::warn!(controller = %ident, "controller registered twice; replacing");
        }
        tracing::debug!(controller = %ident, "registered controller");

        ControllerRegistration {
            entry: &mut self.entries[index],
            _controller: PhantomData,
        }
    }

    /// Returns an entry by identifier (`BookController`).
    #[must_use]
    pub fn get(&self, ident: &str) -> Option<&ControllerEntry> {
        self.entries.get(ident)
    }

    /// Returns an entry by name (`Book`).
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&ControllerEntry> {
        self.get(&controller_ident(name))
    }

    /// Returns true if a controller with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get_by_name(name).is_some()
    }

    /// Returns true if the controller has the action.
    #[must_use]
    pub fn action_exists(&self, controller: &str, action: &str) -> bool {
        self.get_by_name(controller)
            .is_some_and(|entry| entry.action(&action_ident(action)).is_some())
    }

    /// Returns the number of registered controllers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no controllers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over registered controllers.
    pub fn iter(&self) -> impl Iterator<Item = &ControllerEntry> {
        self.entries.values()
    }
}

/// Builder for a controller's actions.
#[derive(Debug)]
pub struct ControllerRegistration<'r, C> {
    entry: &'r mut ControllerEntry,
    _controller: PhantomData<fn() -> C>,
}

impl<C: Controller> ControllerRegistration<'_, C> {
    /// Registers an action by name.
    pub fn action<F>(
        mut self,
        name: &str,
        params: impl IntoIterator<Item = ParamSpec>,
        func: F,
    ) -> Self
    where
        F: Fn(&mut C, &mut ActionContext<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.entry
            .actions
            .insert(action_ident(name), ActionHandle::typed(params, func));
        self
    }

    /// Registers the default `index` action.
    pub fn index<F>(self, params: impl IntoIterator<Item = ParamSpec>, func: F) -> Self
    where
        F: Fn(&mut C, &mut ActionContext<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.action("index", params, func)
    }

    /// Registers the dedicated error action used by the error cascade.
    pub fn error_action<F>(self, func: F) -> Self
    where
        F: Fn(&mut C, &mut ActionContext<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.action("error", [], func)
    }

    /// Registers a prebuilt action handle.
    pub fn handle(self, name: &str, handle: ActionHandle) -> Self {
        self.entry.actions.insert(action_ident(name), handle);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AppHandle, ControllerBase, DispatchState};
    use heron_router::Args;
    use http::Method;
    use serde_json::json;

    struct Book {
        base: ControllerBase,
        shelf: &'static str,
    }

    impl Controller for Book {
        fn construct(deps: &mut Dependencies<'_>) -> Result<Self, InjectionError> {
            Ok(Self {
                base: deps.base(),
                shelf: "fiction",
            })
        }

        fn base(&self) -> &ControllerBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut ControllerBase {
            &mut self.base
        }
    }

    fn registry() -> ControllerRegistry {
        let mut registry = ControllerRegistry::new();
        registry
            .register::<Book>("Book")
            .index([], |_, _| Ok(json!("list")))
            .action("show", [ParamSpec::int("id")], |book, ctx| {
                Ok(json!({ "shelf": book.shelf, "id": ctx.get("id") }))
            })
            .error_action(|_, ctx| Ok(json!(ctx.error().map(ToString::to_string))));
        registry
    }

    #[test]
    fn test_existence_queries() {
        let registry = registry();
        assert!(registry.contains("Book"));
        assert!(!registry.contains("Author"));
        assert!(registry.action_exists("Book", "show"));
        assert!(registry.action_exists("Book", "index"));
        assert!(registry.action_exists("Book", "error"));
        assert!(!registry.action_exists("Book", "delete"));
        assert!(!registry.action_exists("Author", "show"));
    }

    #[test]
    fn test_action_identifiers() {
        let registry = registry();
        let entry = registry.get("BookController").unwrap();
        let names: Vec<_> = entry.action_names().collect();
        assert_eq!(names, ["index", "showAction", "error"]);
        assert!(entry.error_action().is_some());
        assert!(entry.type_name().ends_with("Book"));
    }

    #[test]
    fn test_construct_and_invoke() {
        let registry = registry();
        let entry = registry.get_by_name("Book").unwrap();

        let app = AppHandle::default();
        let args = Args::new();
        let mut deps = Dependencies::new(&app, "BookController", &args);
        let mut controller = entry.construct(&mut deps).unwrap();

        let mut raw = Args::new();
        raw.insert("id".to_string(), json!("7"));
        let action = entry.action("showAction").unwrap();
        let bound = crate::bind(action.params(), &raw);

        let mut state = DispatchState::new(Method::GET, "/book/7");
        let mut ctx = ActionContext::new(&app, &mut state, bound);
        let value = action.invoke(controller.as_mut(), &mut ctx).unwrap();

        assert_eq!(value, json!({ "shelf": "fiction", "id": 7 }));
    }

    #[test]
    fn test_reregistration_replaces() {
        let mut registry = registry();
        registry.register::<Book>("Book");
        assert_eq!(registry.len(), 1);
        assert!(!registry.action_exists("Book", "show"));
    }
}
