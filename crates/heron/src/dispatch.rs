//! The dispatcher.
//!
//! One dispatch runs these phases against a [`DispatchState`]:
//!
//! ```text
//! resolve path ─► check method ─► pick call ─► prepare arguments
//!      │               │                             │
//!   NotFound     MethodNotAllowed                    ▼
//!                              controller exists? ─► action exists?
//!                                     │                    │
//!                            ControllerNotFound     ActionNotFound
//!                                                          │
//!                                                          ▼
//!                                  build controller ─► bind + invoke
//! ```
//!
//! Request-level failures come back as [`Failure::Recoverable`] and go
//! to the error cascade. A broken route table or a missing dependency
//! provider is a [`Failure::Fatal`] configuration error.

use heron_core::{
    bind, ActionContext, ActionHandle, AppHandle, ControllerEntry, ControllerRegistry,
    DispatchState, HeronError,
};
use heron_router::{RouteTable, Target};
use serde_json::Value;

use crate::builder::ControllerBuilder;

/// Why a dispatch did not produce a value.
#[derive(Debug)]
pub enum Failure {
    /// A configuration error; returned to the caller of `run`.
    Fatal(HeronError),
    /// A request-level error; handled by the error cascade.
    Recoverable(anyhow::Error),
}

impl Failure {
    fn recoverable(error: HeronError) -> Self {
        Self::Recoverable(anyhow::Error::new(error))
    }
}

impl From<heron_router::RouteError> for Failure {
    fn from(error: heron_router::RouteError) -> Self {
        Self::Fatal(HeronError::Route(error))
    }
}

/// Runs the dispatch phases for one request.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    app: &'a AppHandle,
    routes: &'a RouteTable<ActionHandle>,
    controllers: &'a ControllerRegistry,
}

impl<'a> Dispatcher<'a> {
    /// Creates a dispatcher over an application's tables.
    #[must_use]
    pub const fn new(
        app: &'a AppHandle,
        routes: &'a RouteTable<ActionHandle>,
        controllers: &'a ControllerRegistry,
    ) -> Self {
        Self {
            app,
            routes,
            controllers,
        }
    }

    /// Dispatches the request described by `state`.
    ///
    /// The state records the matched route, then the controller and
    /// action once each is known to exist.
    ///
    /// # Errors
    ///
    /// See [`Failure`].
    pub fn dispatch(&self, state: &mut DispatchState) -> Result<Value, Failure> {
        let Some(resolution) = self.routes.resolve(&state.path, None)? else {
            return Err(Failure::recoverable(HeronError::not_found(state.path.clone())));
        };
        let route = resolution.route;
        state.matched_route = Some(route.pattern().to_string());

        let Some(call) = route.call_for(&state.method) else {
            return Err(Failure::recoverable(HeronError::MethodNotAllowed {
                method: state.method.to_string(),
                path: state.path.clone(),
                allowed: route.allowed_methods(),
            }));
        };

        let resolver = self.app.settings().resolver();
        let prepared = resolver
            .prepare(call, &resolution.matched.params, route.extra_args())
            .map_err(|e| Failure::recoverable(HeronError::internal(e.to_string())))?;
        state.action_params.clone_from(&prepared.args);

        tracing::debug!(
            route = %route.pattern(),
            controller = %prepared.target.controller(),
            args = prepared.args.len(),
            "route resolved"
        );

        let (entry, action) = match &prepared.target {
            Target::Action(directive) => {
                let ident = directive.controller_ident();
                let entry = self.entry(&ident)?;
                state.controller = Some(directive.controller.clone());

                let action_ident = directive.action_ident();
                let action = entry.action(&action_ident).ok_or_else(|| {
                    Failure::recoverable(HeronError::ActionNotFound {
                        controller: ident.clone(),
                        action: action_ident.clone(),
                    })
                })?;
                state.action = Some(directive.action.clone());
                (entry, action.clone())
            }
            Target::Callable {
                controller,
                handler,
            } => {
                let entry = self.entry(&heron_router::controller_ident(controller))?;
                state.controller = Some(controller.clone());
                (entry, handler.clone())
            }
        };

        let mut controller = ControllerBuilder::new(self.app)
            .build(entry, &prepared.args)
            .map_err(|e| Failure::Fatal(HeronError::Injection(e)))?;

        let bound = bind(action.params(), &prepared.args);
        let mut ctx = ActionContext::new(self.app, state, bound);
        action
            .invoke(controller.as_mut(), &mut ctx)
            .map_err(Failure::Recoverable)
    }

    fn entry(&self, ident: &str) -> Result<&'a ControllerEntry, Failure> {
        self.controllers
            .get(ident)
            .ok_or_else(|| Failure::recoverable(HeronError::ControllerNotFound(ident.to_string())))
    }
}
