//! The application.
//!
//! An [`Application`] owns everything one dispatch needs: settings and
//! dependencies behind an [`AppHandle`], the route table, the controller
//! registry and the dispatch observers. Registration happens first; after
//! that [`Application::run`] dispatches exactly one request.

use std::sync::Arc;

use heron_config::HeronConfig;
use heron_core::{
    ActionContext, ActionHandle, AppHandle, AppSettings, Container, Controller,
    ControllerRegistration, ControllerRegistry, DispatchState, HeronError, HeronResult, ParamSpec,
    RequestId, RequestView, ResponseSink,
};
use heron_router::{Call, ExtraArgs, MatchOptions, RouteDefinition, RouteTable};
use heron_telemetry::{
    log_dispatch_complete, log_dispatch_start, record_dispatch, CascadeLevel, InFlightGuard,
};
use http::StatusCode;
use serde_json::Value;

use crate::cascade::ErrorCascade;
use crate::dispatch::{Dispatcher, Failure};
use crate::events::DispatchEvents;

/// A registered route, for introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    /// The normalized pattern.
    pub pattern: String,
    /// Allowed methods; `*` when the route accepts any method.
    pub methods: Vec<String>,
}

/// The result of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    /// Correlation id of the dispatch.
    pub request_id: RequestId,
    /// The response status.
    pub status: StatusCode,
    /// The body handed to the response sink.
    pub body: Option<Value>,
    /// The resolved controller, if resolution got that far.
    pub controller: Option<String>,
    /// The resolved action, if resolution got that far.
    pub action: Option<String>,
    /// The deepest cascade level reached, if the dispatch failed.
    pub cascade: Option<CascadeLevel>,
}

impl DispatchOutcome {
    /// Returns true if the request went through the error cascade.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.cascade.is_some()
    }
}

/// A routing and dispatch application.
///
/// # Example
///
/// ```
/// use heron::prelude::*;
/// use heron::testing::{RecordingResponse, TestRequest};
/// use serde_json::json;
///
/// struct Book {
///     base: ControllerBase,
/// }
///
/// impl Controller for Book {
///     fn construct(deps: &mut Dependencies<'_>) -> Result<Self, InjectionError> {
///         Ok(Self { base: deps.base() })
///     }
///
///     fn base(&self) -> &ControllerBase {
///         &self.base
///     }
///
///     fn base_mut(&mut self) -> &mut ControllerBase {
///         &mut self.base
///     }
/// }
///
/// let mut app = Application::new(AppSettings::default());
/// app.controller::<Book>("Book")
///     .action("show", [ParamSpec::int("id")], |_, ctx| Ok(json!({ "id": ctx.get("id") })));
/// app.get("/book/:id[\\d]", "Book.show")?;
///
/// let mut response = RecordingResponse::new();
/// let outcome = app.run(&TestRequest::get("/book/42"), &mut response)?;
///
/// assert_eq!(outcome.status.as_u16(), 200);
/// assert_eq!(response.body(), Some(&json!({ "id": 42 })));
/// # Ok::<(), HeronError>(())
/// ```
#[derive(Debug)]
pub struct Application {
    app: AppHandle,
    routes: RouteTable<ActionHandle>,
    controllers: ControllerRegistry,
    events: DispatchEvents,
    dispatched: bool,
}

impl Application {
    /// Creates an application with default matching options and no
    /// registered dependencies.
    #[must_use]
    pub fn new(settings: AppSettings) -> Self {
        Self::builder().settings(settings).build()
    }

    /// Creates an application builder.
    #[must_use]
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    /// Creates an application from configuration, importing its routes.
    ///
    /// # Errors
    ///
    /// Returns [`HeronError::Route`] if a configured route fails to register.
    pub fn from_config(config: &HeronConfig) -> HeronResult<Self> {
        let mut app = Self::builder()
            .settings(config.app_settings())
            .match_options(config.match_options())
            .build();
        app.add_routes(config.routing.routes.iter().cloned())?;

        tracing::info!(
            environment = %config.app.environment,
            routes = app.routes.len(),
            "application configured"
        );
        Ok(app)
    }

    /// Returns the application handle shared with controllers.
    #[must_use]
    pub fn handle(&self) -> &AppHandle {
        &self.app
    }

    /// Returns the settings.
    #[must_use]
    pub fn settings(&self) -> &AppSettings {
        self.app.settings()
    }

    /// Registers a controller and returns a builder for its actions.
    pub fn controller<C: Controller>(&mut self, name: &str) -> ControllerRegistration<'_, C> {
        self.controllers.register::<C>(name)
    }

    /// Returns the controller registry.
    #[must_use]
    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    /// Registers a call for a comma-separated method list.
    ///
    /// # Errors
    ///
    /// Returns [`HeronError::Route`] for an empty or malformed pattern or
    /// an invalid method token.
    pub fn add_route(
        &mut self,
        pattern: &str,
        methods: &str,
        call: impl Into<Call<ActionHandle>>,
        extra_args: ExtraArgs,
    ) -> HeronResult<()> {
        Ok(self.routes.add_route(pattern, methods, call, extra_args)?)
    }

    /// Imports route definitions in order.
    ///
    /// # Errors
    ///
    /// Stops at the first definition that fails to register.
    pub fn add_routes(
        &mut self,
        definitions: impl IntoIterator<Item = RouteDefinition>,
    ) -> HeronResult<()> {
        Ok(self.routes.add_routes(definitions)?)
    }

    /// Registers a GET call.
    ///
    /// # Errors
    ///
    /// See [`Application::add_route`].
    pub fn get(&mut self, pattern: &str, call: impl Into<Call<ActionHandle>>) -> HeronResult<()> {
        Ok(self.routes.get(pattern, call)?)
    }

    /// Registers a POST call.
    ///
    /// # Errors
    ///
    /// See [`Application::add_route`].
    pub fn post(&mut self, pattern: &str, call: impl Into<Call<ActionHandle>>) -> HeronResult<()> {
        Ok(self.routes.post(pattern, call)?)
    }

    /// Registers a PUT call.
    ///
    /// # Errors
    ///
    /// See [`Application::add_route`].
    pub fn put(&mut self, pattern: &str, call: impl Into<Call<ActionHandle>>) -> HeronResult<()> {
        Ok(self.routes.put(pattern, call)?)
    }

    /// Registers a DELETE call.
    ///
    /// # Errors
    ///
    /// See [`Application::add_route`].
    pub fn delete(
        &mut self,
        pattern: &str,
        call: impl Into<Call<ActionHandle>>,
    ) -> HeronResult<()> {
        Ok(self.routes.delete(pattern, call)?)
    }

    /// Registers a PATCH call.
    ///
    /// # Errors
    ///
    /// See [`Application::add_route`].
    pub fn patch(&mut self, pattern: &str, call: impl Into<Call<ActionHandle>>) -> HeronResult<()> {
        Ok(self.routes.patch(pattern, call)?)
    }

    /// Registers a call for any method.
    ///
    /// # Errors
    ///
    /// See [`Application::add_route`].
    pub fn any(&mut self, pattern: &str, call: impl Into<Call<ActionHandle>>) -> HeronResult<()> {
        Ok(self.routes.any(pattern, call)?)
    }

    /// Registers a free-standing callable.
    ///
    /// The callable runs with an instance of the default controller, which
    /// must be registered.
    ///
    /// # Errors
    ///
    /// See [`Application::add_route`].
    pub fn callable<F>(
        &mut self,
        pattern: &str,
        methods: &str,
        params: impl IntoIterator<Item = ParamSpec>,
        func: F,
    ) -> HeronResult<()>
    where
        F: Fn(&mut ActionContext<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let handle = ActionHandle::callable(params, func);
        self.add_route(pattern, methods, handle, ExtraArgs::new())
    }

    /// Returns the registered routes in declaration order.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.routes
            .routes()
            .iter()
            .map(|route| RouteInfo {
                pattern: route.pattern().to_string(),
                methods: route.allowed_methods(),
            })
            .collect()
    }

    /// Returns the dispatch observers.
    #[must_use]
    pub fn events(&self) -> &DispatchEvents {
        &self.events
    }

    /// Returns the dispatch observers for registration.
    pub fn events_mut(&mut self) -> &mut DispatchEvents {
        &mut self.events
    }

    /// Returns true once [`Application::run`] has been called.
    #[must_use]
    pub const fn has_dispatched(&self) -> bool {
        self.dispatched
    }

    /// Dispatches one request.
    ///
    /// Request-level failures (no route, wrong method, unknown controller
    /// or action, errors from action code) go through the error cascade
    /// and still produce a response. Only configuration errors are
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`HeronError::AlreadyDispatched`] on a second call
    /// - [`HeronError::Route`] if the route table is empty or a directive
    ///   is malformed
    /// - [`HeronError::Injection`] if a controller dependency has no provider
    pub fn run(
        &mut self,
        request: &dyn RequestView,
        response: &mut dyn ResponseSink,
    ) -> HeronResult<DispatchOutcome> {
        if self.dispatched {
            return Err(HeronError::AlreadyDispatched);
        }
        self.dispatched = true;

        let _in_flight = InFlightGuard::new();
        let mut state = DispatchState::new(request.method().clone(), request.path());
        log_dispatch_start!(state.request_id(), state.method, state.path);
        self.events.fire_before(&state);

        let dispatcher = Dispatcher::new(&self.app, &self.routes, &self.controllers);
        let (status, body, cascade) = match dispatcher.dispatch(&mut state) {
            Ok(value) => (StatusCode::OK, Self::success_body(&mut state, value), None),
            Err(Failure::Recoverable(error)) => {
                let outcome = ErrorCascade::new(&self.app, &self.controllers, &self.events)
                    .handle(&mut state, &error, response);
                (outcome.status, outcome.body, Some(outcome.level))
            }
            Err(Failure::Fatal(error)) => {
                tracing::error!(
                    request_id = %state.request_id(),
                    error = %error,
                    "dispatch aborted by configuration error"
                );
                return Err(error);
            }
        };

        response.set_body(body.clone());

        let elapsed = state.elapsed();
        let controller = state.controller.as_deref().unwrap_or("-");
        let action = state.action.as_deref().unwrap_or("-");
        record_dispatch(controller, action, status.as_u16(), elapsed);
        log_dispatch_complete!(
            state.request_id(),
            controller,
            action,
            status.as_u16(),
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
        );
        self.events.fire_after(&state, status);

        Ok(DispatchOutcome {
            request_id: state.request_id(),
            status,
            body,
            controller: state.controller,
            action: state.action,
            cascade,
        })
    }

    fn success_body(state: &mut DispatchState, value: Value) -> Option<Value> {
        match value {
            Value::Null => {
                let output = state.take_output();
                (!output.is_empty()).then_some(Value::String(output))
            }
            value => Some(value),
        }
    }
}

/// Builder for [`Application`].
#[derive(Debug, Default)]
pub struct ApplicationBuilder {
    settings: AppSettings,
    container: Container,
    options: MatchOptions,
    events: DispatchEvents,
}

impl ApplicationBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the dispatch settings.
    #[must_use]
    pub fn settings(mut self, settings: AppSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the dependency container.
    #[must_use]
    pub fn container(mut self, container: Container) -> Self {
        self.container = container;
        self
    }

    /// Registers a shared dependency instance.
    #[must_use]
    pub fn service<T: Send + Sync + 'static>(mut self, service: Arc<T>) -> Self {
        self.container.register(service);
        self
    }

    /// Sets the matching options.
    #[must_use]
    pub fn match_options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the dispatch observers.
    #[must_use]
    pub fn events(mut self, events: DispatchEvents) -> Self {
        self.events = events;
        self
    }

    /// Builds the application.
    #[must_use]
    pub fn build(self) -> Application {
        Application {
            app: AppHandle::new(self.settings, self.container),
            routes: RouteTable::with_options(self.options),
            controllers: ControllerRegistry::new(),
            events: self.events,
            dispatched: false,
        }
    }
}
