//! Actions: declared parameters, argument binding and invocation.
//!
//! An action declares its parameters as a list of [`ParamSpec`]s. At
//! dispatch time [`bind`] matches the prepared arguments against them:
//!
//! 1. the argument keyed by the parameter's name, else
//! 2. the argument at the parameter's position, if it is not already used
//!    and its key is not the name of another declared parameter, else
//! 3. the parameter's declared default, else
//! 4. `null`.
//!
//! Scalar-typed parameters get a best-effort coercion from strings, keeping
//! the raw value when it does not parse. Arguments no parameter consumed
//! are passed along as trailing extras.

use std::fmt;
use std::sync::Arc;

use heron_router::{Args, Call};
use http::Method;
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};

use crate::app::AppHandle;
use crate::context::{DispatchState, RequestId};
use crate::controller::Controller;
use crate::error::{ErrorEnvelope, HeronError};

/// Declared type of an action parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamKind {
    /// No coercion.
    #[default]
    Any,
    /// String; scalars are rendered to text.
    Str,
    /// Integer.
    Int,
    /// Floating point number.
    Float,
    /// Boolean (`1`/`0`, `true`/`false`, `on`/`off`, `yes`/`no`).
    Bool,
}

impl ParamKind {
    /// Coerces a value to this kind, returning it unchanged when it does not fit.
    ///
    /// ```
    /// use heron_core::ParamKind;
    /// use serde_json::json;
    ///
    /// assert_eq!(ParamKind::Int.coerce(json!("7")), json!(7));
    /// assert_eq!(ParamKind::Int.coerce(json!("seven")), json!("seven"));
    /// assert_eq!(ParamKind::Bool.coerce(json!("on")), json!(true));
    /// assert_eq!(ParamKind::Str.coerce(json!(12)), json!("12"));
    /// ```
    #[must_use]
    pub fn coerce(self, value: Value) -> Value {
        match (self, value) {
            (Self::Int, Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(n) => Value::from(n),
                Err(_) => Value::String(s),
            },
            (Self::Float, Value::String(s)) => match s.trim().parse::<f64>().ok().and_then(Number::from_f64) {
                Some(n) => Value::Number(n),
                None => Value::String(s),
            },
            (Self::Float, Value::Number(n)) => n
                .as_f64()
                .and_then(Number::from_f64)
                .map_or(Value::Number(n), Value::Number),
            (Self::Bool, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => Value::Bool(true),
                "0" | "false" | "off" | "no" | "" => Value::Bool(false),
                _ => Value::String(s),
            },
            (Self::Str, Value::Number(n)) => Value::String(n.to_string()),
            (Self::Str, Value::Bool(b)) => Value::String(b.to_string()),
            (_, value) => value,
        }
    }
}

/// A declared action parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: String,
    /// Declared kind.
    pub kind: ParamKind,
    /// Declared default value.
    pub default: Option<Value>,
}

impl ParamSpec {
    /// Creates an untyped parameter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Any,
            default: None,
        }
    }

    /// Creates a string parameter.
    pub fn str(name: impl Into<String>) -> Self {
        Self::new(name).kind(ParamKind::Str)
    }

    /// Creates an integer parameter.
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name).kind(ParamKind::Int)
    }

    /// Creates a float parameter.
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name).kind(ParamKind::Float)
    }

    /// Creates a boolean parameter.
    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name).kind(ParamKind::Bool)
    }

    /// Sets the kind.
    #[must_use]
    pub fn kind(mut self, kind: ParamKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Arguments bound to an action's declared parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    /// Declared parameters with their values, in declaration order.
    pub params: Vec<(String, Value)>,
    /// Arguments no declared parameter consumed, in argument order.
    pub extras: Vec<Value>,
}

/// Binds prepared arguments to declared parameters.
///
/// ```
/// use heron_core::{bind, ParamSpec};
/// use heron_router::Args;
/// use serde_json::json;
///
/// let mut args = Args::new();
/// args.insert("id".into(), json!("7"));
/// args.insert("slug".into(), json!("dune"));
///
/// let bound = bind(&[ParamSpec::int("id")], &args);
/// assert_eq!(bound.params, [("id".to_string(), json!(7))]);
/// assert_eq!(bound.extras, [json!("dune")]);
/// ```
#[must_use]
pub fn bind(specs: &[ParamSpec], args: &Args) -> BoundArgs {
    let mut used = vec![false; args.len()];
    let mut params = Vec::with_capacity(specs.len());

    for (position, spec) in specs.iter().enumerate() {
        let by_name = args.get_index_of(&spec.name);
        let by_position = || {
            let (key, _) = args.get_index(position)?;
            let claimed = used[position] || specs.iter().any(|s| &s.name == key);
            (!claimed).then_some(position)
        };

        let value = match by_name.or_else(by_position) {
            Some(index) => {
                used[index] = true;
                spec.kind.coerce(args[index].clone())
            }
            None => spec.default.clone().unwrap_or(Value::Null),
        };
        params.push((spec.name.clone(), value));
    }

    let extras = args
        .values()
        .zip(&used)
        .filter(|(_, used)| !**used)
        .map(|(value, _)| value.clone())
        .collect();

    BoundArgs { params, extras }
}

/// What an action sees while it runs.
#[derive(Debug)]
pub struct ActionContext<'a> {
    app: &'a AppHandle,
    state: &'a mut DispatchState,
    bound: BoundArgs,
    error: Option<&'a anyhow::Error>,
}

impl<'a> ActionContext<'a> {
    /// Creates a context for a normal action.
    pub fn new(app: &'a AppHandle, state: &'a mut DispatchState, bound: BoundArgs) -> Self {
        Self {
            app,
            state,
            bound,
            error: None,
        }
    }

    /// Creates a context for an error action handling `error`.
    pub fn for_error(
        app: &'a AppHandle,
        state: &'a mut DispatchState,
        error: &'a anyhow::Error,
    ) -> Self {
        Self {
            app,
            state,
            bound: BoundArgs::default(),
            error: Some(error),
        }
    }

    /// Returns the owning application.
    #[must_use]
    pub fn app(&self) -> &AppHandle {
        self.app
    }

    /// Returns a bound parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bound
            .params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Returns a bound parameter as a string slice.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Returns the argument at a position, counting declared parameters
    /// first and then extras.
    #[must_use]
    pub fn at(&self, position: usize) -> Option<&Value> {
        let declared = self.bound.params.len();
        if position < declared {
            Some(&self.bound.params[position].1)
        } else {
            self.bound.extras.get(position - declared)
        }
    }

    /// Deserializes a bound parameter.
    pub fn parse<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<T> {
        let value = self.get(name).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value)
            .map_err(|e| anyhow::anyhow!("parameter `{name}` has an unexpected type: {e}"))
    }

    /// Returns all bound parameters.
    #[must_use]
    pub fn params(&self) -> &[(String, Value)] {
        &self.bound.params
    }

    /// Returns the trailing extra arguments.
    #[must_use]
    pub fn extras(&self) -> &[Value] {
        &self.bound.extras
    }

    /// Writes to the implicit output buffer.
    pub fn echo(&mut self, text: impl AsRef<str>) {
        self.state.echo(text.as_ref());
    }

    /// Returns what has been written to the output buffer so far.
    #[must_use]
    pub fn output(&self) -> &str {
        self.state.output()
    }

    /// Returns the error being handled, inside an error action.
    #[must_use]
    pub fn error(&self) -> Option<&anyhow::Error> {
        self.error
    }

    /// Returns a serializable envelope for the error being handled.
    #[must_use]
    pub fn error_envelope(&self) -> Option<ErrorEnvelope> {
        let request_id = self.state.request_id().to_string();
        self.error
            .map(|error| ErrorEnvelope::from_error(error, Some(&request_id)))
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.state.request_id()
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.state.method
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.state.path
    }
}

/// Signature of a stored action.
pub type ActionFn =
    dyn Fn(&mut dyn Controller, &mut ActionContext<'_>) -> anyhow::Result<Value> + Send + Sync;

/// An invocable action with its declared parameters.
#[derive(Clone)]
pub struct ActionHandle {
    params: Arc<[ParamSpec]>,
    func: Arc<ActionFn>,
}

impl ActionHandle {
    /// Creates an action over any controller.
    pub fn new<F>(params: impl IntoIterator<Item = ParamSpec>, func: F) -> Self
    where
        F: Fn(&mut dyn Controller, &mut ActionContext<'_>) -> anyhow::Result<Value>
            + Send
            + Sync
            + 'static,
    {
        Self {
            params: params.into_iter().collect(),
            func: Arc::new(func),
        }
    }

    /// Creates an action bound to a concrete controller type.
    ///
    /// Invoking it on a different controller type is an internal error.
    pub fn typed<C, F>(params: impl IntoIterator<Item = ParamSpec>, func: F) -> Self
    where
        C: Controller,
        F: Fn(&mut C, &mut ActionContext<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::new(params, move |controller: &mut dyn Controller, ctx: &mut ActionContext<'_>| {
            let controller = controller.as_any_mut().downcast_mut::<C>().ok_or_else(|| {
                HeronError::internal(format!(
                    "action expects controller type `{}`",
                    std::any::type_name::<C>()
                ))
            })?;
            func(controller, ctx)
        })
    }

    /// Creates a free-standing callable that ignores its owning controller.
    ///
    /// ```
    /// use heron_core::{ActionHandle, ParamSpec};
    /// use serde_json::json;
    ///
    /// let ping = ActionHandle::callable([ParamSpec::str("name")], |ctx| {
    ///     Ok(json!(format!("pong {}", ctx.get_str("name").unwrap_or("?"))))
    /// });
    /// assert_eq!(ping.params().len(), 1);
    /// ```
    pub fn callable<F>(params: impl IntoIterator<Item = ParamSpec>, func: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::new(params, move |_: &mut dyn Controller, ctx: &mut ActionContext<'_>| func(ctx))
    }

    /// Returns the declared parameters.
    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Invokes the action.
    pub fn invoke(
        &self,
        controller: &mut dyn Controller,
        ctx: &mut ActionContext<'_>,
    ) -> anyhow::Result<Value> {
        (self.func)(controller, ctx)
    }
}

impl From<ActionHandle> for Call<ActionHandle> {
    fn from(handle: ActionHandle) -> Self {
        Self::Handler(handle)
    }
}

impl fmt::Debug for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionHandle")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
