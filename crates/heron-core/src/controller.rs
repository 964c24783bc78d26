//! Controllers and their construction-time dependencies.
//!
//! A controller is any type implementing [`Controller`]. Every controller
//! owns a [`ControllerBase`], which holds the owning application and the
//! framework options it was built with. The base replaces walking a class
//! hierarchy: the builder only has to check [`ControllerBase::is_initialized`]
//! to know whether the base still needs to be set up.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use heron_core::{Controller, ControllerBase, Dependencies, InjectionError};
//!
//! #[derive(Default)]
//! struct Pager { per_page: usize }
//!
//! struct BookController {
//!     base: ControllerBase,
//!     pager: Arc<Pager>,
//! }
//!
//! impl Controller for BookController {
//!     fn construct(deps: &mut Dependencies<'_>) -> Result<Self, InjectionError> {
//!         Ok(Self { base: deps.base(), pager: deps.auto::<Pager>() })
//!     }
//!
//!     fn base(&self) -> &ControllerBase { &self.base }
//!     fn base_mut(&mut self) -> &mut ControllerBase { &mut self.base }
//! }
//! ```

use std::any::Any;
use std::sync::Arc;

use heron_router::Args;
use indexmap::IndexMap;
use serde_json::Value;

use crate::app::AppHandle;
use crate::di::InjectionError;

/// Argument names that are framework options rather than constructor values.
pub const OPTION_KEYS: [&str; 3] = ["layout", "format", "charset"];

/// Framework options a controller was built with.
pub type ControllerOptions = IndexMap<String, Value>;

/// Splits framework options out of a set of arguments.
///
/// ```
/// use heron_core::controller::extract_options;
/// use heron_router::Args;
/// use serde_json::json;
///
/// let mut args = Args::new();
/// args.insert("id".into(), json!("7"));
/// args.insert("format".into(), json!("json"));
///
/// let options = extract_options(&args);
/// assert_eq!(options.len(), 1);
/// assert_eq!(options["format"], "json");
/// ```
#[must_use]
pub fn extract_options(args: &Args) -> ControllerOptions {
    args.iter()
        .filter(|(key, _)| OPTION_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// State shared by every controller.
#[derive(Debug, Clone, Default)]
pub struct ControllerBase {
    app: Option<AppHandle>,
    options: ControllerOptions,
}

impl ControllerBase {
    /// Creates an initialized base.
    #[must_use]
    pub fn new(app: AppHandle, options: ControllerOptions) -> Self {
        Self {
            app: Some(app),
            options,
        }
    }

    /// Creates a base that has not been initialized yet.
    #[must_use]
    pub fn uninit() -> Self {
        Self::default()
    }

    /// Initializes the base with the owning application and options.
    pub fn init(&mut self, app: AppHandle, options: ControllerOptions) {
        self.app = Some(app);
        self.options = options;
    }

    /// Returns true once the base has an owning application.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.app.is_some()
    }

    /// Returns the owning application, if initialized.
    #[must_use]
    pub fn app(&self) -> Option<&AppHandle> {
        self.app.as_ref()
    }

    /// Returns a framework option.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    /// Returns all framework options.
    #[must_use]
    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }
}

/// Upcast to `Any` for typed action dispatch.
pub trait AsAny {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A controller: a type that owns a base and can be built from dependencies.
pub trait Controller: AsAny + Send + 'static {
    /// Builds the controller.
    ///
    /// Dependencies that have no provider should be requested with
    /// [`Dependencies::inject`], which fails with an [`InjectionError`];
    /// optional ones with [`Dependencies::auto`], which falls back to the
    /// type's default.
    fn construct(deps: &mut Dependencies<'_>) -> Result<Self, InjectionError>
    where
        Self: Sized;

    /// Returns the controller's base.
    fn base(&self) -> &ControllerBase;

    /// Returns the controller's base mutably.
    fn base_mut(&mut self) -> &mut ControllerBase;
}

/// Everything a controller can draw on while being constructed.
#[derive(Debug)]
pub struct Dependencies<'a> {
    app: &'a AppHandle,
    values: &'a Args,
    options: ControllerOptions,
    controller: &'a str,
}

impl<'a> Dependencies<'a> {
    /// Creates a dependency set.
    ///
    /// `values` are the caller-supplied arguments; options are extracted
    /// from them by name.
    #[must_use]
    pub fn new(app: &'a AppHandle, controller: &'a str, values: &'a Args) -> Self {
        Self {
            app,
            values,
            options: extract_options(values),
            controller,
        }
    }

    /// Returns the controller identifier being built.
    #[must_use]
    pub fn controller(&self) -> &str {
        self.controller
    }

    /// Returns the owning application.
    #[must_use]
    pub fn app(&self) -> AppHandle {
        self.app.clone()
    }

    /// Returns an initialized base for the controller.
    #[must_use]
    pub fn base(&self) -> ControllerBase {
        ControllerBase::new(self.app.clone(), self.options.clone())
    }

    /// Returns a required dependency from the container.
    pub fn inject<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, InjectionError> {
        self.app.container().resolve_required::<T>().map_err(|err| {
            tracing::error!(
                controller = self.controller,
                dependency = err.type_name(),
                "missing controller dependency"
            );
            err
        })
    }

    /// Returns a dependency from the container, or a default instance.
    pub fn auto<T: Default + Send + Sync + 'static>(&self) -> Arc<T> {
        self.app
            .container()
            .resolve::<T>()
            .unwrap_or_else(|| Arc::new(T::default()))
    }

    /// Returns a caller-supplied value.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns a framework option.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    /// Returns all framework options.
    #[must_use]
    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }
}
