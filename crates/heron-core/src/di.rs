//! Dependency injection container.
//!
//! Controllers declare their dependencies in [`Controller::construct`]
//! and pull them from the container at construction time. The container
//! maps a type to either a shared instance or a factory that builds one.
//!
//! # Example
//!
//! ```rust
//! use heron_core::di::{Container, Inject};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! let mut container = Container::new();
//! container.register(Arc::new(Database { url: "postgres://localhost/db".into() }));
//!
//! let db: Arc<Database> = container.resolve().unwrap();
//! assert_eq!(db.url, "postgres://localhost/db");
//! ```
//!
//! [`Controller::construct`]: crate::Controller::construct

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

type SharedAny = Arc<dyn Any + Send + Sync>;
type Factory = Arc<dyn Fn(&Container) -> Result<SharedAny, InjectionError> + Send + Sync>;

/// Error when a dependency cannot be provided.
///
/// Injection errors are configuration errors: they mean the application
/// was assembled without a provider the controllers need.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InjectionError {
    /// No instance or factory is registered for the type.
    #[error("Failed to inject {type_name}: service not registered")]
    NotRegistered {
        /// The type that could not be resolved.
        type_name: &'static str,
    },

    /// A factory or constructor failed.
    #[error("Failed to inject {type_name}: {reason}")]
    Custom {
        /// The type that could not be resolved.
        type_name: &'static str,
        /// The reason for the failure.
        reason: String,
    },
}

impl InjectionError {
    /// Creates a new injection error for a missing service.
    pub fn not_registered<T: ?Sized>() -> Self {
        Self::NotRegistered {
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Creates a new injection error with a custom reason.
    pub fn custom<T: ?Sized>(reason: impl Into<String>) -> Self {
        Self::Custom {
            type_name: std::any::type_name::<T>(),
            reason: reason.into(),
        }
    }

    /// Returns the name of the type that failed.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::NotRegistered { type_name } | Self::Custom { type_name, .. } => type_name,
        }
    }
}

/// A dependency injection container.
///
/// Instances are shared `Arc`s; factories run on every resolution and may
/// resolve their own dependencies from the container.
///
/// # Thread Safety
///
/// The container is `Send + Sync`. Services must be `Send + Sync`.
#[derive(Default, Clone)]
pub struct Container {
    services: HashMap<TypeId, SharedAny>,
    factories: HashMap<TypeId, Factory>,
}

impl Container {
    /// Creates a new empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a shared service instance.
    ///
    /// ```rust
    /// use heron_core::di::Container;
    /// use std::sync::Arc;
    ///
    /// struct Mailer;
    ///
    /// let mut container = Container::new();
    /// container.register(Arc::new(Mailer));
    /// assert!(container.contains::<Mailer>());
    /// ```
    pub fn register<T: Send + Sync + 'static>(&mut self, service: Arc<T>) {
        self.services.insert(TypeId::of::<T>(), service);
    }

    /// Registers a factory that builds a fresh service on each resolution.
    ///
    /// ```rust
    /// use heron_core::di::Container;
    ///
    /// struct Clock(u64);
    ///
    /// let mut container = Container::new();
    /// container.register_factory(|_| Ok(Clock(42)));
    /// assert_eq!(container.resolve::<Clock>().unwrap().0, 42);
    /// ```
    pub fn register_factory<T, F>(&mut self, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> Result<T, InjectionError> + Send + Sync + 'static,
    {
        let factory: Factory =
            Arc::new(move |container| factory(container).map(|value| Arc::new(value) as SharedAny));
        self.factories.insert(TypeId::of::<T>(), factory);
    }

    /// Resolves a service, returning `None` if it is missing or its factory fails.
    #[must_use]
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        match self.resolve_required::<T>() {
            Ok(service) => Some(service),
            Err(InjectionError::NotRegistered { .. }) => None,
            Err(err) => {
                tracing::warn!(error = %err, "dependency factory failed");
                None
            }
        }
    }

    /// Resolves a service or returns an error.
    ///
    /// Registered instances take precedence over factories.
    pub fn resolve_required<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, InjectionError> {
        let id = TypeId::of::<T>();
        let service = if let Some(service) = self.services.get(&id) {
            Arc::clone(service)
        } else if let Some(factory) = self.factories.get(&id) {
            factory(self)?
        } else {
            return Err(InjectionError::not_registered::<T>());
        };

        service
            .downcast::<T>()
            .map_err(|_| InjectionError::custom::<T>("registered value has a different type"))
    }

    /// Checks if an instance or factory is registered for the type.
    #[must_use]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        let id = TypeId::of::<T>();
        self.services.contains_key(&id) || self.factories.contains_key(&id)
    }

    /// Returns the number of registered instances and factories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len() + self.factories.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty() && self.factories.is_empty()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("service_count", &self.services.len())
            .field("factory_count", &self.factories.len())
            .finish()
    }
}

/// A wrapper for injected dependencies.
///
/// Controllers can hold `Inject<T>` fields to make the injected nature of
/// a dependency explicit.
///
/// ```rust
/// use heron_core::di::{Container, Inject};
/// use std::sync::Arc;
///
/// struct Catalog { size: usize }
///
/// let mut container = Container::new();
/// container.register(Arc::new(Catalog { size: 3 }));
///
/// let catalog: Inject<Catalog> = Inject::from_container(&container).unwrap();
/// assert_eq!(catalog.size, 3);
/// ```
#[derive(Clone)]
pub struct Inject<T>(pub Arc<T>);

impl<T> Inject<T> {
    /// Creates a new `Inject` wrapper.
    pub fn new(inner: Arc<T>) -> Self {
        Self(inner)
    }

    /// Returns a reference to the inner service.
    pub fn inner(&self) -> &T {
        &self.0
    }

    /// Converts into the inner `Arc`.
    pub fn into_inner(self) -> Arc<T> {
        self.0
    }
}

impl<T> std::ops::Deref for Inject<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Inject").field(&self.0).finish()
    }
}

impl<T: Send + Sync + 'static> Inject<T> {
    /// Extracts the service from a container.
    pub fn from_container(container: &Container) -> Result<Self, InjectionError> {
        container.resolve_required::<T>().map(Inject)
    }
}
