//! # Heron Core
//!
//! Core types and traits for the Heron dispatch engine.
//!
//! This crate provides the foundational types shared by the dispatcher:
//!
//! - [`Controller`] / [`ControllerBase`] - Controllers and their shared base state
//! - [`ControllerRegistry`] - Controller and action existence lookups
//! - [`ActionHandle`] / [`bind`] - Declared parameters and argument binding
//! - [`Container`](di::Container) - Typed dependency registry
//! - [`DispatchState`] / [`RequestId`] - Per-request state
//! - [`HeronError`] - Dispatch error taxonomy and status derivation
//! - [`RequestView`] / [`ResponseSink`] - Contracts with the HTTP layer

#![doc(html_root_url = "https://docs.rs/heron-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod app;
mod context;
pub mod controller;
pub mod di;
mod error;
mod message;
mod registry;

pub use action::{bind, ActionContext, ActionFn, ActionHandle, BoundArgs, ParamKind, ParamSpec};
pub use app::{AppHandle, AppSettings};
pub use context::{DispatchState, RequestId};
pub use controller::{AsAny, Controller, ControllerBase, ControllerOptions, Dependencies};
pub use di::{Container, Inject, InjectionError};
pub use error::{
    derive_status, error_code, render_debug, CodedError, ErrorDetail, ErrorEnvelope, HeronError,
    HeronResult, HttpError,
};
pub use message::{RequestView, ResponseSink};
pub use registry::{ConstructFn, ControllerEntry, ControllerRegistration, ControllerRegistry};
