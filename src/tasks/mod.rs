//! # Callable adapters crossing the registration boundary.
//!
//! This module provides the type-erasure layer between user callables and
//! the dispatcher:
//! - [`Invoker`] - erased call wrapper stored in the registry
//! - [`IntoInvoker`] - conversion from plain `Fn` closures (arities 0..=8)
//! - [`BoundCall`] - an invoker partially applied to an argument list
//! - [`IntoArgs`] - tuple adapter building argument lists for dispatch

mod args;
mod invoker;

pub use args::IntoArgs;
pub use invoker::{BoundCall, IntoInvoker, Invoker};
