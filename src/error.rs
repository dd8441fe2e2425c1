//! # Error types used by the tasklane engine.
//!
//! This module defines three error enums:
//!
//! - [`EngineError`] errors raised by the registration and dispatch surface.
//! - [`ArgError`] the reason an invoker rejected a supplied argument list.
//! - [`ValueError`] errors raised when unwrapping a [`Value`](crate::Value).
//!
//! All types provide an `as_label` helper returning a short stable
//! snake_case label for logs and metrics.
//!
//! Control operations keyed on an absent id/type/group are *not* errors:
//! they are no-ops. A callable that panics is not an error either; the
//! panic is caught at the worker boundary and reported as a normal finish
//! with an empty result.

use thiserror::Error;

use crate::core::TaskType;

/// # Errors produced by the registration and dispatch API.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EngineError {
    /// Attempted to register a task type that already exists in the registry.
    #[error("task type {ttype} is already registered")]
    AlreadyRegistered {
        /// The duplicate task type.
        ttype: TaskType,
    },

    /// Attempted to dispatch a task type with no registration.
    #[error("task type {ttype} is not registered")]
    NotRegistered {
        /// The unknown task type.
        ttype: TaskType,
    },

    /// The supplied arguments do not match the registered invoker.
    ///
    /// Raised by dispatch before any task record is created.
    #[error("arguments do not match the invoker for task type {ttype}: {source}")]
    ArgMismatch {
        /// The task type whose invoker rejected the arguments.
        ttype: TaskType,
        /// Why the argument list was rejected.
        #[source]
        source: ArgError,
    },

    /// The engine's scheduler has shut down and no longer accepts work.
    #[error("engine is shut down")]
    Closed,
}

impl EngineError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EngineError::AlreadyRegistered { .. } => "engine_already_registered",
            EngineError::NotRegistered { .. } => "engine_not_registered",
            EngineError::ArgMismatch { .. } => "engine_arg_mismatch",
            EngineError::Closed => "engine_closed",
        }
    }
}

/// # Reason an argument list was rejected by an invoker.
///
/// Produced by [`Invoker::bind`](crate::Invoker::bind) and surfaced
/// through [`EngineError::ArgMismatch`].
#[derive(Error, Debug)]
pub enum ArgError {
    /// The number of supplied arguments does not match the invoker's arity.
    #[error("expected {expected} argument(s), got {got}")]
    Arity { expected: usize, got: usize },

    /// An argument could not be unwrapped to the parameter type frozen at
    /// registration.
    #[error("argument {index} has the wrong type: {source}")]
    Position {
        /// Zero-based argument position.
        index: usize,
        #[source]
        source: ValueError,
    },
}

impl ArgError {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            ArgError::Arity { .. } => "arg_arity",
            ArgError::Position { .. } => "arg_position",
        }
    }
}

/// # Errors produced when unwrapping a [`Value`](crate::Value).
///
/// Raised inside registered invokers when a box's contents do not match
/// the requested type, including an opaque box whose type token differs
/// from the requested one.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The box holds a different kind of value than requested.
    #[error("type mismatch: expected {expected}, found {found}")]
    Type {
        /// The requested type (a primitive kind name or a custom type token).
        expected: &'static str,
        /// What the box actually held.
        found: String,
    },
}

impl ValueError {
    pub(crate) fn mismatch(expected: &'static str, found: impl Into<String>) -> Self {
        ValueError::Type {
            expected,
            found: found.into(),
        }
    }

    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            ValueError::Type { .. } => "value_type",
        }
    }
}
