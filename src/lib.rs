//! # tasklane
//!
//! **Tasklane** is a small in-process task-execution engine. Callables are
//! registered under integer task types, each dispatched invocation runs on
//! its own OS thread, and an exclusion group admits at most one active
//! task at a time (the rest queue FIFO). Stopping is two-phase:
//! cooperative first, forced after a per-type timeout.
//!
//! ## Features
//!
//! | Area             | Description                                                      | Key types / traits                   |
//! |------------------|------------------------------------------------------------------|--------------------------------------|
//! | **Registration** | Register plain closures under integer types, with group/timeout. | [`Engine::register`], [`TaskOptions`]|
//! | **Dispatch**     | Invoke with runtime arguments; group-exclusion admission.        | [`Engine::add_task`], [`IntoArgs`]   |
//! | **Value boxes**  | Dynamic argument/result containers, opaque user types included.  | [`Value`], [`CustomValue`]           |
//! | **Stopping**     | Cooperative flag, forced termination fallback, engine-wide drain.| [`Engine::stop_by_id`], [`StopFlag`] |
//! | **Events**       | Started/finished/terminated stream from one serialising context. | [`Event`], [`Observer`]              |
//! | **Errors**       | Typed errors for registration, dispatch, and unwrapping.         | [`EngineError`], [`ValueError`]      |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogObserver`] _(demo/reference only)_.
//!
//! ```no_run
//! use std::time::Duration;
//! use tasklane::{current_stop_flag, Engine, EventKind, TaskOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = Engine::new();
//!     let mut events = engine.subscribe();
//!
//!     // A cooperative callable: polls its stop flag between work chunks.
//!     engine.register_with(
//!         20,
//!         || {
//!             let stop = current_stop_flag();
//!             while !stop.as_ref().is_some_and(|f| f.is_set()) {
//!                 std::thread::sleep(Duration::from_millis(10));
//!             }
//!             0i64
//!         },
//!         TaskOptions::new().with_stop_timeout(Duration::from_millis(500)),
//!     )?;
//!
//!     let id = engine.add_task(20, ())?;
//!     engine.stop_by_id(id);
//!
//!     loop {
//!         let ev = events.recv().await?;
//!         if ev.kind == EventKind::TaskFinished && ev.id == id {
//!             break; // stopped cooperatively, normal finish
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod observer;
mod tasks;
mod value;

// ---- Public re-exports ----

pub use crate::config::{Config, DEFAULT_STOP_TIMEOUT};
pub use crate::core::{
    current_stop_flag, Engine, StopFlag, TaskGroup, TaskId, TaskOptions, TaskSlot, TaskState,
    TaskType,
};
pub use crate::error::{ArgError, EngineError, ValueError};
pub use crate::events::{Event, EventKind};
pub use crate::observer::Observer;
pub use crate::tasks::{BoundCall, IntoArgs, IntoInvoker, Invoker};
pub use crate::value::{CustomBox, CustomValue, FromValue, IntoValue, Value};

// Optional: expose a simple built-in log observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use crate::observer::LogObserver;
