//! # Lifecycle events emitted by the scheduler.
//!
//! Three signals cover a task's observable life:
//!
//! ```text
//! addTask ──► Started ──► Finished   (worker returned; result attached)
//!                    └──► Terminated (forced after the stop timeout)
//! ```
//!
//! A cooperative stop is indistinguishable from a normal return on this
//! surface: a callable that honours its stop flag still produces
//! `Finished` (with whatever result it returned). Only the forced path
//! produces `Terminated`.
//!
//! ## Ordering guarantees
//! Each event carries a globally unique sequence number (`seq`) that
//! increases monotonically, so events can be re-ordered correctly even
//! when consumed through buffered channels.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::core::{TaskId, TaskType};
use crate::value::Value;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The task left the queue (or was admitted directly) and its worker
    /// thread is running.
    TaskStarted,
    /// The worker returned normally; the result box is attached.
    TaskFinished,
    /// The task was forcibly ended after its stop timeout elapsed.
    TaskTerminated,
}

/// A lifecycle event with its task's identity and frozen argument list.
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp (may go backwards, use for logging only).
    pub at: SystemTime,
    /// The kind of event.
    pub kind: EventKind,
    /// Identifier of the task this event belongs to.
    pub id: TaskId,
    /// Task type the record was dispatched under.
    pub ttype: TaskType,
    /// Argument boxes frozen at dispatch.
    pub args: Vec<Value>,
    /// Result box; present on [`EventKind::TaskFinished`] only.
    pub result: Option<Value>,
}

impl Event {
    fn new(kind: EventKind, id: TaskId, ttype: TaskType, args: Vec<Value>) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            id,
            ttype,
            args,
            result: None,
        }
    }

    /// A task started executing.
    pub fn started(id: TaskId, ttype: TaskType, args: Vec<Value>) -> Self {
        Self::new(EventKind::TaskStarted, id, ttype, args)
    }

    /// A task finished normally with the given result box.
    pub fn finished(id: TaskId, ttype: TaskType, args: Vec<Value>, result: Value) -> Self {
        let mut ev = Self::new(EventKind::TaskFinished, id, ttype, args);
        ev.result = Some(result);
        ev
    }

    /// A task was forcibly terminated.
    pub fn terminated(id: TaskId, ttype: TaskType, args: Vec<Value>) -> Self {
        Self::new(EventKind::TaskTerminated, id, ttype, args)
    }
}
