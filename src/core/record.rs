//! # Per-invocation task records and their identity types.
//!
//! A [`TaskRecord`] is created by dispatch in state `Inactive`, moves to
//! `Active` when its worker thread starts, and settles as `Finished`
//! (worker returned) or `Terminated` (forced). Settled records are
//! dropped as soon as their lifecycle event has been published.
//!
//! The record is shared between the worker and the scheduler only through
//! its [`StopFlag`]; everything else is owned and mutated exclusively by
//! the scheduler's serialising context.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::tasks::BoundCall;
use crate::value::Value;

/// Caller-chosen integer key under which a callable is registered.
pub type TaskType = i32;

/// Caller-chosen integer exclusion class; at most one active task per group.
pub type TaskGroup = i32;

/// Identifier of a dispatched task, unique and strictly increasing over
/// the lifetime of one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl TaskId {
    /// Get the inner value.
    #[inline]
    pub fn inner(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Created by dispatch, not yet admitted.
    Inactive,
    /// Worker thread running.
    Active,
    /// Worker returned normally.
    Finished,
    /// Forcibly ended after the stop timeout.
    Terminated,
}

/// Which scheduler list a task was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSlot {
    /// Currently running.
    Active,
    /// Awaiting admission.
    Queued,
}

/// Cooperative-stop signal shared between the scheduler and one worker.
///
/// The scheduler sets the flag; the registered callable polls it (via
/// [`current_stop_flag`](crate::current_stop_flag)) and is expected to
/// return on its own. Returning early still counts as a normal finish.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Raises the flag. Idempotent.
    pub(crate) fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Whether two handles refer to the same underlying flag.
    #[inline]
    pub fn ptr_eq(&self, other: &StopFlag) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Opaque handle identifying a spawned worker thread.
pub(crate) struct WorkerHandle {
    thread: std::thread::Thread,
}

impl WorkerHandle {
    pub(crate) fn new(thread: std::thread::Thread) -> Self {
        Self { thread }
    }

    pub(crate) fn thread_id(&self) -> std::thread::ThreadId {
        self.thread.id()
    }
}

/// One dispatched invocation.
pub(crate) struct TaskRecord {
    pub(crate) id: TaskId,
    pub(crate) ttype: TaskType,
    pub(crate) group: TaskGroup,
    /// Grace period copied from the descriptor at dispatch, so a later
    /// `unregister` cannot orphan the deadline lookup.
    pub(crate) stop_timeout: Duration,
    /// Argument boxes frozen at dispatch, for event reporting.
    pub(crate) args: Vec<Value>,
    /// The invoker partially applied to `args`. Taken when the worker
    /// starts; `None` afterwards.
    pub(crate) bound: Option<BoundCall>,
    pub(crate) stop_flag: StopFlag,
    /// Present while a worker runs this record.
    pub(crate) worker: Option<WorkerHandle>,
    pub(crate) state: TaskState,
}

impl TaskRecord {
    pub(crate) fn new(
        id: TaskId,
        ttype: TaskType,
        group: TaskGroup,
        stop_timeout: Duration,
        args: Vec<Value>,
        bound: BoundCall,
    ) -> Self {
        Self {
            id,
            ttype,
            group,
            stop_timeout,
            args,
            bound: Some(bound),
            stop_flag: StopFlag::new(),
            worker: None,
            state: TaskState::Inactive,
        }
    }
}

impl fmt::Debug for TaskRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRecord")
            .field("id", &self.id)
            .field("ttype", &self.ttype)
            .field("group", &self.group)
            .field("state", &self.state)
            .field("stop_requested", &self.stop_flag.is_set())
            .field("worker", &self.worker.as_ref().map(|w| w.thread_id()))
            .finish()
    }
}
