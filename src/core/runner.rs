//! # Worker runner: one detached OS thread per task.
//!
//! [`spawn_worker`] starts a fresh thread that evaluates a record's bound
//! call and posts the result box back to the scheduler. The engine never
//! joins workers; completion is reported exclusively through the
//! completion channel, so the serialising context never blocks on a
//! worker.
//!
//! The worker installs the record's [`StopFlag`] in a thread-local slot
//! before invoking the callable and clears it on the way out.
//! [`current_stop_flag`] reads that slot, which is how a callable
//! cooperates without being handed its record.
//!
//! A callable that panics is caught at this boundary and reported as a
//! normal finish with an empty result; scheduler state advances as usual.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use tokio::sync::mpsc;

use crate::core::record::{StopFlag, TaskId, WorkerHandle};
use crate::tasks::BoundCall;
use crate::value::Value;

/// Posted by a worker when its bound call returns.
pub(crate) struct Completion {
    pub(crate) id: TaskId,
    pub(crate) result: Value,
}

thread_local! {
    static STOP_SLOT: RefCell<Option<StopFlag>> = const { RefCell::new(None) };
}

/// Returns the stop flag of the task executing on the calling thread, or
/// `None` when the caller is not inside a worker.
///
/// A registered callable may poll this and return early once the flag is
/// set; the engine treats such a return as a normal finish (`Finished`,
/// not `Terminated`).
///
/// ```
/// use tasklane::current_stop_flag;
///
/// fn crunch() -> i64 {
///     let stop = current_stop_flag();
///     let mut acc = 0;
///     for chunk in 0..1_000 {
///         if stop.as_ref().is_some_and(|f| f.is_set()) {
///             break;
///         }
///         acc += chunk;
///     }
///     acc
/// }
/// # let _ = crunch();
/// ```
pub fn current_stop_flag() -> Option<StopFlag> {
    STOP_SLOT.with(|slot| slot.borrow().clone())
}

/// Spawns the detached worker thread for one record.
///
/// The thread sends exactly one [`Completion`] for the record, whatever
/// the callable does. If the OS refuses to spawn a thread, the completion
/// is synthesized immediately with an empty result so the scheduler still
/// advances.
pub(crate) fn spawn_worker(
    id: TaskId,
    bound: BoundCall,
    stop_flag: StopFlag,
    completions: mpsc::UnboundedSender<Completion>,
) -> Option<WorkerHandle> {
    let worker_completions = completions.clone();
    let spawned = thread::Builder::new()
        .name(format!("tasklane-worker-{id}"))
        .spawn(move || {
            STOP_SLOT.with(|slot| *slot.borrow_mut() = Some(stop_flag));
            let result = match panic::catch_unwind(AssertUnwindSafe(bound)) {
                Ok(value) => value,
                Err(_) => {
                    log::warn!("task {id}: callable panicked, reporting an empty result");
                    Value::Empty
                }
            };
            STOP_SLOT.with(|slot| *slot.borrow_mut() = None);
            let _ = worker_completions.send(Completion { id, result });
        });

    match spawned {
        Ok(join) => {
            let handle = WorkerHandle::new(join.thread().clone());
            drop(join); // detached; the engine never joins workers
            Some(handle)
        }
        Err(err) => {
            log::error!("task {id}: failed to spawn worker thread: {err}");
            let _ = completions.send(Completion {
                id,
                result: Value::Empty,
            });
            None
        }
    }
}
