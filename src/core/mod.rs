//! Engine core: scheduling, lifecycle, and worker plumbing.
//!
//! The public API re-exported from here is [`Engine`] plus the identity
//! and option types that appear in its signatures. Everything else is an
//! internal building block the engine wires together.
//!
//! ## Files & responsibilities
//! - **engine.rs**: public facade; validates dispatches, allocates ids,
//!   forwards commands, exposes queries and the event stream.
//! - **scheduler.rs**: the serialising context; owns active/queued lists,
//!   group-exclusion admission, the drain walk, stop deadlines, and all
//!   event publishing.
//! - **registry.rs**: task-type descriptors (erased invoker + group +
//!   stop timeout) behind a shared lock.
//! - **record.rs**: per-invocation record, id/state/slot types, stop flag.
//! - **runner.rs**: detached worker threads, panic boundary, thread-local
//!   stop-flag slot.
//!
//! ## Data flow
//! ```text
//! register(ttype, f) ──► TaskRegistry
//!
//! add_task(ttype, args)
//!   ├─ lookup + bind (ArgMismatch detected here)
//!   └─► Command::Dispatch ──► Scheduler
//!           ├─ group clear: spawn worker ──► Started
//!           └─ else: queued (FIFO)
//!
//! worker returns ──► Completion ──► Scheduler
//!           ├─► Finished(result) ──► drain queue
//!           └─ (record gone: discarded)
//!
//! stop_by_*() ──► flag raised + deadline armed
//!           ├─ callable returns in time ──► Finished
//!           └─ deadline fires, still active ──► Terminated ──► drain
//! ```

mod engine;
mod record;
mod registry;
mod runner;
mod scheduler;

pub use engine::Engine;
pub use record::{StopFlag, TaskGroup, TaskId, TaskSlot, TaskState, TaskType};
pub use registry::TaskOptions;
pub use runner::current_stop_flag;
