//! # Engine: public facade over the scheduler actor.
//!
//! [`Engine`] is a cheap, cloneable handle. Registration goes straight to
//! the shared registry; dispatch validates arguments, allocates the id,
//! and hands the record to the serialising context; control operations
//! are fire-and-forget messages; queries round-trip through the actor so
//! they observe serialised state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::config::Config;
use crate::core::record::{TaskGroup, TaskId, TaskRecord, TaskSlot, TaskType};
use crate::core::registry::{TaskDef, TaskOptions, TaskRegistry};
use crate::core::scheduler::{Command, Scheduler, Selector};
use crate::error::EngineError;
use crate::events::{Bus, Event};
use crate::observer::Observer;
use crate::tasks::{IntoArgs, IntoInvoker};

/// Handle to a task-execution engine.
///
/// Each engine owns one scheduler actor and one id sequence; multiple
/// engines are fully independent. The engine is a library surface: it has
/// no wire protocol and no on-disk state.
///
/// Dropping the last handle shuts the scheduler down; workers still
/// running at that point are abandoned.
///
/// ```no_run
/// use tasklane::{Engine, EventKind};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let engine = Engine::new();
///     let mut events = engine.subscribe();
///
///     engine.register(10, |a: i64, b: i64| a + b)?;
///     let id = engine.add_task(10, (2i64, 3i64))?;
///
///     let started = events.recv().await?;
///     assert_eq!((started.kind, started.id), (EventKind::TaskStarted, id));
///     let finished = events.recv().await?;
///     assert_eq!(finished.kind, EventKind::TaskFinished);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Engine {
    registry: Arc<TaskRegistry>,
    commands: mpsc::UnboundedSender<Command>,
    bus: Bus,
    next_id: Arc<AtomicU64>,
}

impl Engine {
    /// Creates an engine with the default [`Config`].
    ///
    /// Must be called within a tokio runtime: the scheduler actor is
    /// spawned here.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an engine with an explicit [`Config`].
    pub fn with_config(config: Config) -> Self {
        let bus = Bus::new(config.bus_capacity_clamped());
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        tokio::spawn(Scheduler::new(commands_rx, bus.clone()).run());
        Self {
            registry: Arc::new(TaskRegistry::new()),
            commands: commands_tx,
            bus,
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    // ---------------------------
    // Registration
    // ---------------------------

    /// Registers a callable under `ttype` with default options
    /// (group 0, stop timeout 1000 ms).
    ///
    /// The callable's arity and per-position coercions are frozen here; a
    /// return type that cannot be boxed is rejected at compile time.
    pub fn register<M>(
        &self,
        ttype: TaskType,
        callable: impl IntoInvoker<M>,
    ) -> Result<(), EngineError> {
        self.register_with(ttype, callable, TaskOptions::default())
    }

    /// Registers a callable with explicit [`TaskOptions`].
    pub fn register_with<M>(
        &self,
        ttype: TaskType,
        callable: impl IntoInvoker<M>,
        options: TaskOptions,
    ) -> Result<(), EngineError> {
        self.registry.insert(
            ttype,
            TaskDef {
                invoker: callable.into_invoker(),
                group: options.group,
                stop_timeout: options.stop_timeout,
            },
        )
    }

    /// Removes a registration; returns whether one was present.
    ///
    /// Records already dispatched under `ttype` are unaffected.
    pub fn unregister(&self, ttype: TaskType) -> bool {
        self.registry.remove(ttype)
    }

    pub fn is_registered(&self, ttype: TaskType) -> bool {
        self.registry.contains(ttype)
    }

    /// The exclusion group a type was registered with.
    pub fn group_of(&self, ttype: TaskType) -> Option<TaskGroup> {
        self.registry.group_of(ttype)
    }

    // ---------------------------
    // Dispatch
    // ---------------------------

    /// Dispatches one invocation of a registered callable.
    ///
    /// Arguments are validated against the invoker before a record is
    /// created; the returned id is allocated only for admitted work and
    /// is strictly increasing across calls on one engine.
    ///
    /// The task starts immediately when its group is clear, otherwise it
    /// waits in the FIFO queue.
    pub fn add_task(&self, ttype: TaskType, args: impl IntoArgs) -> Result<TaskId, EngineError> {
        let def = self
            .registry
            .lookup(ttype)
            .ok_or(EngineError::NotRegistered { ttype })?;

        let args = args.into_args();
        let bound = def
            .invoker
            .bind(args.clone())
            .map_err(|source| EngineError::ArgMismatch { ttype, source })?;

        let id = TaskId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let record = TaskRecord::new(id, ttype, def.group, def.stop_timeout, args, bound);
        self.commands
            .send(Command::Dispatch(Box::new(record)))
            .map_err(|_| EngineError::Closed)?;
        Ok(id)
    }

    // ---------------------------
    // Control
    // ---------------------------
    //
    // Control operations on an absent id/type/group are no-ops, as are
    // sends to an engine whose scheduler has shut down.

    /// Requests a cooperative stop of the active task with this id.
    pub fn stop_by_id(&self, id: TaskId) {
        let _ = self.commands.send(Command::Stop(Selector::Id(id)));
    }

    /// Requests a cooperative stop of the earliest-started active task of
    /// this type.
    pub fn stop_by_type(&self, ttype: TaskType) {
        let _ = self.commands.send(Command::Stop(Selector::Type(ttype)));
    }

    /// Requests a cooperative stop of the earliest-started active task in
    /// this group.
    pub fn stop_by_group(&self, group: TaskGroup) {
        let _ = self.commands.send(Command::Stop(Selector::Group(group)));
    }

    /// Forcibly terminates the active task with this id, without a grace
    /// period.
    ///
    /// The worker thread cannot be killed; it is abandoned with its stop
    /// flag raised and its eventual result is discarded. Callables that
    /// hold external resources are expected to cooperate instead.
    pub fn terminate_by_id(&self, id: TaskId) {
        let _ = self.commands.send(Command::Terminate(id));
    }

    /// Stops every active task and blocks admissions until the engine is
    /// idle.
    ///
    /// Each active task gets its own grace period; stragglers are
    /// terminated by their per-record deadlines. Queued tasks survive the
    /// drain and become eligible again once admissions re-open.
    pub fn stop_tasks(&self) {
        let _ = self.commands.send(Command::StopAll);
    }

    // ---------------------------
    // Queries
    // ---------------------------

    /// Whether no task is active. A shut-down engine reports idle.
    pub async fn is_idle(&self) -> bool {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.commands.send(Command::IsIdle(reply_tx)).is_err() {
            return true;
        }
        reply_rx.await.unwrap_or(true)
    }

    /// Finds a task of this type, searching active then queued.
    pub async fn task_added_by_type(&self, ttype: TaskType) -> Option<TaskSlot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .commands
            .send(Command::FindByType(ttype, reply_tx))
            .is_err()
        {
            return None;
        }
        reply_rx.await.unwrap_or(None)
    }

    /// Finds a task in this group, searching active then queued.
    pub async fn task_added_by_group(&self, group: TaskGroup) -> Option<TaskSlot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .commands
            .send(Command::FindByGroup(group, reply_tx))
            .is_err()
        {
            return None;
        }
        reply_rx.await.unwrap_or(None)
    }

    // ---------------------------
    // Events
    // ---------------------------

    /// Subscribes to the lifecycle event stream.
    ///
    /// Events published before this call are not replayed; subscribe
    /// before dispatching when the full history matters.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Spawns a listener task forwarding every event to `observer`, in
    /// publish order.
    pub fn observe<O: Observer + 'static>(&self, observer: O) {
        let mut rx = self.bus.subscribe();
        let observer = Arc::new(observer);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => observer.on_event(&event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("observer lagged, {skipped} event(s) skipped");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
