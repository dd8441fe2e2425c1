//! # Scheduler actor: the serialising context.
//!
//! All scheduler state lives inside one tokio task that processes
//! [`Command`]s from the engine handles, [`Completion`]s from worker
//! threads, and expired [`Deadline`]s from its own timer queue. Nothing
//! else mutates the active/queued lists or publishes events, which is
//! what makes the ordering guarantees single-writer cheap.
//!
//! ## Wiring
//! ```text
//! Engine handles ──Command──►┐
//! Worker threads ─Completion─►├─► Scheduler::run() ──► Bus (events)
//! DelayQueue ────Deadline────►┘         │
//!                                       ├─ active:  Vec<TaskRecord>   (one per group)
//!                                       ├─ queued:  VecDeque<TaskRecord> (FIFO)
//!                                       ├─ block_start: bool          (engine-wide drain)
//!                                       └─ deadlines: DelayQueue<Deadline>
//! ```
//!
//! ## Admission
//! A dispatched record starts immediately iff no active record shares its
//! group and no engine-wide drain is in progress; otherwise it queues.
//! Whenever a record leaves the active list, the queue is walked once
//! front-to-back and every record whose group is clear starts, preserving
//! the relative order of the rest.
//!
//! ## Two-phase stop
//! `Stop` raises the record's flag and arms a deadline at the record's
//! stop timeout. A deadline that finds the record still active forces
//! termination; one that finds it gone is a no-op (the task settled on
//! its own). Repeated stops arm further deadlines; only the first to fire
//! against a still-active record has any effect.

use std::collections::VecDeque;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::{mpsc, oneshot};
use tokio_util::time::DelayQueue;

use crate::core::record::{TaskGroup, TaskId, TaskRecord, TaskSlot, TaskState, TaskType};
use crate::core::runner::{spawn_worker, Completion};
use crate::events::{Bus, Event};

/// Picks the first active record matching one key.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Selector {
    Id(TaskId),
    Type(TaskType),
    Group(TaskGroup),
}

/// Messages from the engine handles to the serialising context.
pub(crate) enum Command {
    /// A freshly built record; admit or queue it.
    Dispatch(Box<TaskRecord>),
    /// Cooperative stop of the first active match.
    Stop(Selector),
    /// Forced termination of an active record by id.
    Terminate(TaskId),
    /// Engine-wide drain: stop everything, block admissions until idle.
    StopAll,
    /// `active` is empty?
    IsIdle(oneshot::Sender<bool>),
    /// Search active, then queued, for a task type.
    FindByType(TaskType, oneshot::Sender<Option<TaskSlot>>),
    /// Search active, then queued, for a group.
    FindByGroup(TaskGroup, oneshot::Sender<Option<TaskSlot>>),
}

/// Timed events owned by the serialising context.
enum Deadline {
    /// A record's cooperative-stop grace period elapsed.
    Stop(TaskId),
    /// Engine-wide drain re-check; carries its re-arm interval.
    Drain(Duration),
}

pub(crate) struct Scheduler {
    commands: mpsc::UnboundedReceiver<Command>,
    completions: mpsc::UnboundedReceiver<Completion>,
    /// Cloned into every spawned worker.
    completions_tx: mpsc::UnboundedSender<Completion>,
    bus: Bus,
    /// Running records, in start order. No two share a group.
    active: Vec<TaskRecord>,
    /// Records awaiting admission, FIFO. Duplicate groups permitted.
    queued: VecDeque<TaskRecord>,
    /// True while an engine-wide drain is in progress; no record starts.
    block_start: bool,
    deadlines: DelayQueue<Deadline>,
}

impl Scheduler {
    pub(crate) fn new(commands: mpsc::UnboundedReceiver<Command>, bus: Bus) -> Self {
        let (completions_tx, completions) = mpsc::unbounded_channel();
        Self {
            commands,
            completions,
            completions_tx,
            bus,
            active: Vec::new(),
            queued: VecDeque::new(),
            block_start: false,
            deadlines: DelayQueue::new(),
        }
    }

    /// Runs until every engine handle is dropped.
    ///
    /// In-flight workers are abandoned at that point; their completions
    /// have nowhere to report to.
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => self.on_command(cmd),
                    None => break,
                },
                Some(done) = self.completions.recv() => self.on_completion(done),
                Some(expired) = self.deadlines.next(), if !self.deadlines.is_empty() => {
                    self.on_deadline(expired.into_inner());
                }
            }
        }
        log::debug!("scheduler shut down ({} task(s) abandoned)", self.active.len());
    }

    fn on_command(&mut self, cmd: Command) {
        match cmd {
            Command::Dispatch(record) => self.on_dispatch(*record),
            Command::Stop(selector) => self.on_stop(selector),
            Command::Terminate(id) => self.on_terminate(id),
            Command::StopAll => self.on_stop_all(),
            Command::IsIdle(reply) => {
                let _ = reply.send(self.active.is_empty());
            }
            Command::FindByType(ttype, reply) => {
                let _ = reply.send(self.slot_of(|rec| rec.ttype == ttype));
            }
            Command::FindByGroup(group, reply) => {
                let _ = reply.send(self.slot_of(|rec| rec.group == group));
            }
        }
    }

    // ---------------------------
    // Admission
    // ---------------------------

    fn on_dispatch(&mut self, record: TaskRecord) {
        if self.group_is_clear(record.group) && !self.block_start {
            self.start(record);
        } else {
            log::debug!(
                "task {}: queued behind group {} ({} waiting)",
                record.id,
                record.group,
                self.queued.len()
            );
            self.queued.push_back(record);
        }
    }

    fn group_is_clear(&self, group: TaskGroup) -> bool {
        self.active.iter().all(|rec| rec.group != group)
    }

    fn start(&mut self, mut record: TaskRecord) {
        record.state = TaskState::Active;
        if let Some(bound) = record.bound.take() {
            record.worker = spawn_worker(
                record.id,
                bound,
                record.stop_flag.clone(),
                self.completions_tx.clone(),
            );
        } else {
            log::warn!("task {}: started twice, no bound call left", record.id);
        }
        log::debug!("task {}: started (type {}, group {})", record.id, record.ttype, record.group);
        let started = Event::started(record.id, record.ttype, record.args.clone());
        self.active.push(record);
        self.bus.publish(started);
    }

    /// Single front-to-back pass: start every queued record whose group is
    /// clear, keep the rest in order.
    fn drain_queue(&mut self) {
        if self.block_start {
            return;
        }
        let mut index = 0;
        while index < self.queued.len() {
            let group = self.queued[index].group;
            if self.group_is_clear(group) {
                if let Some(record) = self.queued.remove(index) {
                    self.start(record);
                }
            } else {
                index += 1;
            }
        }
    }

    // ---------------------------
    // Completion
    // ---------------------------

    fn on_completion(&mut self, done: Completion) {
        let Some(pos) = self.position_by_id(done.id) else {
            // The record was terminated; the worker's late result is dropped.
            log::debug!("task {}: completion ignored, record already settled", done.id);
            return;
        };
        let mut record = self.active.remove(pos);
        record.state = TaskState::Finished;
        log::debug!("task {}: finished", record.id);
        self.bus
            .publish(Event::finished(record.id, record.ttype, record.args, done.result));
        self.drain_queue();
    }

    // ---------------------------
    // Stop / terminate
    // ---------------------------

    fn on_stop(&mut self, selector: Selector) {
        let pos = match selector {
            Selector::Id(id) => self.position_by_id(id),
            Selector::Type(ttype) => self.active.iter().position(|rec| rec.ttype == ttype),
            Selector::Group(group) => self.active.iter().position(|rec| rec.group == group),
        };
        match pos {
            Some(pos) => self.stop_at(pos),
            None => log::debug!("stop {selector:?}: no active match, nothing to do"),
        }
    }

    fn stop_at(&mut self, pos: usize) {
        let (id, timeout) = {
            let record = &self.active[pos];
            record.stop_flag.set();
            (record.id, record.stop_timeout)
        };
        log::debug!("task {id}: cooperative stop requested, grace {timeout:?}");
        self.deadlines.insert(Deadline::Stop(id), timeout);
    }

    fn on_terminate(&mut self, id: TaskId) {
        match self.position_by_id(id) {
            Some(pos) => self.terminate_at(pos),
            None => log::debug!("terminate {id}: no active match, nothing to do"),
        }
    }

    fn terminate_at(&mut self, pos: usize) {
        let mut record = self.active.remove(pos);
        // The flag stays raised so a callable that eventually polls it can
        // still wind down; its result will be discarded.
        record.stop_flag.set();
        record.state = TaskState::Terminated;
        log::warn!(
            "task {}: terminated, worker thread {:?} abandoned",
            record.id,
            record.worker.as_ref().map(|w| w.thread_id())
        );
        self.bus
            .publish(Event::terminated(record.id, record.ttype, record.args));
        self.drain_queue();
    }

    fn on_stop_all(&mut self) {
        if self.active.is_empty() {
            log::debug!("stop_tasks: engine already idle");
            return;
        }
        self.block_start = true;
        let max_timeout = self
            .active
            .iter()
            .map(|rec| rec.stop_timeout)
            .max()
            .unwrap_or_default();
        for pos in 0..self.active.len() {
            self.stop_at(pos);
        }
        log::debug!(
            "stop_tasks: {} task(s) stopping, admissions blocked for up to {max_timeout:?}",
            self.active.len()
        );
        self.deadlines.insert(Deadline::Drain(max_timeout), max_timeout);
    }

    fn on_deadline(&mut self, deadline: Deadline) {
        match deadline {
            Deadline::Stop(id) => match self.position_by_id(id) {
                Some(pos) => {
                    log::warn!("task {id}: did not stop within its grace period, terminating");
                    self.terminate_at(pos);
                }
                None => log::debug!("task {id}: stop deadline passed, task already settled"),
            },
            Deadline::Drain(interval) => {
                if self.active.is_empty() {
                    self.block_start = false;
                    log::debug!("stop_tasks: drained, admissions re-enabled");
                    self.drain_queue();
                } else {
                    self.deadlines.insert(Deadline::Drain(interval), interval);
                }
            }
        }
    }

    // ---------------------------
    // Lookups
    // ---------------------------

    fn position_by_id(&self, id: TaskId) -> Option<usize> {
        self.active.iter().position(|rec| rec.id == id)
    }

    fn slot_of(&self, matches: impl Fn(&TaskRecord) -> bool) -> Option<TaskSlot> {
        if self.active.iter().any(&matches) {
            Some(TaskSlot::Active)
        } else if self.queued.iter().any(&matches) {
            Some(TaskSlot::Queued)
        } else {
            None
        }
    }
}
