//! # Task registry: erased callables keyed by task type.
//!
//! The registry stores, per registered type, the erased [`Invoker`]
//! together with the exclusion group and the cooperative-stop timeout.
//! Entries are immutable once registered; `unregister` removes an entry
//! without affecting records already dispatched from it.
//!
//! The registry is shared between every [`Engine`](crate::Engine) handle
//! and read on the dispatch path, so it sits behind its own lock rather
//! than inside the scheduler actor.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::config::DEFAULT_STOP_TIMEOUT;
use crate::core::record::{TaskGroup, TaskType};
use crate::error::EngineError;
use crate::tasks::Invoker;

/// Per-type registration knobs.
///
/// Defaults: group `0`, stop timeout
/// [`DEFAULT_STOP_TIMEOUT`](crate::DEFAULT_STOP_TIMEOUT) (1000 ms).
///
/// ```
/// use std::time::Duration;
/// use tasklane::TaskOptions;
///
/// let opts = TaskOptions::new()
///     .with_group(2)
///     .with_stop_timeout(Duration::from_millis(200));
/// assert_eq!(opts.group, 2);
/// ```
#[derive(Clone, Debug)]
pub struct TaskOptions {
    /// Exclusion class; at most one task of a group runs at a time.
    pub group: TaskGroup,
    /// Grace period between a cooperative stop request and forced
    /// termination.
    pub stop_timeout: Duration,
}

impl TaskOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: TaskGroup) -> Self {
        self.group = group;
        self
    }

    pub fn with_stop_timeout(mut self, stop_timeout: Duration) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            group: 0,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }
}

/// One registered task type: the erased invoker plus its options.
#[derive(Clone)]
pub(crate) struct TaskDef {
    pub(crate) invoker: Arc<dyn Invoker>,
    pub(crate) group: TaskGroup,
    pub(crate) stop_timeout: Duration,
}

/// Registry of task descriptors, keyed by task type.
pub(crate) struct TaskRegistry {
    defs: RwLock<HashMap<TaskType, TaskDef>>,
}

impl TaskRegistry {
    pub(crate) fn new() -> Self {
        Self {
            defs: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a descriptor; fails if the type is already present.
    pub(crate) fn insert(&self, ttype: TaskType, def: TaskDef) -> Result<(), EngineError> {
        let mut defs = self.defs.write().unwrap_or_else(PoisonError::into_inner);
        if defs.contains_key(&ttype) {
            return Err(EngineError::AlreadyRegistered { ttype });
        }
        defs.insert(ttype, def);
        Ok(())
    }

    /// Removes a descriptor; returns whether one was present.
    pub(crate) fn remove(&self, ttype: TaskType) -> bool {
        self.defs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&ttype)
            .is_some()
    }

    pub(crate) fn lookup(&self, ttype: TaskType) -> Option<TaskDef> {
        self.defs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ttype)
            .cloned()
    }

    pub(crate) fn contains(&self, ttype: TaskType) -> bool {
        self.defs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&ttype)
    }

    pub(crate) fn group_of(&self, ttype: TaskType) -> Option<TaskGroup> {
        self.defs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ttype)
            .map(|def| def.group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::IntoInvoker;

    fn def(group: TaskGroup) -> TaskDef {
        TaskDef {
            invoker: (|| ()).into_invoker(),
            group,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }

    #[test]
    fn duplicate_type_is_rejected() {
        let reg = TaskRegistry::new();
        reg.insert(7, def(0)).unwrap();
        let err = reg.insert(7, def(1)).unwrap_err();
        assert!(matches!(err, EngineError::AlreadyRegistered { ttype: 7 }));
        // The original registration is untouched.
        assert_eq!(reg.group_of(7), Some(0));
    }

    #[test]
    fn unregister_returns_presence_and_restores_state() {
        let reg = TaskRegistry::new();
        assert!(!reg.remove(3));
        reg.insert(3, def(5)).unwrap();
        assert!(reg.contains(3));
        assert!(reg.remove(3));
        assert!(!reg.contains(3));
        assert_eq!(reg.group_of(3), None);
        // Re-registering after removal succeeds again.
        reg.insert(3, def(1)).unwrap();
        assert_eq!(reg.group_of(3), Some(1));
    }
}
