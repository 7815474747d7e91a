//! Frame queue and scheduled tasks.
//!
//! Two queues live here:
//! - the dirty set: instances waiting for recomposition, ordered by depth so
//!   ancestors recompose before their descendants;
//! - the task queue: deferred work keyed by virtual due time and insertion
//!   order, drained by [`Runtime::advance`](crate::Runtime::advance)
//!   between frames.
//!
//! Tasks owned by an instance are dropped when that instance is destroyed.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Weak;
use std::time::Duration;

use super::RuntimeState;
use crate::types::InstanceId;

/// Position of a task in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct TaskId {
    due: Duration,
    seq: u64,
}

pub(crate) struct ScheduledTask {
    pub owner: Option<InstanceId>,
    pub run: Box<dyn FnOnce()>,
}

#[derive(Default)]
pub(crate) struct Scheduler {
    dirty: BTreeSet<(usize, InstanceId)>,
    tasks: BTreeMap<TaskId, ScheduledTask>,
    now: Duration,
    next_seq: u64,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Dirty set
    // =========================================================================

    pub(crate) fn mark_dirty(&mut self, depth: usize, id: InstanceId) {
        self.dirty.insert((depth, id));
    }

    pub(crate) fn clear_dirty(&mut self, depth: usize, id: InstanceId) {
        self.dirty.remove(&(depth, id));
    }

    /// Shallowest dirty instance.
    pub(crate) fn pop_dirty(&mut self) -> Option<InstanceId> {
        self.dirty.pop_first().map(|(_, id)| id)
    }

    pub(crate) fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Drop everything queued for a destroyed instance.
    pub(crate) fn forget(&mut self, id: InstanceId) {
        self.dirty.retain(|&(_, dirty)| dirty != id);
        self.tasks.retain(|_, task| task.owner != Some(id));
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    pub(crate) fn schedule(
        &mut self,
        owner: Option<InstanceId>,
        delay: Duration,
        run: Box<dyn FnOnce()>,
    ) -> TaskId {
        let id = TaskId {
            due: self.now + delay,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.tasks.insert(id, ScheduledTask { owner, run });
        id
    }

    pub(crate) fn cancel(&mut self, id: TaskId) -> bool {
        self.tasks.remove(&id).is_some()
    }

    pub(crate) fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    /// Earliest task due at or before `until`, moving the clock to its due
    /// time.
    pub(crate) fn pop_due(&mut self, until: Duration) -> Option<ScheduledTask> {
        let (&id, _) = self.tasks.first_key_value()?;
        if id.due > until {
            return None;
        }
        self.now = self.now.max(id.due);
        self.tasks.remove(&id)
    }

    pub(crate) fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub(crate) fn now(&self) -> Duration {
        self.now
    }

    pub(crate) fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}

/// Handle to a scheduled task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    runtime: Weak<RefCell<RuntimeState>>,
    id: TaskId,
}

impl TaskHandle {
    pub(crate) fn new(runtime: Weak<RefCell<RuntimeState>>, id: TaskId) -> Self {
        Self { runtime, id }
    }

    /// Cancel the task. Returns false if it already ran or was dropped.
    pub fn cancel(&self) -> bool {
        self.runtime
            .upgrade()
            .is_some_and(|rt| rt.borrow_mut().scheduler.cancel(self.id))
    }

    /// Whether the task is still waiting to run.
    pub fn is_pending(&self) -> bool {
        self.runtime
            .upgrade()
            .is_some_and(|rt| rt.borrow().scheduler.is_pending(self.id))
    }

    /// Virtual time at which the task is due.
    pub fn due(&self) -> Duration {
        self.id.due
    }
}
