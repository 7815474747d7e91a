//! Pipeline - composition, frames and the task queue.
//!
//! ```text
//! Runtime::mount ─▶ compose root ─▶ Scope::compose (children, recursively) ─▶ Node tree
//!
//! StateCell::set ─▶ owner marked DIRTY ─▶ Runtime::run_frame
//!                      ▲                    └─▶ recompose shallowest first ─▶ splice upward
//!                      │
//! Runtime::advance ─▶ due scheduled tasks
//! ```
//!
//! Everything runs on one thread. Component functions never run while the
//! runtime state is borrowed, so they are free to read and write cells,
//! schedule tasks and compose children.

mod compose;
mod frame;
mod mount;
mod scheduler;

pub use compose::Scope;
pub use frame::{FrameReport, Phase};
pub use mount::{compose, Runtime};
pub use scheduler::TaskHandle;

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::config::RuntimeConfig;
use crate::engine::{Hook, InstanceFlags, Registry};
use crate::node::Node;
use crate::state::WriteOutcome;
use crate::types::{InstanceId, Value};
use scheduler::Scheduler;

pub(crate) type Shared = Rc<RefCell<RuntimeState>>;

/// State shared between the runtime handle, scopes, cells and tasks.
pub(crate) struct RuntimeState {
    pub config: RuntimeConfig,
    pub registry: Registry,
    pub scheduler: Scheduler,
    pub root: Option<InstanceId>,
    /// Instances whose component function is running, innermost last.
    pub composing: Vec<InstanceId>,
    pub frames: u64,
}

/// Destroy callbacks collected while the state was borrowed.
pub(crate) type Deferred = Vec<Box<dyn FnOnce()>>;

pub(crate) fn run_deferred(callbacks: Deferred) {
    for callback in callbacks {
        callback();
    }
}

impl RuntimeState {
    pub(crate) fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            registry: Registry::new(),
            scheduler: Scheduler::new(),
            root: None,
            composing: Vec::new(),
            frames: 0,
        }
    }

    // =========================================================================
    // Cells
    // =========================================================================

    pub(crate) fn read_cell(&self, owner: InstanceId, slot: usize) -> Option<Value> {
        match self.registry.get(owner)?.hooks.get(slot)? {
            Hook::State(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub(crate) fn write_cell(
        &mut self,
        owner: InstanceId,
        slot: usize,
        value: Value,
    ) -> WriteOutcome {
        let composing = self.composing.last().copied();
        let Some(instance) = self.registry.get_mut(owner) else {
            return WriteOutcome::Stale;
        };
        let Some(Hook::State(current)) = instance.hooks.get_mut(slot) else {
            return WriteOutcome::Stale;
        };
        if *current == value {
            return WriteOutcome::Unchanged;
        }
        *current = value;

        if composing == Some(owner) {
            instance.flags.insert(InstanceFlags::SELF_WRITE);
        } else if !instance.flags.contains(InstanceFlags::DIRTY) {
            instance.flags.insert(InstanceFlags::DIRTY);
            self.scheduler.mark_dirty(instance.depth, owner);
            trace!(instance = %owner, "recomposition scheduled");
        }
        WriteOutcome::Scheduled
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Release `id` with its subtree, dropping their queued recompositions
    /// and scheduled tasks.
    pub(crate) fn release(&mut self, id: InstanceId) -> Deferred {
        let released = self.registry.release(id);
        for &gone in &released.ids {
            self.scheduler.forget(gone);
        }
        if self.root == Some(id) {
            self.root = None;
        }
        released.callbacks
    }

    /// Pop the next instance that still needs recomposition.
    pub(crate) fn next_dirty(&mut self) -> Option<InstanceId> {
        while let Some(id) = self.scheduler.pop_dirty() {
            let pending = self
                .registry
                .get(id)
                .is_some_and(|i| i.flags.contains(InstanceFlags::DIRTY));
            if pending {
                return Some(id);
            }
        }
        None
    }

    /// Replace the output of `id` inside every ancestor's last tree.
    ///
    /// An ancestor that did not embed its child's output unchanged is
    /// queued for recomposition instead.
    pub(crate) fn splice_upwards(&mut self, id: InstanceId, node: Node) {
        let mut child = id;
        let mut child_tree = node;
        while let Some(parent) = self.registry.get(child).and_then(|i| i.parent) {
            let Some(instance) = self.registry.get_mut(parent) else {
                break;
            };
            let spliced = instance
                .last_tree
                .as_mut()
                .is_some_and(|tree| tree.splice(child, &child_tree));
            if !spliced {
                if !instance.flags.contains(InstanceFlags::DIRTY) {
                    instance.flags.insert(InstanceFlags::DIRTY);
                    self.scheduler.mark_dirty(instance.depth, parent);
                    trace!(
                        instance = %parent,
                        child = %child,
                        "output not embedded, recomposing parent"
                    );
                }
                break;
            }
            let Some(tree) = instance.last_tree.clone() else {
                break;
            };
            child_tree = tree;
            child = parent;
        }
    }
}
