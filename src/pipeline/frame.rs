//! Frames - batched recomposition.
//!
//! A frame drains the dirty set: every instance whose state changed since
//! the last frame recomposes once, ancestors first. Writes made during the
//! frame are picked up before it ends, so the next frame starts clean.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{error, trace};

use super::compose::compose_instance;
use super::mount::Runtime;
use crate::error::{ComposeError, Result};
use crate::types::InstanceId;

/// Where the runtime is in its update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing to do.
    Idle,
    /// A state change is waiting for the next frame.
    CompositionScheduled,
    /// A component function is running.
    Composing,
}

/// Summary of one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame counter after this frame.
    pub frame: u64,
    /// Instances recomposed from the queue, in order. Descendants
    /// recomposed as part of an ancestor are not listed.
    pub recomposed: Vec<InstanceId>,
}

impl Runtime {
    /// Drain the dirty set.
    pub fn run_frame(&self) -> Result<FrameReport> {
        let limit = self.state.borrow().config.max_recompositions_per_frame;
        let mut counts: HashMap<InstanceId, usize> = HashMap::new();
        let mut report = FrameReport::default();

        loop {
            let next = self.state.borrow_mut().next_dirty();
            let Some(id) = next else { break };

            let count = counts.entry(id).or_default();
            *count += 1;
            if *count > limit {
                let component = self.state.borrow().registry.component_name(id);
                error!(
                    instance = %id,
                    component = %component,
                    count = *count,
                    "frame did not settle"
                );
                return Err(ComposeError::CompositionCycle {
                    component,
                    count: *count,
                });
            }

            let node = compose_instance(&self.state, id)?;
            self.state.borrow_mut().splice_upwards(id, node);
            report.recomposed.push(id);
        }

        let mut state = self.state.borrow_mut();
        state.frames += 1;
        report.frame = state.frames;
        trace!(frame = report.frame, recomposed = report.recomposed.len(), "frame complete");
        Ok(report)
    }

    /// Move the virtual clock forward by `elapsed`, run every task due by
    /// then (in due order) and finish with one frame.
    pub fn advance(&self, elapsed: Duration) -> Result<FrameReport> {
        let target = self.now() + elapsed;
        loop {
            let task = self.state.borrow_mut().scheduler.pop_due(target);
            let Some(task) = task else { break };
            trace!(owner = ?task.owner, "running scheduled task");
            (task.run)();
        }
        self.state.borrow_mut().scheduler.set_now(target);
        self.run_frame()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.state.borrow().scheduler.now()
    }

    pub fn phase(&self) -> Phase {
        let state = self.state.borrow();
        if !state.composing.is_empty() {
            Phase::Composing
        } else if state.scheduler.has_dirty() {
            Phase::CompositionScheduled
        } else {
            Phase::Idle
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == Phase::Idle
    }

    /// Tasks waiting on the virtual clock.
    pub fn pending_tasks(&self) -> usize {
        self.state.borrow().scheduler.pending_tasks()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::component::Component;
    use crate::config::RuntimeConfig;
    use crate::engine::InstanceFlags;
    use crate::node::Node;
    use crate::primitives::show;
    use crate::state::{StateCell, WriteOutcome};
    use crate::types::{Props, Value};

    type CellSlot = Rc<RefCell<Option<StateCell>>>;

    fn take(slot: &CellSlot) -> StateCell {
        slot.borrow().clone().expect("cell captured during composition")
    }

    fn counter(out: CellSlot) -> Component {
        Component::new("Count", move |cx, _, _| {
            let n = cx.state(0)?;
            *out.borrow_mut() = Some(n.clone());
            Ok(Node::new("count").with_prop("n", n.get()))
        })
    }

    #[test]
    fn test_writes_coalesce_into_one_recomposition() {
        let handle = CellSlot::default();
        let runtime = Runtime::default();
        runtime.mount(&counter(handle.clone()), Props::new(), Vec::new()).unwrap();
        let n = take(&handle);
        assert!(runtime.is_idle());

        let flags = runtime.flags(n.owner()).unwrap();
        assert!(flags.contains(InstanceFlags::MOUNTED));
        assert!(!flags.contains(InstanceFlags::DIRTY));

        assert_eq!(n.set(1), WriteOutcome::Scheduled);
        assert!(runtime.flags(n.owner()).unwrap().contains(InstanceFlags::DIRTY));
        assert_eq!(n.set(2), WriteOutcome::Scheduled);
        assert_eq!(n.update(|v| Value::Int(v.as_int().unwrap_or(0) + 1)), WriteOutcome::Scheduled);
        assert_eq!(runtime.phase(), Phase::CompositionScheduled);

        let report = runtime.run_frame().unwrap();
        assert_eq!(report.recomposed, vec![n.owner()]);
        assert_eq!(runtime.compositions(n.owner()), Some(2));
        assert_eq!(runtime.tree().unwrap().prop("n"), Some(&Value::Int(3)));
        assert!(runtime.is_idle());
    }

    #[test]
    fn test_equal_write_schedules_nothing() {
        let handle = CellSlot::default();
        let runtime = Runtime::default();
        runtime.mount(&counter(handle.clone()), Props::new(), Vec::new()).unwrap();
        let n = take(&handle);

        assert_eq!(n.set(0), WriteOutcome::Unchanged);
        assert_eq!(n.try_set(0), Ok(false));
        assert!(runtime.is_idle());
        assert!(runtime.run_frame().unwrap().recomposed.is_empty());
        assert_eq!(runtime.compositions(n.owner()), Some(1));
    }

    #[test]
    fn test_frame_counter_and_empty_frames() {
        let runtime = Runtime::default();
        let fixed = Component::new("Static", |_, _, _| Ok(Node::new("static")));
        runtime.mount(&fixed, Props::new(), Vec::new()).unwrap();
        let first = runtime.run_frame().unwrap();
        let second = runtime.run_frame().unwrap();
        assert_eq!(second.frame, first.frame + 1);
        assert!(second.recomposed.is_empty());
    }

    #[test]
    fn test_parent_first_and_destroyed_child_dropped_from_queue() {
        let parent_cell = CellSlot::default();
        let child_cell = CellSlot::default();
        let child = counter(child_cell.clone());
        let out = parent_cell.clone();
        let parent = Component::new("Parent", move |cx, _, _| {
            let visible = cx.state(true)?;
            *out.borrow_mut() = Some(visible.clone());
            let condition = visible.get().as_bool().unwrap_or(false);
            let shown = show(cx, condition, &child.element(Props::new()), None)?;
            Ok(Node::new("parent").with_children(shown))
        });

        let runtime = Runtime::default();
        runtime.mount(&parent, Props::new(), Vec::new()).unwrap();
        let n = take(&child_cell);
        let visible = take(&parent_cell);

        // Child write first, then the parent removes it.
        n.set(7);
        visible.set(false);
        let report = runtime.run_frame().unwrap();

        assert_eq!(report.recomposed, vec![visible.owner()]);
        assert!(!runtime.is_alive(n.owner()));
        assert!(runtime.is_idle());
    }

    #[test]
    fn test_cross_instance_write_loop_is_a_cycle() {
        let shared = CellSlot::default();
        let child = {
            let shared = shared.clone();
            Component::new("Bumper", move |_, _, _| {
                if let Some(cell) = shared.borrow().as_ref() {
                    cell.update(|v| Value::Int(v.as_int().unwrap_or(0) + 1));
                }
                Ok(Node::new("bumper"))
            })
        };
        let parent = {
            let shared = shared.clone();
            Component::new("Parent", move |cx, _, _| {
                let n = cx.state(0)?;
                *shared.borrow_mut() = Some(n);
                Ok(Node::new("parent").with_child(cx.compose(&child, Props::new(), Vec::new())?))
            })
        };

        let runtime = Runtime::new(RuntimeConfig::default().with_max_recompositions_per_frame(5));
        assert_eq!(
            runtime.mount(&parent, Props::new(), Vec::new()),
            Err(ComposeError::CompositionCycle {
                component: "Parent".into(),
                count: 6,
            })
        );
    }

    #[test]
    fn test_advance_runs_due_tasks_then_frame() {
        let handle = CellSlot::default();
        let runtime = Runtime::default();
        runtime.mount(&counter(handle.clone()), Props::new(), Vec::new()).unwrap();
        let n = take(&handle);

        let early = n.clone();
        runtime.schedule(Duration::from_millis(10), move || {
            early.set(1);
        });
        let late = n.clone();
        runtime.schedule(Duration::from_millis(30), move || {
            late.set(2);
        });
        assert_eq!(runtime.pending_tasks(), 2);

        let report = runtime.advance(Duration::from_millis(20)).unwrap();
        assert_eq!(report.recomposed, vec![n.owner()]);
        assert_eq!(runtime.now(), Duration::from_millis(20));
        assert_eq!(runtime.tree().unwrap().prop("n"), Some(&Value::Int(1)));
        assert_eq!(runtime.pending_tasks(), 1);

        runtime.advance(Duration::from_millis(10)).unwrap();
        assert_eq!(runtime.tree().unwrap().prop("n"), Some(&Value::Int(2)));
        assert_eq!(runtime.pending_tasks(), 0);
    }

    #[test]
    fn test_cancelled_task_never_runs() {
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let runtime = Runtime::default();
        let handle = runtime.schedule(Duration::from_millis(5), move || flag.set(true));

        assert!(handle.is_pending());
        assert_eq!(handle.due(), Duration::from_millis(5));
        assert!(handle.cancel());
        assert!(!handle.cancel());

        runtime.advance(Duration::from_millis(10)).unwrap();
        assert!(!fired.get());
    }

    #[test]
    fn test_tasks_of_destroyed_instance_are_dropped() {
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let delayed = Component::new("Delayed", move |cx, _, _| {
            let flag = flag.clone();
            cx.after_mount(Duration::from_millis(10), move || flag.set(true))?;
            Ok(Node::new("delayed"))
        });

        let runtime = Runtime::default();
        runtime.mount(&delayed, Props::new(), Vec::new()).unwrap();
        assert_eq!(runtime.pending_tasks(), 1);

        runtime.unmount();
        assert_eq!(runtime.pending_tasks(), 0);
        runtime.advance(Duration::from_millis(20)).unwrap();
        assert!(!fired.get());
    }
}
