//! State cells - values owned by a single component instance.
//!
//! A cell is created by [`Scope::state`](crate::Scope::state) and lives as
//! long as the instance that created it. Handles can be cloned freely into
//! callbacks and scheduled tasks.
//!
//! # Write semantics
//!
//! - Writing a value equal to the current one does nothing.
//! - Writing a different value stores it and queues the owner for the next
//!   frame. Further writes before that frame only replace the value, so the
//!   owner recomposes once with the last one.
//! - Writing from inside the owner's own composition re-runs that
//!   composition in place (bounded by the runtime config).
//! - Writing after the owner was destroyed is absorbed and logged.

use std::cell::RefCell;
use std::rc::Weak;

use tracing::{debug, warn};

use crate::error::{ComposeError, Result};
use crate::pipeline::RuntimeState;
use crate::types::{InstanceId, Value};

/// What a write did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Value changed; the owner will recompose.
    Scheduled,
    /// Value was equal to the current one; nothing scheduled.
    Unchanged,
    /// Owner no longer exists; the write was dropped.
    Stale,
}

/// Handle to a state cell owned by one instance.
#[derive(Clone)]
pub struct StateCell {
    runtime: Weak<RefCell<RuntimeState>>,
    owner: InstanceId,
    slot: usize,
}

impl std::fmt::Debug for StateCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCell")
            .field("owner", &self.owner)
            .field("slot", &self.slot)
            .finish()
    }
}

impl StateCell {
    pub(crate) fn new(
        runtime: Weak<RefCell<RuntimeState>>,
        owner: InstanceId,
        slot: usize,
    ) -> Self {
        Self {
            runtime,
            owner,
            slot,
        }
    }

    /// Instance that owns this cell.
    pub fn owner(&self) -> InstanceId {
        self.owner
    }

    /// Current value, or `Value::Null` once the owner is gone.
    pub fn get(&self) -> Value {
        self.try_get().unwrap_or_default()
    }

    /// Current value, failing with `StaleInstance` once the owner is gone.
    pub fn try_get(&self) -> Result<Value> {
        let stale = ComposeError::StaleInstance { owner: self.owner };
        let runtime = self.runtime.upgrade().ok_or_else(|| stale.clone())?;
        let state = runtime.borrow();
        state.read_cell(self.owner, self.slot).ok_or(stale)
    }

    /// Write a new value.
    ///
    /// Stale writes are absorbed; see [`StateCell::try_set`] to observe them.
    pub fn set(&self, value: impl Into<Value>) -> WriteOutcome {
        let Some(runtime) = self.runtime.upgrade() else {
            debug!(owner = %self.owner, "write after runtime dropped");
            return WriteOutcome::Stale;
        };
        let mut state = runtime.borrow_mut();
        let outcome = state.write_cell(self.owner, self.slot, value.into());
        if outcome == WriteOutcome::Stale {
            if state.config.log_stale_writes {
                warn!(owner = %self.owner, "write to state of destroyed instance ignored");
            } else {
                debug!(owner = %self.owner, "write to state of destroyed instance ignored");
            }
        }
        outcome
    }

    /// Write a new value; returns whether the owner was scheduled.
    pub fn try_set(&self, value: impl Into<Value>) -> Result<bool> {
        match self.set(value) {
            WriteOutcome::Scheduled => Ok(true),
            WriteOutcome::Unchanged => Ok(false),
            WriteOutcome::Stale => Err(ComposeError::StaleInstance { owner: self.owner }),
        }
    }

    /// Write `f(current)`.
    pub fn update(&self, f: impl FnOnce(&Value) -> Value) -> WriteOutcome {
        let current = match self.try_get() {
            Ok(value) => value,
            Err(_) => return self.set(Value::Null),
        };
        self.set(f(&current))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::component::Component;
    use crate::node::Node;
    use crate::pipeline::Runtime;
    use crate::types::Props;

    fn mounted(runtime: &Runtime) -> StateCell {
        let handle: Rc<RefCell<Option<StateCell>>> = Rc::default();
        let out = handle.clone();
        let comp = Component::new("Holder", move |cx, _, _| {
            *out.borrow_mut() = Some(cx.state("a")?);
            Ok(Node::new("holder"))
        });
        runtime.mount(&comp, Props::new(), Vec::new()).unwrap();
        let cell = handle.borrow().clone().unwrap();
        cell
    }

    #[test]
    fn test_get_set_update() {
        let runtime = Runtime::default();
        let cell = mounted(&runtime);
        assert_eq!(cell.get(), Value::from("a"));
        assert_eq!(cell.set("b"), WriteOutcome::Scheduled);
        assert_eq!(cell.try_get(), Ok(Value::from("b")));
        assert_eq!(
            cell.update(|v| Value::from(format!("{}!", v.as_str().unwrap_or_default()))),
            WriteOutcome::Scheduled
        );
        assert_eq!(cell.get(), Value::from("b!"));
    }

    #[test]
    fn test_handles_outliving_the_runtime_are_stale() {
        let cell = {
            let runtime = Runtime::default();
            mounted(&runtime)
        };
        assert_eq!(cell.set("c"), WriteOutcome::Stale);
        assert_eq!(cell.update(|_| Value::Null), WriteOutcome::Stale);
        assert_eq!(cell.try_get(), Err(ComposeError::StaleInstance { owner: cell.owner() }));
        assert_eq!(cell.get(), Value::Null);
    }

    #[test]
    fn test_quiet_stale_writes_still_report_stale() {
        let runtime = Runtime::new(crate::RuntimeConfig::default().with_log_stale_writes(false));
        let cell = mounted(&runtime);
        runtime.unmount();
        assert_eq!(cell.try_set(1), Err(ComposeError::StaleInstance { owner: cell.owner() }));
    }

    #[test]
    fn test_debug_shows_owner_and_slot() {
        let runtime = Runtime::default();
        let cell = mounted(&runtime);
        let rendered = format!("{cell:?}");
        assert!(rendered.starts_with("StateCell"));
        assert!(rendered.contains("slot: 0"));
    }
}
