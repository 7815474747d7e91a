//! Mount API - the runtime handle and its lifecycle.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use spark_compose::{Component, Node, Props, Runtime, RuntimeConfig};
//!
//! let clock = Component::new("Clock", |cx, _, _| {
//!     let ticks = cx.state(0)?;
//!     let handle = ticks.clone();
//!     cx.after_mount(Duration::from_secs(1), move || {
//!         handle.update(|v| (v.as_int().unwrap_or(0) + 1).into());
//!     })?;
//!     Ok(Node::new("clock").with_prop("ticks", ticks.get()))
//! });
//!
//! let runtime = Runtime::new(RuntimeConfig::default());
//! runtime.mount(&clock, Props::new(), Vec::new()).unwrap();
//!
//! // Advance the virtual clock; due tasks run, then one frame recomposes.
//! let report = runtime.advance(Duration::from_secs(1)).unwrap();
//! assert_eq!(report.recomposed.len(), 1);
//! let ticks = runtime.tree().unwrap().prop("ticks").and_then(|v| v.as_int());
//! assert_eq!(ticks, Some(1));
//!
//! runtime.unmount();
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use super::compose::compose_instance;
use super::scheduler::TaskHandle;
use super::{run_deferred, RuntimeState, Shared};
use crate::component::Component;
use crate::config::RuntimeConfig;
use crate::engine::InstanceFlags;
use crate::error::{ComposeError, Result};
use crate::node::{Element, Node};
use crate::state::ContextEnv;
use crate::types::{InstanceId, Key, Props};

/// Owns a component tree and drives its frames.
///
/// Single-threaded: the runtime, its cells and its tasks all live on the
/// thread that created them.
pub struct Runtime {
    pub(super) state: Shared,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(RuntimeState::new(config))),
        }
    }

    pub fn config(&self) -> RuntimeConfig {
        self.state.borrow().config.clone()
    }

    // =========================================================================
    // Mount / Unmount
    // =========================================================================

    /// Mount `component` as the root, replacing any previous root.
    ///
    /// Composes the tree, settles any writes made while composing and
    /// returns the resulting tree.
    pub fn mount(
        &self,
        component: &Component,
        props: Props,
        children: Vec<Element>,
    ) -> Result<Node> {
        self.unmount();

        let strict = self.state.borrow().config.strict_props;
        component.validate(&props, strict)?;

        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.registry.allocate(
                None,
                Key::Index(0),
                component.clone(),
                props,
                children,
                ContextEnv::default(),
            );
            state.root = Some(id);
            id
        };
        debug!(instance = %id, component = component.name(), "mounting root");

        compose_instance(&self.state, id)?;
        self.run_frame()?;
        self.tree()
    }

    pub fn mount_element(&self, element: &Element) -> Result<Node> {
        self.mount(&element.component, element.props.clone(), element.children.clone())
    }

    /// Destroy the whole tree. Returns false if nothing was mounted.
    pub fn unmount(&self) -> bool {
        let root = self.state.borrow().root;
        let Some(root) = root else {
            return false;
        };
        let deferred = self.state.borrow_mut().release(root);
        run_deferred(deferred);
        debug!(instance = %root, "unmounted root");
        true
    }

    /// Schedule a task that belongs to no instance, e.g. a simulated
    /// external event.
    pub fn schedule(&self, delay: Duration, task: impl FnOnce() + 'static) -> TaskHandle {
        let id = self
            .state
            .borrow_mut()
            .scheduler
            .schedule(None, delay, Box::new(task));
        TaskHandle::new(Rc::downgrade(&self.state), id)
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Current tree of the mounted root.
    pub fn tree(&self) -> Result<Node> {
        let state = self.state.borrow();
        state
            .root
            .and_then(|root| state.registry.get(root))
            .and_then(|instance| instance.last_tree.clone())
            .ok_or(ComposeError::NotMounted)
    }

    pub fn root(&self) -> Option<InstanceId> {
        self.state.borrow().root
    }

    pub fn instance_count(&self) -> usize {
        self.state.borrow().registry.len()
    }

    pub fn is_alive(&self, id: InstanceId) -> bool {
        self.state.borrow().registry.is_allocated(id)
    }

    /// How many times `id` has completed a composition.
    pub fn compositions(&self, id: InstanceId) -> Option<u64> {
        self.state.borrow().registry.get(id).map(|i| i.compositions)
    }

    /// Lifecycle flags of `id`.
    pub fn flags(&self, id: InstanceId) -> Option<InstanceFlags> {
        self.state.borrow().registry.get(id).map(|i| i.flags)
    }

    /// Children of `id` in key order.
    pub fn children_of(&self, id: InstanceId) -> Vec<(Key, InstanceId)> {
        let state = self.state.borrow();
        let mut children: Vec<(Key, InstanceId)> = state
            .registry
            .get(id)
            .map(|i| i.child_keys.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default();
        children.sort();
        children
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        // Run destroy callbacks of whatever is still mounted.
        self.unmount();
    }
}

/// Compose `component` once in a throwaway runtime.
///
/// Deterministic for fixed props and children: repeated calls return
/// structurally equal trees.
pub fn compose(component: &Component, props: Props, children: Vec<Element>) -> Result<Node> {
    Runtime::default().mount(component, props, children)
}
