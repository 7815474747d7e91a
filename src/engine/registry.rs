//! Instance Registry - id allocation and instance lifecycle.
//!
//! Manages the lifecycle of component instances:
//! - Monotonic id counter (ids are never reused)
//! - Parent links and per-parent child keys
//! - Destroy callbacks registered per instance
//! - Recursive release of whole subtrees

use std::collections::HashMap;

use tracing::debug;

use super::instance::Instance;
use crate::component::Component;
use crate::node::Element;
use crate::state::ContextEnv;
use crate::types::{InstanceId, Key, Props};

/// Callback run when an instance is destroyed.
pub(crate) type DestroyCallback = Box<dyn FnOnce()>;

/// Result of releasing a subtree.
#[derive(Default)]
pub(crate) struct Released {
    /// Released ids, children before parents.
    pub ids: Vec<InstanceId>,
    /// Destroy callbacks to run once the runtime is no longer borrowed.
    pub callbacks: Vec<DestroyCallback>,
}

#[derive(Default)]
pub(crate) struct Registry {
    instances: HashMap<InstanceId, Instance>,
    destroy_callbacks: HashMap<InstanceId, Vec<DestroyCallback>>,
    next_id: u64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Allocate a new instance under `parent` at `key`.
    pub(crate) fn allocate(
        &mut self,
        parent: Option<InstanceId>,
        key: Key,
        component: Component,
        props: Props,
        children: Vec<Element>,
        env: ContextEnv,
    ) -> InstanceId {
        self.next_id += 1;
        let id = InstanceId(self.next_id);
        let depth = parent
            .and_then(|p| self.instances.get(&p))
            .map_or(0, |p| p.depth + 1);

        debug!(
            instance = %id,
            component = component.name(),
            key = %key,
            depth,
            "allocated instance"
        );

        let instance = Instance::new(id, parent, depth, key, component, props, children, env);
        self.instances.insert(id, instance);
        id
    }

    /// Release an instance and, first, all of its descendants.
    ///
    /// Unknown ids release nothing.
    pub(crate) fn release(&mut self, id: InstanceId) -> Released {
        let mut released = Released::default();
        self.release_into(id, &mut released);
        released
    }

    fn release_into(&mut self, id: InstanceId, out: &mut Released) {
        let children: Vec<InstanceId> = match self.instances.get(&id) {
            Some(instance) => instance.child_keys.values().copied().collect(),
            None => return,
        };

        for child in children {
            self.release_into(child, out);
        }

        if let Some(callbacks) = self.destroy_callbacks.remove(&id) {
            out.callbacks.extend(callbacks);
        }
        if let Some(instance) = self.instances.remove(&id) {
            debug!(
                instance = %instance.id,
                component = instance.component.name(),
                key = %instance.key,
                "released instance"
            );
        }
        out.ids.push(id);
    }

    // =========================================================================
    // Destroy Callbacks
    // =========================================================================

    /// Register a callback to run when `id` is destroyed.
    pub(crate) fn on_destroy(&mut self, id: InstanceId, callback: DestroyCallback) {
        self.destroy_callbacks.entry(id).or_default().push(callback);
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub(crate) fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.instances.get_mut(&id)
    }

    pub(crate) fn is_allocated(&self, id: InstanceId) -> bool {
        self.instances.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.instances.len()
    }

    /// Name of the component at `id`, or an empty string.
    pub(crate) fn component_name(&self, id: InstanceId) -> String {
        self.instances
            .get(&id)
            .map(|i| i.component.name().to_string())
            .unwrap_or_default()
    }
}
