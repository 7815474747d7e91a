//! Composition - the [`Scope`] handed to component functions.
//!
//! Composing an instance means:
//! 1. Mark it COMPOSING and take it off the frame queue
//! 2. Run its component function with a fresh [`Scope`]
//! 3. Release children that were not composed again in this pass
//! 4. Re-run in place if it wrote its own state, otherwise record the tree
//!
//! Hooks (`state`, `after_mount`, `on_destroy`) are positional: the n-th
//! hook call in a pass refers to the same slot as the n-th call in every
//! other pass of that instance.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, error, trace};

use super::scheduler::TaskHandle;
use super::{run_deferred, Shared};
use crate::component::Component;
use crate::engine::{Hook, InstanceFlags};
use crate::error::{ComposeError, Result};
use crate::node::{Element, Node};
use crate::state::{ContextEnv, ContextSlot, StateCell};
use crate::types::{InstanceId, Key, Props, Value};

/// Handle passed to a component function while it composes.
pub struct Scope {
    runtime: Shared,
    id: InstanceId,
    env: ContextEnv,
    hook_cursor: usize,
    next_index: usize,
    seen: HashMap<Key, InstanceId>,
}

impl Scope {
    fn new(runtime: Shared, id: InstanceId, env: ContextEnv) -> Self {
        Self {
            runtime,
            id,
            env,
            hook_cursor: 0,
            next_index: 0,
            seen: HashMap::new(),
        }
    }

    /// Instance being composed.
    pub fn instance_id(&self) -> InstanceId {
        self.id
    }

    /// Name of the component being composed.
    pub fn component_name(&self) -> String {
        self.runtime.borrow().registry.component_name(self.id)
    }

    /// True until this instance has completed a composition.
    pub fn is_first_composition(&self) -> bool {
        self.runtime
            .borrow()
            .registry
            .get(self.id)
            .is_some_and(|i| !i.flags.contains(InstanceFlags::MOUNTED))
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Compose `component` as the next positional child.
    pub fn compose(
        &mut self,
        component: &Component,
        props: Props,
        children: Vec<Element>,
    ) -> Result<Node> {
        self.compose_child(None, component, props, children)
    }

    /// Compose `component` as a child with an explicit key.
    pub fn compose_keyed(
        &mut self,
        key: impl Into<String>,
        component: &Component,
        props: Props,
        children: Vec<Element>,
    ) -> Result<Node> {
        self.compose_child(Some(key.into()), component, props, children)
    }

    pub fn compose_element(&mut self, element: &Element) -> Result<Node> {
        self.compose_child(
            element.key.clone(),
            &element.component,
            element.props.clone(),
            element.children.clone(),
        )
    }

    /// Compose `element` with `extra` props layered over its own.
    pub fn compose_with(&mut self, element: &Element, extra: Props) -> Result<Node> {
        self.compose_child(
            element.key.clone(),
            &element.component,
            element.props.merged(&extra),
            element.children.clone(),
        )
    }

    /// Compose every element in order.
    pub fn compose_children(&mut self, children: &[Element]) -> Result<Vec<Node>> {
        children.iter().map(|child| self.compose_element(child)).collect()
    }

    fn compose_child(
        &mut self,
        key: Option<String>,
        component: &Component,
        props: Props,
        children: Vec<Element>,
    ) -> Result<Node> {
        let strict = self.runtime.borrow().config.strict_props;
        component.validate(&props, strict)?;

        let key = match key {
            Some(name) => Key::Named(name),
            None => {
                let key = Key::Index(self.next_index);
                self.next_index += 1;
                key
            }
        };
        if self.seen.contains_key(&key) {
            return Err(ComposeError::DuplicateKey {
                parent: self.runtime.borrow().registry.component_name(self.id),
                key: key.to_string(),
            });
        }

        let (child, deferred) = self.runtime.borrow_mut().attach_child(
            self.id,
            key.clone(),
            component,
            props,
            children,
            self.env.clone(),
        );
        run_deferred(deferred);
        self.seen.insert(key, child);

        compose_instance(&self.runtime, child)
    }

    // =========================================================================
    // Hooks
    // =========================================================================

    /// State cell at the next hook position, created with `initial` on the
    /// first pass.
    pub fn state(&mut self, initial: impl Into<Value>) -> Result<StateCell> {
        let slot = self.claim_hook(|| Hook::State(initial.into()))?;
        Ok(StateCell::new(Rc::downgrade(&self.runtime), self.id, slot))
    }

    /// Run `task` once, `delay` after the first composition of this
    /// instance. Dropped if the instance is destroyed first.
    pub fn after_mount(&mut self, delay: Duration, task: impl FnOnce() + 'static) -> Result<()> {
        let before = self.hook_count();
        self.claim_hook(|| Hook::Mount)?;
        if self.hook_count() > before {
            self.schedule(delay, task);
        }
        Ok(())
    }

    /// Run `callback` when this instance is destroyed. Registered once.
    pub fn on_destroy(&mut self, callback: impl FnOnce() + 'static) -> Result<()> {
        let before = self.hook_count();
        self.claim_hook(|| Hook::Cleanup)?;
        if self.hook_count() > before {
            self.runtime
                .borrow_mut()
                .registry
                .on_destroy(self.id, Box::new(callback));
        }
        Ok(())
    }

    /// Queue `task` to run `delay` from now on the virtual clock. The task
    /// belongs to this instance and is dropped with it.
    pub fn schedule(&mut self, delay: Duration, task: impl FnOnce() + 'static) -> TaskHandle {
        let id = self
            .runtime
            .borrow_mut()
            .scheduler
            .schedule(Some(self.id), delay, Box::new(task));
        TaskHandle::new(Rc::downgrade(&self.runtime), id)
    }

    fn hook_count(&self) -> usize {
        self.runtime
            .borrow()
            .registry
            .get(self.id)
            .map_or(0, |i| i.hooks.len())
    }

    /// Claim the next hook position, creating it with `make` if this pass
    /// is the first to reach it.
    fn claim_hook(&mut self, make: impl FnOnce() -> Hook) -> Result<usize> {
        let index = self.hook_cursor;
        self.hook_cursor += 1;

        let mut state = self.runtime.borrow_mut();
        let Some(instance) = state.registry.get_mut(self.id) else {
            return Err(ComposeError::StaleInstance { owner: self.id });
        };
        let fresh = make();
        match instance.hooks.get(index) {
            Some(existing) if existing.same_kind(&fresh) => {}
            Some(_) => {
                return Err(ComposeError::HookOrderChanged {
                    component: instance.component.name().to_string(),
                    index,
                });
            }
            None => instance.hooks.push(fresh),
        }
        Ok(index)
    }

    // =========================================================================
    // Context
    // =========================================================================

    /// Compose `f` with `slot` set to `value` for everything it composes.
    pub fn provide<T>(
        &mut self,
        slot: &ContextSlot,
        value: impl Into<Value>,
        f: impl FnOnce(&mut Scope) -> Result<T>,
    ) -> Result<T> {
        let outer = self.env.clone();
        self.env = outer.with(slot.shared_key(), value.into());
        let result = f(self);
        self.env = outer;
        result
    }

    /// Value of `slot` from the nearest provider, else its default.
    pub fn consume(&self, slot: &ContextSlot) -> Result<Value> {
        slot.resolve(&self.env)
    }
}

// =============================================================================
// Instance composition
// =============================================================================

impl super::RuntimeState {
    /// Reuse the child at `key` when it is the same component, otherwise
    /// allocate a fresh one (releasing whatever held the key).
    fn attach_child(
        &mut self,
        parent: InstanceId,
        key: Key,
        component: &Component,
        props: Props,
        children: Vec<Element>,
        env: ContextEnv,
    ) -> (InstanceId, super::Deferred) {
        let mut deferred = Vec::new();
        let existing = self
            .registry
            .get(parent)
            .and_then(|p| p.child_keys.get(&key).copied());

        if let Some(id) = existing {
            let reusable = self
                .registry
                .get(id)
                .is_some_and(|i| i.component.name() == component.name());
            if reusable {
                if let Some(instance) = self.registry.get_mut(id) {
                    instance.component = component.clone();
                    instance.props = props;
                    instance.children = children;
                    instance.env = env;
                }
                return (id, deferred);
            }
            deferred = self.release(id);
        }

        let id = self
            .registry
            .allocate(Some(parent), key, component.clone(), props, children, env);
        (id, deferred)
    }

    fn begin_composition(
        &mut self,
        id: InstanceId,
    ) -> Result<(Component, Props, Vec<Element>, ContextEnv)> {
        let Some(instance) = self.registry.get_mut(id) else {
            return Err(ComposeError::StaleInstance { owner: id });
        };
        instance.flags.insert(InstanceFlags::COMPOSING);
        instance
            .flags
            .remove(InstanceFlags::DIRTY | InstanceFlags::SELF_WRITE);
        let depth = instance.depth;
        let prepared = (
            instance.component.clone(),
            instance.props.clone(),
            instance.children.clone(),
            instance.env.clone(),
        );
        self.scheduler.clear_dirty(depth, id);
        self.composing.push(id);
        Ok(prepared)
    }

    /// Close a pass: release children that were not composed again and
    /// report whether the instance wrote its own state.
    ///
    /// A failed pass only rebinds the keys it reached. Children it never
    /// got to stay alive, and the instance stays queued for the next frame.
    fn end_composition(
        &mut self,
        id: InstanceId,
        seen: HashMap<Key, InstanceId>,
        failed: bool,
    ) -> (bool, super::Deferred) {
        self.composing.pop();
        let Some(instance) = self.registry.get_mut(id) else {
            return (false, Vec::new());
        };
        instance.flags.remove(InstanceFlags::COMPOSING);
        let self_write = instance.flags.contains(InstanceFlags::SELF_WRITE);
        instance.flags.remove(InstanceFlags::SELF_WRITE);

        let next = if failed {
            if !instance.flags.contains(InstanceFlags::DIRTY) {
                instance.flags.insert(InstanceFlags::DIRTY);
                self.scheduler.mark_dirty(instance.depth, id);
            }
            let mut merged = instance.child_keys.clone();
            merged.extend(seen);
            merged
        } else {
            seen
        };
        let previous = std::mem::replace(&mut instance.child_keys, next);
        let dropped: Vec<InstanceId> = {
            let current = &instance.child_keys;
            previous
                .into_iter()
                .filter(|(key, old)| current.get(key) != Some(old))
                .map(|(_, old)| old)
                .collect()
        };

        let mut deferred = Vec::new();
        for old in dropped {
            deferred.extend(self.release(old));
        }
        (self_write, deferred)
    }

    fn finish_composition(&mut self, id: InstanceId, node: &Node) {
        if let Some(instance) = self.registry.get_mut(id) {
            instance.flags.insert(InstanceFlags::MOUNTED);
            instance.compositions += 1;
            instance.last_tree = Some(node.clone());
        }
    }
}

/// Run the component function of `id` until it settles and return its tree.
pub(crate) fn compose_instance(runtime: &Shared, id: InstanceId) -> Result<Node> {
    let limit = runtime.borrow().config.max_self_recompositions;
    let mut reruns = 0;

    loop {
        let (component, props, children, env) = runtime.borrow_mut().begin_composition(id)?;
        trace!(instance = %id, component = component.name(), rerun = reruns, "composing");

        let mut cx = Scope::new(runtime.clone(), id, env);
        let result = component.render(&mut cx, &props, &children);

        let failed = result.is_err();
        let (self_write, deferred) = runtime.borrow_mut().end_composition(id, cx.seen, failed);
        run_deferred(deferred);
        let mut node = match result {
            Ok(node) => node,
            Err(err) => {
                debug!(
                    instance = %id,
                    component = component.name(),
                    error = %err,
                    "composition failed"
                );
                return Err(err);
            }
        };

        if self_write {
            reruns += 1;
            if reruns > limit {
                error!(instance = %id, component = component.name(), reruns, "composition cycle");
                return Err(ComposeError::CompositionCycle {
                    component: component.name().to_string(),
                    count: reruns,
                });
            }
            continue;
        }

        node.stamp(id);
        runtime.borrow_mut().finish_composition(id, &node);
        return Ok(node);
    }
}
