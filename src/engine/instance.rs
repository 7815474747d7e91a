//! Instance records.

use std::collections::HashMap;

use crate::component::Component;
use crate::node::{Element, Node};
use crate::state::ContextEnv;
use crate::types::{InstanceId, Key, Props, Value};

bitflags::bitflags! {
    /// Lifecycle flags of a component instance.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InstanceFlags: u8 {
        /// Composed at least once.
        const MOUNTED = 1 << 0;
        /// Waiting in the frame queue for recomposition.
        const DIRTY = 1 << 1;
        /// Its component function is currently running.
        const COMPOSING = 1 << 2;
        /// Wrote its own state while composing; re-run before finishing.
        const SELF_WRITE = 1 << 3;
    }
}

/// Positional hook slot.
pub(crate) enum Hook {
    State(Value),
    Mount,
    Cleanup,
}

impl Hook {
    pub(crate) fn same_kind(&self, other: &Hook) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Everything the runtime remembers about one component position.
pub(crate) struct Instance {
    pub id: InstanceId,
    pub parent: Option<InstanceId>,
    pub depth: usize,
    pub key: Key,
    pub component: Component,
    pub props: Props,
    pub children: Vec<Element>,
    /// Context visible at this position when it was last composed.
    pub env: ContextEnv,
    pub hooks: Vec<Hook>,
    pub flags: InstanceFlags,
    pub child_keys: HashMap<Key, InstanceId>,
    pub last_tree: Option<Node>,
    pub compositions: u64,
}

impl Instance {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: InstanceId,
        parent: Option<InstanceId>,
        depth: usize,
        key: Key,
        component: Component,
        props: Props,
        children: Vec<Element>,
        env: ContextEnv,
    ) -> Self {
        Self {
            id,
            parent,
            depth,
            key,
            component,
            props,
            children,
            env,
            hooks: Vec::new(),
            flags: InstanceFlags::empty(),
            child_keys: HashMap::new(),
            last_tree: None,
            compositions: 0,
        }
    }
}
