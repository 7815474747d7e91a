//! Node and Element - the output and input of composition.
//!
//! A [`Node`] is the immutable result of composing a component: a kind tag,
//! props and ordered children. Every recomposition produces a new node that
//! structurally replaces the old one at the same position.
//!
//! An [`Element`] is a compose call that has not happened yet. Components
//! receive their children as elements so they can decide when (and with
//! which extra props) to compose them.

use std::fmt;

use crate::component::Component;
use crate::types::{InstanceId, Props, Value};

// =============================================================================
// Node
// =============================================================================

/// Immutable description of one UI element and its children.
///
/// Equality is structural: kind, props and children. The instances that
/// produced a node are tracked alongside it so that a recomposed subtree
/// can be spliced back into its ancestors, but they never take part in
/// comparisons.
#[derive(Debug, Clone)]
pub struct Node {
    kind: String,
    props: Props,
    children: Vec<Node>,
    /// Producing instances, innermost first.
    origins: Vec<InstanceId>,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.props == other.props && self.children == other.children
    }
}

impl Node {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            props: Props::new(),
            children: Vec::new(),
            origins: Vec::new(),
        }
    }

    // Builders return a node no instance produced, so they drop the
    // origin chain of a composed node they modify.

    /// Builder-style prop.
    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name, value);
        self.origins.clear();
        self
    }

    /// Replace all props.
    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self.origins.clear();
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self.origins.clear();
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self.origins.clear();
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn prop(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Depth-first search for the first node of `kind`, self included.
    pub fn find(&self, kind: &str) -> Option<&Node> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(kind))
    }

    /// All nodes of `kind` in depth-first order, self included.
    pub fn find_all(&self, kind: &str) -> Vec<&Node> {
        let mut out = Vec::new();
        self.collect_kind(kind, &mut out);
        out
    }

    fn collect_kind<'a>(&'a self, kind: &str, out: &mut Vec<&'a Node>) {
        if self.kind == kind {
            out.push(self);
        }
        for child in &self.children {
            child.collect_kind(kind, out);
        }
    }

    // =========================================================================
    // Origin tracking (crate-internal)
    // =========================================================================

    /// Record that `id` produced this node.
    pub(crate) fn stamp(&mut self, id: InstanceId) {
        self.origins.push(id);
    }

    pub(crate) fn origins(&self) -> &[InstanceId] {
        &self.origins
    }

    /// Replace every occurrence of the output of `target` with
    /// `replacement`, keeping the outer producers recorded on the old node.
    ///
    /// Returns whether anything was replaced.
    pub(crate) fn splice(&mut self, target: InstanceId, replacement: &Node) -> bool {
        if let Some(pos) = self.origins.iter().position(|&id| id == target) {
            let outer = self.origins.split_off(pos + 1);
            let mut next = replacement.clone();
            next.origins.extend(outer);
            *self = next;
            return true;
        }
        let mut replaced = false;
        for child in &mut self.children {
            replaced |= child.splice(target, replacement);
        }
        replaced
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}<{}", "", self.kind, indent = depth * 2)?;
        for (name, value) in self.props.iter() {
            write!(f, " {name}={value}")?;
        }
        writeln!(f, ">")?;
        for child in &self.children {
            child.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

// =============================================================================
// Element
// =============================================================================

/// A deferred compose call: component, props, children and optional key.
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) component: Component,
    pub(crate) props: Props,
    pub(crate) children: Vec<Element>,
    pub(crate) key: Option<String>,
}

impl Element {
    pub fn new(component: &Component, props: Props) -> Self {
        Self {
            component: component.clone(),
            props,
            children: Vec::new(),
            key: None,
        }
    }

    /// Explicit key for stable identity among dynamic siblings.
    pub fn keyed(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}
