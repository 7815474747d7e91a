//! Context slots - ancestor-scoped values.
//!
//! A provider installs a value for the subtree it composes inside
//! [`Scope::provide`]. Descendants resolve a slot by walking outward from
//! their position: the nearest provider wins, then the slot's default,
//! otherwise `UnboundContext`.
//!
//! The visible environment is captured per instance, so an instance that
//! recomposes on its own still sees what its ancestors provided the last
//! time they composed.

use std::rc::Rc;

use crate::error::{ComposeError, Result};
use crate::pipeline::Scope;
use crate::types::Value;

/// A named context value with an optional default.
///
/// Slots are matched by key, so two slots created with the same key refer
/// to the same context.
///
/// # Example
///
/// ```
/// use spark_compose::{compose, Component, ContextSlot, Node, Props};
///
/// let theme = ContextSlot::with_default("theme", "light");
///
/// let slot = theme.clone();
/// let label = Component::new("Label", move |cx, _, _| {
///     let theme = cx.consume(&slot)?;
///     Ok(Node::new("label").with_prop("theme", theme))
/// });
///
/// let slot = theme.clone();
/// let inner = label.clone();
/// let app = Component::new("App", move |cx, _, _| {
///     let dark = cx.provide(&slot, "dark", |cx| cx.compose(&inner, Props::new(), Vec::new()))?;
///     let plain = cx.compose(&inner, Props::new(), Vec::new())?;
///     Ok(Node::new("app").with_child(dark).with_child(plain))
/// });
///
/// let tree = compose(&app, Props::new(), Vec::new()).unwrap();
/// let themes: Vec<_> = tree.find_all("label").iter().map(|n| n.prop("theme").cloned()).collect();
/// assert_eq!(themes, vec![Some("dark".into()), Some("light".into())]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSlot {
    key: Rc<str>,
    default: Option<Value>,
}

impl ContextSlot {
    /// Slot without a default; consuming it outside a provider fails.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Rc::from(key.into()),
            default: None,
        }
    }

    pub fn with_default(key: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            key: Rc::from(key.into()),
            default: Some(default.into()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Compose `f` with this slot set to `value`.
    pub fn provide<T>(
        &self,
        cx: &mut Scope,
        value: impl Into<Value>,
        f: impl FnOnce(&mut Scope) -> Result<T>,
    ) -> Result<T> {
        cx.provide(self, value, f)
    }

    /// Resolve the slot at the scope's position.
    pub fn consume(&self, cx: &Scope) -> Result<Value> {
        cx.consume(self)
    }

    pub(crate) fn shared_key(&self) -> Rc<str> {
        self.key.clone()
    }

    pub(crate) fn resolve(&self, env: &ContextEnv) -> Result<Value> {
        env.lookup(&self.key)
            .or_else(|| self.default.clone())
            .ok_or_else(|| ComposeError::UnboundContext {
                key: self.key.to_string(),
            })
    }
}

/// Slot for `key` with an optional default.
pub fn create_context_slot(key: impl Into<String>, default: Option<Value>) -> ContextSlot {
    ContextSlot {
        key: Rc::from(key.into()),
        default,
    }
}

// =============================================================================
// Environment
// =============================================================================

struct Frame {
    key: Rc<str>,
    value: Value,
    parent: ContextEnv,
}

/// Persistent list of provided values, nearest provider first.
#[derive(Clone, Default)]
pub(crate) struct ContextEnv(Option<Rc<Frame>>);

impl ContextEnv {
    pub(crate) fn with(&self, key: Rc<str>, value: Value) -> Self {
        ContextEnv(Some(Rc::new(Frame {
            key,
            value,
            parent: self.clone(),
        })))
    }

    pub(crate) fn lookup(&self, key: &str) -> Option<Value> {
        let mut current = self.0.as_ref();
        while let Some(frame) = current {
            if &*frame.key == key {
                return Some(frame.value.clone());
            }
            current = frame.parent.0.as_ref();
        }
        None
    }
}
