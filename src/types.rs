//! Core types for spark-compose.
//!
//! These types are shared across the composition kernel:
//! - [`Value`] - Dynamic property value carried by props and state cells
//! - [`Props`] - Named property mapping passed to components
//! - [`Callback`] / [`RenderFn`] - Handlers stored inside values
//! - [`Key`] / [`InstanceId`] - Identity of component instances

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::node::Node;
use crate::pipeline::Scope;

// =============================================================================
// Identity
// =============================================================================

/// Identity of a component instance.
///
/// Ids are handed out from a monotonically increasing counter and never
/// reused, so a handle that outlives its instance can always be detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(pub(crate) u64);

impl InstanceId {
    /// Raw numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a child within its parent's composition pass.
///
/// Unkeyed children are identified by call position. Children that are
/// inserted, removed or reordered need an explicit [`Key::Named`] to keep
/// their instance (and its state) across recompositions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// The n-th unkeyed compose call in the parent's pass.
    Index(usize),
    /// Explicit key supplied by the caller.
    Named(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Named(name) => write!(f, "{name:?}"),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Shared event handler stored in props.
///
/// Handlers are behaviour, not structure: any two callbacks compare equal,
/// so node equality only looks at the data a tree describes.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(Value)>);

impl Callback {
    pub fn new(f: impl Fn(Value) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the handler.
    pub fn call(&self, arg: Value) {
        (self.0)(arg)
    }

    /// Invoke the handler without an argument.
    pub fn emit(&self) {
        (self.0)(Value::Null)
    }
}

impl PartialEq for Callback {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// Render function for the render-prop pattern.
///
/// The owning component keeps the state and calls this with it; the caller
/// decides what subtree to compose.
#[derive(Clone)]
pub struct RenderFn(Rc<dyn Fn(&mut Scope, &Value) -> Result<Node>>);

impl RenderFn {
    pub fn new(f: impl Fn(&mut Scope, &Value) -> Result<Node> + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Compose the caller-defined subtree for `state`.
    pub fn call(&self, cx: &mut Scope, state: &Value) -> Result<Node> {
        (self.0)(cx, state)
    }
}

impl PartialEq for RenderFn {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl fmt::Debug for RenderFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RenderFn(..)")
    }
}

// =============================================================================
// Value
// =============================================================================

/// Dynamic value held by props, state cells and context slots.
///
/// Equality is by value. Floats compare numerically, except that NaN
/// equals NaN, so rewriting a NaN is not a change.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Callback(Callback),
    Render(RenderFn),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Callback(a), Value::Callback(b)) => a == b,
            (Value::Render(a), Value::Render(b)) => a == b,
            _ => false,
        }
    }
}

/// Discriminant of a [`Value`], used by prop schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    Map,
    Callback,
    Render,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "string",
            ValueKind::List => "list",
            ValueKind::Map => "map",
            ValueKind::Callback => "callback",
            ValueKind::Render => "render function",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
            Value::Callback(_) => ValueKind::Callback,
            Value::Render(_) => ValueKind::Render,
        }
    }

    /// Build a map value from `(name, value)` pairs.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Value::Callback(cb) => Some(cb),
            _ => None,
        }
    }

    pub fn as_render(&self) -> Option<&RenderFn> {
        match self {
            Value::Render(render) => Some(render),
            _ => None,
        }
    }

    /// Field lookup on a [`Value::Map`].
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Map(fields) => fields.get(name),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(fields) => {
                f.write_str("{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Callback(_) => f.write_str("<callback>"),
            Value::Render(_) => f.write_str("<render>"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Callback> for Value {
    fn from(value: Callback) -> Self {
        Value::Callback(value)
    }
}

impl From<RenderFn> for Value {
    fn from(value: RenderFn) -> Self {
        Value::Render(value)
    }
}

// =============================================================================
// Props
// =============================================================================

/// Named properties passed to a component or carried by a node.
///
/// Ordered by name so that structurally equal props always print and
/// compare the same way.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props(BTreeMap<String, Value>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn callback(&self, name: &str) -> Option<&Callback> {
        self.get(name).and_then(Value::as_callback)
    }

    pub fn render(&self, name: &str) -> Option<&RenderFn> {
        self.get(name).and_then(Value::as_render)
    }

    /// Copy of `self` with every entry of `overrides` applied on top.
    pub fn merged(&self, overrides: &Props) -> Props {
        let mut out = self.clone();
        for (k, v) in overrides.iter() {
            out.0.insert(k.clone(), v.clone());
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Props(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
