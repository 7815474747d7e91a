//! Components and their prop schemas.
//!
//! A component is a named composition function. Props are checked against
//! the component's [`PropSchema`] every time it is composed, so a typo or a
//! wrongly typed prop fails loudly instead of silently rendering defaults.

use std::fmt;
use std::rc::Rc;

use crate::error::{ComposeError, PropIssue, Result};
use crate::node::{Element, Node};
use crate::pipeline::Scope;
use crate::types::{Props, ValueKind};

type Body = dyn Fn(&mut Scope, &Props, &[Element]) -> Result<Node>;

// =============================================================================
// PropSchema
// =============================================================================

/// One declared prop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropField {
    pub name: String,
    pub kind: ValueKind,
    pub required: bool,
}

/// Enumerated props a component accepts.
///
/// An open schema (the default for [`Component::new`]) accepts anything;
/// a closed schema rejects undeclared props when the runtime is strict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropSchema {
    fields: Vec<PropField>,
    open: bool,
}

impl PropSchema {
    /// Closed schema with no fields yet.
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            open: false,
        }
    }

    /// Schema that accepts any props.
    pub fn open() -> Self {
        Self {
            fields: Vec::new(),
            open: true,
        }
    }

    pub fn required(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.fields.push(PropField {
            name: name.into(),
            kind,
            required: true,
        });
        self
    }

    pub fn optional(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.fields.push(PropField {
            name: name.into(),
            kind,
            required: false,
        });
        self
    }

    pub fn fields(&self) -> &[PropField] {
        &self.fields
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Check `props` for `component`.
    ///
    /// Declared fields are always checked; undeclared props are rejected
    /// only for closed schemas under `strict`.
    pub fn validate(&self, component: &str, props: &Props, strict: bool) -> Result<()> {
        let invalid = |prop: &str, reason| ComposeError::InvalidProp {
            component: component.to_string(),
            prop: prop.to_string(),
            reason,
        };

        for field in &self.fields {
            match props.get(&field.name) {
                None if field.required => {
                    return Err(invalid(field.name.as_str(), PropIssue::Missing));
                }
                None => {}
                Some(value) if value.is_null() && !field.required => {}
                Some(value) if value.kind() != field.kind => {
                    return Err(invalid(
                        field.name.as_str(),
                        PropIssue::WrongKind {
                            expected: field.kind,
                            found: value.kind(),
                        },
                    ));
                }
                Some(_) => {}
            }
        }

        if strict && !self.open {
            if let Some((name, _)) = props
                .iter()
                .find(|(name, _)| !self.fields.iter().any(|f| &f.name == *name))
            {
                return Err(invalid(name.as_str(), PropIssue::Unknown));
            }
        }
        Ok(())
    }
}

impl Default for PropSchema {
    fn default() -> Self {
        Self::open()
    }
}

// =============================================================================
// Component
// =============================================================================

/// A named composition function.
///
/// Cloning is cheap; clones share the same function and schema.
///
/// # Example
///
/// ```
/// use spark_compose::{compose, Component, Node, Props, PropSchema, ValueKind};
///
/// let greeting = Component::new("Greeting", |_cx, props, _children| {
///     let name = props.str("name").unwrap_or("world");
///     Ok(Node::new("text").with_prop("content", format!("hello {name}")))
/// })
/// .with_schema(PropSchema::new().optional("name", ValueKind::Str));
///
/// let node = compose(&greeting, Props::new().with("name", "ada"), Vec::new()).unwrap();
/// assert_eq!(node.prop("content").and_then(|v| v.as_str()), Some("hello ada"));
/// ```
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    schema: Rc<PropSchema>,
    body: Rc<Body>,
}

impl Component {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut Scope, &Props, &[Element]) -> Result<Node> + 'static,
    {
        Self {
            name: Rc::from(name.into()),
            schema: Rc::new(PropSchema::open()),
            body: Rc::new(body),
        }
    }

    pub fn with_schema(mut self, schema: PropSchema) -> Self {
        self.schema = Rc::new(schema);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &PropSchema {
        &self.schema
    }

    /// Element for this component with `props` and no children.
    pub fn element(&self, props: Props) -> Element {
        Element::new(self, props)
    }

    pub(crate) fn validate(&self, props: &Props, strict: bool) -> Result<()> {
        self.schema.validate(&self.name, props, strict)
    }

    pub(crate) fn render(
        &self,
        cx: &mut Scope,
        props: &Props,
        children: &[Element],
    ) -> Result<Node> {
        (self.body)(cx, props, children)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component").field("name", &self.name).finish_non_exhaustive()
    }
}
