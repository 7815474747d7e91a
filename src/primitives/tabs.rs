//! Compound tabs.
//!
//! `Tabs` owns the active index. When it composes its children it injects,
//! by position, `index`, `is_active` and an `on_activate` callback. A `Tab`
//! only renders the props it is given and knows nothing about how `Tabs`
//! stores its state.

use crate::component::{Component, PropSchema};
use crate::node::Node;
use crate::types::{Callback, Props, Value, ValueKind};

/// Parent of a group of [`tab`] elements. `initial` selects the first
/// active index.
pub fn tabs() -> Component {
    Component::new("Tabs", |cx, props, children| {
        let active = cx.state(props.int("initial").unwrap_or(0))?;
        let current = active.get().as_int().unwrap_or(0);

        let mut nodes = Vec::with_capacity(children.len());
        for (position, child) in children.iter().enumerate() {
            let index = position as i64;
            let cell = active.clone();
            let injected = Props::new()
                .with("index", index)
                .with("is_active", index == current)
                .with(
                    "on_activate",
                    Callback::new(move |_| {
                        cell.set(Value::Int(index));
                    }),
                );
            nodes.push(cx.compose_with(child, injected)?);
        }

        Ok(Node::new("tabs").with_prop("active", current).with_children(nodes))
    })
    .with_schema(PropSchema::new().optional("initial", ValueKind::Int))
}

/// One tab. `label` comes from the caller, the rest from [`tabs`].
pub fn tab() -> Component {
    Component::new("Tab", |_cx, props, _children| {
        let mut node = Node::new("tab")
            .with_prop("label", props.str("label").unwrap_or_default())
            .with_prop("index", props.int("index").unwrap_or(0))
            .with_prop("is_active", props.bool("is_active").unwrap_or(false));
        if let Some(on_activate) = props.callback("on_activate") {
            node = node.with_prop("on_click", on_activate.clone());
        }
        Ok(node)
    })
    .with_schema(
        PropSchema::new()
            .required("label", ValueKind::Str)
            .required("index", ValueKind::Int)
            .required("is_active", ValueKind::Bool)
            .required("on_activate", ValueKind::Callback),
    )
}
