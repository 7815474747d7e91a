//! Container / presenter split.
//!
//! The container owns state and behaviour; the presenter only turns props
//! into nodes and never holds state of its own.

use crate::component::{Component, PropSchema};
use crate::node::Node;
use crate::types::{Callback, Props, Value, ValueKind};

/// Stateless presenter: `<counter count=N>` with a `+` button.
pub fn counter_view() -> Component {
    Component::new("CounterView", |_cx, props, _children| {
        let count = props.int("count").unwrap_or(0);
        let mut button = Node::new("button").with_prop("label", "+");
        if let Some(on_increment) = props.callback("on_increment") {
            button = button.with_prop("on_click", on_increment.clone());
        }
        Ok(Node::new("counter").with_prop("count", count).with_child(button))
    })
    .with_schema(
        PropSchema::new()
            .required("count", ValueKind::Int)
            .optional("on_increment", ValueKind::Callback),
    )
}

/// Container owning the count; starts at the `start` prop.
pub fn counter() -> Component {
    let view = counter_view();
    Component::new("Counter", move |cx, props, _children| {
        let count = cx.state(props.int("start").unwrap_or(0))?;
        let cell = count.clone();
        let on_increment = Callback::new(move |_| {
            cell.update(|v| Value::Int(v.as_int().unwrap_or(0) + 1));
        });

        let props = Props::new()
            .with("count", count.get())
            .with("on_increment", on_increment);
        cx.compose(&view, props, Vec::new())
    })
    .with_schema(PropSchema::new().optional("start", ValueKind::Int))
}
