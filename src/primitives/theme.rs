//! Theme context.
//!
//! `ThemeProvider` owns the current theme and provides it, together with a
//! setter, to everything it composes. `Toolbar` sits in between and takes
//! no props at all; `ThemedButton` reads both values from context.

use crate::component::{Component, PropSchema};
use crate::node::Node;
use crate::state::ContextSlot;
use crate::types::{Callback, Value, ValueKind};

pub const THEME_KEY: &str = "theme";
pub const TOGGLE_THEME_KEY: &str = "toggle_theme";

/// Current theme name; `"light"` outside any provider.
pub fn theme_slot() -> ContextSlot {
    ContextSlot::with_default(THEME_KEY, "light")
}

/// Setter flipping between `"light"` and `"dark"`; null outside any provider.
pub fn toggle_theme_slot() -> ContextSlot {
    ContextSlot::with_default(TOGGLE_THEME_KEY, Value::Null)
}

pub fn theme_provider() -> Component {
    let theme = theme_slot();
    let toggle = toggle_theme_slot();
    Component::new("ThemeProvider", move |cx, props, children| {
        let current = cx.state(props.str("initial").unwrap_or("light"))?;
        let cell = current.clone();
        let flip = Callback::new(move |_| {
            cell.update(|v| {
                let next = if v.as_str() == Some("dark") { "light" } else { "dark" };
                Value::from(next)
            });
        });

        let value = current.get();
        let nodes = cx.provide(&theme, value.clone(), |cx| {
            cx.provide(&toggle, flip, |cx| cx.compose_children(children))
        })?;
        Ok(Node::new("theme-provider")
            .with_prop("theme", value)
            .with_children(nodes))
    })
    .with_schema(PropSchema::new().optional("initial", ValueKind::Str))
}

/// Layout container that passes nothing down explicitly.
pub fn toolbar() -> Component {
    Component::new("Toolbar", |cx, _props, children| {
        Ok(Node::new("toolbar").with_children(cx.compose_children(children)?))
    })
    .with_schema(PropSchema::new())
}

pub fn themed_button() -> Component {
    let theme = theme_slot();
    let toggle = toggle_theme_slot();
    Component::new("ThemedButton", move |cx, props, _children| {
        let current = cx.consume(&theme)?;
        let on_click = cx.consume(&toggle)?;

        let mut node = Node::new("button")
            .with_prop("label", props.str("label").unwrap_or_default())
            .with_prop("theme", current);
        if !on_click.is_null() {
            node = node.with_prop("on_click", on_click);
        }
        Ok(node)
    })
    .with_schema(PropSchema::new().optional("label", ValueKind::Str))
}
