//! Render-prop toggle.

use super::wrapper::render_prop;
use crate::component::{Component, PropSchema};
use crate::types::{Callback, Value, ValueKind};

/// Owns an `on` flag and composes `render({ on, toggle })`.
///
/// The caller decides what the toggle looks like; the component decides
/// when it flips.
pub fn toggle() -> Component {
    Component::new("Toggle", |cx, props, _children| {
        let on = cx.state(props.bool("initial").unwrap_or(false))?;
        let cell = on.clone();
        let flip = Callback::new(move |_| {
            cell.update(|v| Value::Bool(!v.as_bool().unwrap_or(false)));
        });

        let state = Value::map([("on", on.get()), ("toggle", Value::from(flip))]);
        render_prop(cx, props, "render", &state)
    })
    .with_schema(
        PropSchema::new()
            .required("render", ValueKind::Render)
            .optional("initial", ValueKind::Bool),
    )
}
