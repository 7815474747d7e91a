//! Wrappers - higher-order components and render props.
//!
//! A wrapper takes a component and returns a new one that delegates to it,
//! adding state or changing what gets composed:
//!
//! ```text
//! with_loading(Profile)        Toggle { render }
//!   ├─ loading: <loading>        ├─ owns `on`
//!   └─ ready:   Profile(props)   └─ composes render({ on, toggle })
//! ```

use std::time::Duration;

use crate::component::Component;
use crate::error::{ComposeError, PropIssue, Result};
use crate::node::{Element, Node};
use crate::pipeline::Scope;
use crate::types::{Props, Value, ValueKind};

/// Kind of the placeholder node shown by [`with_loading`].
pub const LOADING_KIND: &str = "loading";

/// Build a component that delegates to `inner` through `f`.
///
/// The wrapper is named `label(Inner)` and accepts the same props as
/// `inner`.
pub fn wrap<F>(label: &str, inner: &Component, f: F) -> Component
where
    F: Fn(&mut Scope, &Component, &Props, &[Element]) -> Result<Node> + 'static,
{
    let wrapped = inner.clone();
    Component::new(format!("{label}({})", inner.name()), move |cx, props, children| {
        f(cx, &wrapped, props, children)
    })
    .with_schema(inner.schema().clone())
}

/// Show a `<loading>` placeholder until `delay` has passed after mount,
/// then compose `inner` with the forwarded props and children.
pub fn with_loading(inner: &Component, delay: Duration) -> Component {
    wrap("WithLoading", inner, move |cx, inner, props, children| {
        let loading = cx.state(true)?;
        let done = loading.clone();
        cx.after_mount(delay, move || {
            done.set(false);
        })?;

        if loading.get().as_bool().unwrap_or(false) {
            return Ok(Node::new(LOADING_KIND));
        }
        cx.compose(inner, props.clone(), children.to_vec())
    })
}

/// Call the render function stored in `props[name]` with `state`.
///
/// The calling component keeps ownership of `state`; the render function
/// decides what to compose for it.
pub fn render_prop(cx: &mut Scope, props: &Props, name: &str, state: &Value) -> Result<Node> {
    let render = match props.get(name) {
        Some(Value::Render(render)) => render,
        Some(other) => {
            return Err(ComposeError::InvalidProp {
                component: cx.component_name(),
                prop: name.to_string(),
                reason: PropIssue::WrongKind {
                    expected: ValueKind::Render,
                    found: other.kind(),
                },
            });
        }
        None => {
            return Err(ComposeError::InvalidProp {
                component: cx.component_name(),
                prop: name.to_string(),
                reason: PropIssue::Missing,
            });
        }
    };
    render.call(cx, state)
}
