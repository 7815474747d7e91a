//! End-to-end scenarios for the composition patterns.

use std::time::Duration;

use spark_compose::primitives::{
    counter, counter_view, tab, tabs, theme_provider, themed_button, toggle, toolbar, with_loading,
    LOADING_KIND,
};
use spark_compose::{
    compose, create_context_slot, Component, ComposeError, Node, PropIssue, PropSchema, Props,
    RenderFn, Runtime, Value, ValueKind,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn click(node: &Node) {
    node.prop("on_click")
        .and_then(|v| v.as_callback())
        .expect("node has an on_click handler")
        .emit();
}

fn profile() -> Component {
    Component::new("Profile", |_cx, props, _children| {
        Ok(Node::new("profile").with_prop("name", props.str("name").unwrap_or_default()))
    })
    .with_schema(PropSchema::new().required("name", ValueKind::Str))
}

// =============================================================================
// Higher-order components
// =============================================================================

#[test]
fn test_with_loading_replaces_placeholder_once() {
    init_tracing();
    let inner = profile();
    let wrapped = with_loading(&inner, Duration::from_millis(50));
    assert_eq!(wrapped.name(), "WithLoading(Profile)");

    let props = Props::new().with("name", "ada");
    let runtime = Runtime::default();
    let tree = runtime.mount(&wrapped, props.clone(), Vec::new()).unwrap();
    assert_eq!(tree, Node::new(LOADING_KIND));

    let report = runtime.advance(Duration::from_millis(49)).unwrap();
    assert!(report.recomposed.is_empty());
    assert_eq!(runtime.tree().unwrap(), Node::new(LOADING_KIND));

    let report = runtime.advance(Duration::from_millis(1)).unwrap();
    assert_eq!(report.recomposed, vec![runtime.root().unwrap()]);
    assert_eq!(runtime.tree().unwrap(), compose(&inner, props, Vec::new()).unwrap());

    let report = runtime.advance(Duration::from_millis(500)).unwrap();
    assert!(report.recomposed.is_empty());
    assert_eq!(runtime.pending_tasks(), 0);
}

#[test]
fn test_wrapper_forwards_the_inner_schema() {
    let wrapped = with_loading(&profile(), Duration::from_millis(10));
    let err = Runtime::default()
        .mount(&wrapped, Props::new(), Vec::new())
        .unwrap_err();
    assert_eq!(
        err,
        ComposeError::InvalidProp {
            component: "WithLoading(Profile)".into(),
            prop: "name".into(),
            reason: PropIssue::Missing,
        }
    );
}

// =============================================================================
// Compound components
// =============================================================================

fn active_flags(tree: &Node) -> Vec<bool> {
    tree.find_all("tab")
        .iter()
        .map(|t| t.prop("is_active").and_then(|v| v.as_bool()).unwrap_or(false))
        .collect()
}

#[test]
fn test_tabs_activation_recomposes_once() {
    init_tracing();
    let tab = tab();
    let children = ["Home", "Profile", "Settings"]
        .into_iter()
        .map(|label| tab.element(Props::new().with("label", label)))
        .collect();

    let runtime = Runtime::default();
    let tree = runtime.mount(&tabs(), Props::new(), children).unwrap();
    assert_eq!(active_flags(&tree), vec![true, false, false]);
    let root = runtime.root().unwrap();
    assert_eq!(runtime.compositions(root), Some(1));

    click(&tree.find_all("tab")[1]);
    let report = runtime.run_frame().unwrap();
    assert_eq!(report.recomposed, vec![root]);
    assert_eq!(runtime.compositions(root), Some(2));

    let tree = runtime.tree().unwrap();
    assert_eq!(active_flags(&tree), vec![false, true, false]);
    assert_eq!(tree.prop("active"), Some(&Value::Int(1)));

    // Activating the active tab changes nothing.
    click(&tree.find_all("tab")[1]);
    assert!(runtime.is_idle());
}

#[test]
fn test_tab_outside_tabs_is_rejected() {
    let err = compose(&tab(), Props::new().with("label", "Lonely"), Vec::new()).unwrap_err();
    assert_eq!(
        err,
        ComposeError::InvalidProp {
            component: "Tab".into(),
            prop: "index".into(),
            reason: PropIssue::Missing,
        }
    );
}

// =============================================================================
// Context
// =============================================================================

#[test]
fn test_theme_toggle_reaches_every_consumer() {
    init_tracing();
    let button = themed_button();
    let bar = toolbar().element(Props::new()).with_children([
        button.element(Props::new().with("label", "Save")),
        button.element(Props::new().with("label", "Open")),
    ]);

    let runtime = Runtime::default();
    let tree = runtime.mount(&theme_provider(), Props::new(), vec![bar]).unwrap();
    let themes = |tree: &Node| -> Vec<Value> {
        tree.find_all("button")
            .iter()
            .map(|b| b.prop("theme").cloned().unwrap_or_default())
            .collect()
    };
    assert_eq!(themes(&tree), vec![Value::from("light"), Value::from("light")]);

    click(&tree.find_all("button")[0]);
    runtime.run_frame().unwrap();

    let tree = runtime.tree().unwrap();
    assert_eq!(tree.prop("theme"), Some(&Value::from("dark")));
    assert_eq!(themes(&tree), vec![Value::from("dark"), Value::from("dark")]);
    assert!(tree.find("toolbar").is_some());
}

#[test]
fn test_consumer_outside_provider() {
    // The theme slot has a default.
    let tree = compose(&themed_button(), Props::new().with("label", "Solo"), Vec::new()).unwrap();
    assert_eq!(tree.prop("theme"), Some(&Value::from("light")));
    assert!(tree.prop("on_click").is_none());

    // A slot without one fails.
    let locale = create_context_slot("locale", None);
    let reader = Component::new("LocaleReader", move |cx, _, _| {
        Ok(Node::new("text").with_prop("locale", cx.consume(&locale)?))
    });
    assert_eq!(
        compose(&reader, Props::new(), Vec::new()),
        Err(ComposeError::UnboundContext { key: "locale".into() })
    );
}

#[test]
fn test_toolbar_takes_no_props() {
    let err = compose(&toolbar(), Props::new().with("theme", "dark"), Vec::new()).unwrap_err();
    assert!(matches!(
        err,
        ComposeError::InvalidProp { reason: PropIssue::Unknown, .. }
    ));
}

// =============================================================================
// Render props
// =============================================================================

fn switch_render() -> RenderFn {
    RenderFn::new(|_cx, state| {
        Ok(Node::new("switch")
            .with_prop("on", state.field("on").cloned().unwrap_or_default())
            .with_prop("on_click", state.field("toggle").cloned().unwrap_or_default()))
    })
}

#[test]
fn test_toggle_delegates_rendering() {
    init_tracing();
    let runtime = Runtime::default();
    let tree = runtime
        .mount(&toggle(), Props::new().with("render", switch_render()), Vec::new())
        .unwrap();
    assert_eq!(tree.kind(), "switch");
    assert_eq!(tree.prop("on"), Some(&Value::Bool(false)));

    click(&tree);
    runtime.run_frame().unwrap();
    assert_eq!(runtime.tree().unwrap().prop("on"), Some(&Value::Bool(true)));

    click(&runtime.tree().unwrap());
    runtime.run_frame().unwrap();
    assert_eq!(runtime.tree().unwrap().prop("on"), Some(&Value::Bool(false)));
}

#[test]
fn test_toggle_render_prop_must_be_a_render_function() {
    assert_eq!(
        compose(&toggle(), Props::new(), Vec::new()),
        Err(ComposeError::InvalidProp {
            component: "Toggle".into(),
            prop: "render".into(),
            reason: PropIssue::Missing,
        })
    );
    assert_eq!(
        compose(&toggle(), Props::new().with("render", "nope"), Vec::new()),
        Err(ComposeError::InvalidProp {
            component: "Toggle".into(),
            prop: "render".into(),
            reason: PropIssue::WrongKind {
                expected: ValueKind::Render,
                found: ValueKind::Str,
            },
        })
    );
}

// =============================================================================
// Container / presenter
// =============================================================================

#[test]
fn test_presenter_is_pure() {
    let props = Props::new().with("count", 3);
    let first = compose(&counter_view(), props.clone(), Vec::new()).unwrap();
    let second = compose(&counter_view(), props, Vec::new()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first,
        Node::new("counter")
            .with_prop("count", 3)
            .with_child(Node::new("button").with_prop("label", "+"))
    );
}

#[test]
fn test_counter_recomposes_without_its_parent() {
    init_tracing();
    let counter = counter();
    let app = Component::new("App", move |cx, _, _| {
        Ok(Node::new("app")
            .with_child(Node::new("title").with_prop("text", "Clicks"))
            .with_child(cx.compose(&counter, Props::new().with("start", 5), Vec::new())?))
    });

    let runtime = Runtime::default();
    let tree = runtime.mount(&app, Props::new(), Vec::new()).unwrap();
    let root = runtime.root().unwrap();
    assert_eq!(tree.find("counter").and_then(|c| c.prop("count")), Some(&Value::Int(5)));

    click(tree.find("button").unwrap());
    let report = runtime.run_frame().unwrap();
    assert_eq!(report.recomposed.len(), 1);
    assert_ne!(report.recomposed[0], root);
    assert_eq!(runtime.compositions(root), Some(1));

    let tree = runtime.tree().unwrap();
    assert_eq!(tree.find("counter").and_then(|c| c.prop("count")), Some(&Value::Int(6)));
    assert_eq!(tree.children()[0].kind(), "title");
}

#[test]
fn test_parent_decorating_child_output_is_recomposed() {
    init_tracing();
    let counter = counter();
    let app = Component::new("App", move |cx, _, _| {
        let child = cx.compose(&counter, Props::new(), Vec::new())?;
        Ok(Node::new("app").with_child(child.with_prop("class", "main")))
    });

    let runtime = Runtime::default();
    let tree = runtime.mount(&app, Props::new(), Vec::new()).unwrap();
    let root = runtime.root().unwrap();
    assert_eq!(tree.children()[0].prop("class"), Some(&Value::from("main")));

    click(tree.find("button").unwrap());
    let report = runtime.run_frame().unwrap();
    assert_eq!(report.recomposed.len(), 2);
    assert_eq!(report.recomposed[1], root);

    let after = runtime.tree().unwrap();
    assert_eq!(after.children()[0].prop("class"), Some(&Value::from("main")));
    assert_eq!(after.children()[0].prop("count"), Some(&Value::Int(1)));
    assert!(runtime.is_idle());
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_compose_is_deterministic() {
    let button = themed_button();
    let bar = toolbar()
        .element(Props::new())
        .with_child(button.element(Props::new().with("label", "Go")));
    let props = Props::new().with("initial", "dark");
    let first = compose(&theme_provider(), props.clone(), vec![bar.clone()]).unwrap();
    let second = compose(&theme_provider(), props, vec![bar]).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}
