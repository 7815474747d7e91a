//! Primitives - reusable composition patterns.
//!
//! Building blocks:
//! - [`wrap`] / [`with_loading`] - Higher-order components
//! - [`render_prop`] - Invoke a caller-supplied render function
//! - [`show`] / [`each`] - Conditional and keyed list composition
//!
//! Ready-made components, one per pattern:
//! - Container / presenter: [`counter`] + [`counter_view`]
//! - Render props: [`toggle`]
//! - Compound components: [`tabs`] + [`tab`]
//! - Context: [`theme_provider`], [`toolbar`], [`themed_button`]
//!
//! # Example
//!
//! ```
//! use spark_compose::primitives::{tab, tabs};
//! use spark_compose::{Props, Runtime};
//!
//! let tab = tab();
//! let runtime = Runtime::default();
//! let tree = runtime
//!     .mount(
//!         &tabs(),
//!         Props::new(),
//!         vec![
//!             tab.element(Props::new().with("label", "Home")),
//!             tab.element(Props::new().with("label", "Profile")),
//!         ],
//!     )
//!     .unwrap();
//!
//! // Activate the second tab through the callback Tabs injected.
//! tree.children()[1].prop("on_click").and_then(|v| v.as_callback()).unwrap().emit();
//! runtime.run_frame().unwrap();
//!
//! let active: Vec<_> = runtime.tree().unwrap().children().iter()
//!     .map(|t| t.prop("is_active").and_then(|v| v.as_bool()).unwrap())
//!     .collect();
//! assert_eq!(active, vec![false, true]);
//! ```

mod container;
mod control_flow;
mod tabs;
mod theme;
mod toggle;
mod wrapper;

pub use container::{counter, counter_view};
pub use control_flow::{each, show};
pub use tabs::{tab, tabs};
pub use theme::{
    theme_provider, theme_slot, themed_button, toggle_theme_slot, toolbar, THEME_KEY,
    TOGGLE_THEME_KEY,
};
pub use toggle::toggle;
pub use wrapper::{render_prop, with_loading, wrap, LOADING_KIND};
