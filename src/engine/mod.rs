//! Composition engine - instance records and the instance registry.
//!
//! The engine owns the bookkeeping behind every composed component:
//! - Registry: id allocation, parent links, destroy callbacks, recursive release
//! - Instance: one record per component position (props, hooks, last tree)
//!
//! # Identity
//!
//! An instance is identified by its parent plus a [`Key`](crate::Key):
//!
//! ```text
//! #1 Tabs            (parent=-, key=0)
//! #2   Tab "Home"    (parent=#1, key=0)
//! #3   Tab "Profile" (parent=#1, key=1)
//! ```
//!
//! The same parent and key in the next pass resolve to the same instance,
//! so hook state survives recomposition. Positions that disappear are
//! released together with their whole subtree.

mod instance;
mod registry;

pub use instance::InstanceFlags;
pub(crate) use instance::Hook;
pub(crate) use registry::Registry;
