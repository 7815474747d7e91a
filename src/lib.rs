//! # spark-compose
//!
//! Framework-agnostic component composition kernel.
//!
//! Component functions compose children, own state cells and read
//! ancestor-provided context; the result is an immutable [`Node`] tree. No
//! rendering backend is involved: hosts take the tree and draw it however
//! they like.
//!
//! ## Architecture
//!
//! ```text
//! Component fn ──compose──▶ Node tree
//!      │  ▲
//!      │  └── ContextSlot (nearest ancestor provider)
//!      └────▶ StateCell ──write──▶ frame queue ──run_frame──▶ recompose owner subtree
//! ```
//!
//! Every composed position gets an instance with a stable [`InstanceId`].
//! Instances keep their hook state across recompositions and are released,
//! with their pending work, when their position disappears.
//!
//! ## Modules
//!
//! - [`types`] - Value, Props, Key, handlers
//! - [`node`] - Node (output) and Element (deferred compose call)
//! - [`component`] - Components and prop schemas
//! - [`engine`] - Instance registry
//! - [`state`] - State cells and context slots
//! - [`pipeline`] - Scope, Runtime, frames and scheduled tasks
//! - [`primitives`] - Wrappers, control flow and pattern components

pub mod component;
pub mod config;
pub mod engine;
pub mod error;
pub mod node;
pub mod pipeline;
pub mod primitives;
pub mod state;
pub mod types;

pub use types::*;

pub use component::{Component, PropField, PropSchema};
pub use config::RuntimeConfig;
pub use engine::InstanceFlags;
pub use error::{ComposeError, PropIssue, Result};
pub use node::{Element, Node};
pub use pipeline::{compose, FrameReport, Phase, Runtime, Scope, TaskHandle};
pub use primitives::{render_prop, with_loading, wrap};
pub use state::{create_context_slot, ContextSlot, StateCell, WriteOutcome};
