//! State - owned state cells and ancestor-scoped context.
//!
//! - [`StateCell`] - A value owned by one instance; changing it schedules
//!   that instance for recomposition in the next frame.
//! - [`ContextSlot`] - A keyed value provided by an ancestor and read by any
//!   descendant without passing it through intermediate props.

mod cell;
mod context;

pub use cell::{StateCell, WriteOutcome};
pub use context::{create_context_slot, ContextSlot};
pub(crate) use context::ContextEnv;
