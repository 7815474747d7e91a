//! Control Flow Primitives - conditional and list composition.
//!
//! - [`show`] - Compose one of two branches depending on a condition
//! - [`each`] - Compose one child per item, identified by a key
//!
//! # Identity
//!
//! `show()` composes its branches under distinct keys, so flipping the
//! condition destroys one branch (and its state) and mounts the other.
//!
//! `each()` keys every item. Inserting, removing or reordering items keeps
//! the instance (and state) of every item whose key survives:
//!
//! ```text
//! ["apple", "banana", "cherry"]  ->  ["cherry", "apple"]
//!   apple  #4  kept
//!   banana #5  destroyed
//!   cherry #6  kept
//! ```

use crate::error::Result;
use crate::node::{Element, Node};
use crate::pipeline::Scope;

const THEN_KEY: &str = "show:then";
const ELSE_KEY: &str = "show:else";

/// Compose `then` when `condition` holds, otherwise `otherwise` if given.
pub fn show(
    cx: &mut Scope,
    condition: bool,
    then: &Element,
    otherwise: Option<&Element>,
) -> Result<Option<Node>> {
    let (key, branch) = match (condition, otherwise) {
        (true, _) => (THEN_KEY, then),
        (false, Some(branch)) => (ELSE_KEY, branch),
        (false, None) => return Ok(None),
    };
    cx.compose_keyed(
        key,
        branch.component(),
        branch.props().clone(),
        branch.children().to_vec(),
    )
    .map(Some)
}

/// Compose `render(item)` for every item under the key `key_fn(item)`.
///
/// Two items with the same key fail with `DuplicateKey`.
pub fn each<T, K>(
    cx: &mut Scope,
    items: &[T],
    key_fn: impl Fn(&T) -> K,
    render: impl Fn(&T) -> Element,
) -> Result<Vec<Node>>
where
    K: ToString,
{
    items
        .iter()
        .map(|item| {
            let element = render(item);
            cx.compose_keyed(
                key_fn(item).to_string(),
                element.component(),
                element.props().clone(),
                element.children().to_vec(),
            )
        })
        .collect()
}
