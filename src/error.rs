//! Error types for the composition kernel.
//!
//! `UnboundContext`, `CompositionCycle` and the validation errors are
//! programmer errors surfaced to the caller. `StaleInstance` only shows up
//! through [`StateCell::try_set`](crate::StateCell::try_set); plain writes
//! absorb it.

use thiserror::Error;

use crate::types::{InstanceId, ValueKind};

/// Errors produced while composing or updating a component tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// `consume` found no provider and the slot has no default.
    #[error("context `{key}` is not provided by any ancestor and has no default")]
    UnboundContext { key: String },

    /// Write to a state cell whose owning instance has been destroyed.
    #[error("state cell owner {owner} has been destroyed")]
    StaleInstance { owner: InstanceId },

    /// A component kept re-triggering its own composition.
    #[error("component `{component}` recomposed itself {count} times without settling")]
    CompositionCycle { component: String, count: usize },

    /// Props failed the component's schema.
    #[error("invalid prop `{prop}` for `{component}`: {reason}")]
    InvalidProp {
        component: String,
        prop: String,
        reason: PropIssue,
    },

    /// Two siblings were composed with the same explicit key.
    #[error("duplicate key {key} among children of `{parent}`")]
    DuplicateKey { parent: String, key: String },

    /// Hooks were called in a different order than the previous pass.
    #[error("hook #{index} of `{component}` changed kind between compositions")]
    HookOrderChanged { component: String, index: usize },

    /// Runtime operation that needs a mounted root.
    #[error("no component is mounted")]
    NotMounted,
}

/// Why a prop failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropIssue {
    #[error("required prop is missing")]
    Missing,
    #[error("expected {expected}, got {found}")]
    WrongKind { expected: ValueKind, found: ValueKind },
    #[error("prop is not declared by the component")]
    Unknown,
}

pub type Result<T> = std::result::Result<T, ComposeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ComposeError::UnboundContext { key: "theme".into() };
        assert_eq!(
            err.to_string(),
            "context `theme` is not provided by any ancestor and has no default"
        );

        let err = ComposeError::InvalidProp {
            component: "Tab".into(),
            prop: "label".into(),
            reason: PropIssue::WrongKind {
                expected: ValueKind::Str,
                found: ValueKind::Int,
            },
        };
        assert_eq!(err.to_string(), "invalid prop `label` for `Tab`: expected string, got int");

        let err = ComposeError::StaleInstance { owner: InstanceId(7) };
        assert_eq!(err.to_string(), "state cell owner #7 has been destroyed");
    }
}
