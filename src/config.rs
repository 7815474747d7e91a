//! Runtime configuration.
//!
//! Limits that turn runaway recomposition into errors, plus a few
//! behaviour switches. Deserializable so hosts can keep it next to their
//! own settings.

use serde::{Deserialize, Serialize};

/// Default number of in-place re-runs when a component writes its own state
/// while composing.
const DEFAULT_MAX_SELF_RECOMPOSITIONS: usize = 25;
/// Default number of times one instance may be recomposed within a frame.
const DEFAULT_MAX_RECOMPOSITIONS_PER_FRAME: usize = 50;

/// Configuration for a [`Runtime`](crate::Runtime).
///
/// # Examples
///
/// ```
/// use spark_compose::RuntimeConfig;
///
/// let config = RuntimeConfig::default()
///     .with_max_self_recompositions(5)
///     .with_strict_props(false);
/// assert_eq!(config.max_self_recompositions, 5);
/// assert!(!config.strict_props);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Re-runs allowed when a component writes its own state during its
    /// composition before `CompositionCycle` is raised.
    pub max_self_recompositions: usize,
    /// Recompositions of a single instance allowed in one frame before
    /// `CompositionCycle` is raised.
    pub max_recompositions_per_frame: usize,
    /// Log writes to destroyed instances at `warn` (otherwise `debug`).
    pub log_stale_writes: bool,
    /// Reject props not declared by a closed schema.
    pub strict_props: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_self_recompositions: DEFAULT_MAX_SELF_RECOMPOSITIONS,
            max_recompositions_per_frame: DEFAULT_MAX_RECOMPOSITIONS_PER_FRAME,
            log_stale_writes: true,
            strict_props: true,
        }
    }
}

impl RuntimeConfig {
    pub fn with_max_self_recompositions(mut self, limit: usize) -> Self {
        self.max_self_recompositions = limit;
        self
    }

    pub fn with_max_recompositions_per_frame(mut self, limit: usize) -> Self {
        self.max_recompositions_per_frame = limit;
        self
    }

    pub fn with_log_stale_writes(mut self, enabled: bool) -> Self {
        self.log_stale_writes = enabled;
        self
    }

    pub fn with_strict_props(mut self, strict: bool) -> Self {
        self.strict_props = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.max_self_recompositions, 25);
        assert_eq!(config.max_recompositions_per_frame, 50);
        assert!(config.log_stale_writes);
        assert!(config.strict_props);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: RuntimeConfig =
            serde_json::from_str(r#"{ "max_self_recompositions": 3, "strict_props": false }"#)
                .unwrap();
        assert_eq!(config.max_self_recompositions, 3);
        assert!(!config.strict_props);
        assert_eq!(config.max_recompositions_per_frame, 50);
        assert!(config.log_stale_writes);
    }
}
