//! Construction options shared by every graph.

use serde::{Deserialize, Serialize};

/// How `connect` treats a new edge that might close a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeAdditionStrategy {
    /// Reject any edge that would close a cycle.
    Safe,
    /// Accept every edge without a reachability check.
    #[default]
    Unsafe,
}

/// Options for a [`Dag`](crate::graph::Dag).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DagOptions {
    /// Cycle policy applied by `connect`.
    pub edge_addition_strategy: EdgeAdditionStrategy,
}

impl DagOptions {
    /// Options with cycle checking enabled.
    pub fn safe() -> Self {
        Self {
            edge_addition_strategy: EdgeAdditionStrategy::Safe,
        }
    }

    /// Whether cycle checks run on `connect`.
    pub fn is_safe(&self) -> bool {
        self.edge_addition_strategy == EdgeAdditionStrategy::Safe
    }
}
