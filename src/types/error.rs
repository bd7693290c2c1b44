//! Error types for the dagkit library.

use thiserror::Error;

/// All errors that can occur in the dagkit library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DagError {
    /// An edge (or a traversal step) would close a cycle.
    #[error("Cycle prohibited: {0}")]
    CycleProhibited(String),

    /// An initial partition does not cover exactly the nodes of the graph.
    #[error("Partition does not match the nodes of the graph")]
    UnmatchedPartition,

    /// A subpart straddles more than one parent part.
    #[error("Subpartition parts are not contained in single parent parts")]
    InvalidSubPartitioning,

    /// Subpartition and parent partition hold different node sets.
    #[error("Subpartition nodes do not match the parent partition")]
    UnmatchedSubPartition,

    /// Two partitions cannot be paired part to part.
    #[error("Partitions are not isomorphic.")]
    NonIsomorphicPartitions,
}

/// Convenience result type for dagkit operations.
pub type DagResult<T> = Result<T, DagError>;
