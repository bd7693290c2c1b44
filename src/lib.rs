//! dagkit: an in-memory directed acyclic graph engine.
//!
//! Mutable DAG storage with lazy traversal, node partitions and
//! subpartitions, Leiden community detection, structural equivalence
//! classes and crossing reduction for layered layouts.

pub mod engine;
pub mod graph;
pub mod index;
pub mod partition;
pub mod types;

// Re-export commonly used types at the crate root
pub use engine::{
    count_crossings, equivalent_by_children, equivalent_by_parents, equivalent_nodes, leiden,
    planarize_directed_multipartite, ConstantPotts, Equivalence, LeidenConfig, LeidenOptions,
    Planarization, PlanarizationParams, QualityKind, ReichardtBornholdt,
};
pub use graph::{
    BreadthFirst, BreadthFirstOptions, Dag, DagBuilder, DagSize, DepthFirst, DepthFirstOptions,
    DfsStep, EdgeWeight, GraphView, InjectOn, OrderedMultipartite, UnitWeight, WeightedDag,
};
pub use partition::{Destination, PartId, Partition, SubPartition};
pub use types::{
    DagError, DagOptions, DagResult, EdgeAdditionStrategy, DEFAULT_FORCE_WEIGHT,
    DEFAULT_RESOLUTION, DEFAULT_SMOOTHING, MAX_PLANARIZATION_ROUNDS,
};
