//! Analysis engines: community detection, equivalence and layout.

pub mod equivalence;
pub mod leiden;
pub mod planarize;

pub use equivalence::{equivalent_by_children, equivalent_by_parents, equivalent_nodes, Equivalence};
pub use leiden::{
    leiden, ConstantPotts, LeidenConfig, LeidenOptions, Partitioning, QualityKind,
    ReichardtBornholdt,
};
pub use planarize::{count_crossings, planarize_directed_multipartite, Planarization, PlanarizationParams};
