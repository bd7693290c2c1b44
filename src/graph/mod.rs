//! In-memory graph structures: the DAG core and its companions.

pub mod builder;
pub mod dag;
pub mod handle;
pub mod multipartite;
pub mod traversal;
pub mod view;
pub mod weighted;

pub use builder::DagBuilder;
pub use dag::{Dag, DagSize};
pub use handle::{EdgeMut, EdgeRef, NodeMut, NodeRef};
pub use multipartite::OrderedMultipartite;
pub use traversal::{
    BreadthFirst, BreadthFirstOptions, DepthFirst, DepthFirstOptions, DfsStep, InjectOn,
};
pub use view::GraphView;
pub use weighted::{EdgeWeight, UnitWeight, WeightedDag, WeightedSize};
