//! Quality models scoring Leiden moves.

use crate::graph::WeightedDag;
use crate::partition::{Destination, PartId};
use crate::types::{DagResult, DEFAULT_RESOLUTION};

use super::potts::{Level, PottsPartition};

/// Something whose connectivity a model can judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    /// A node, judged against the rest of its part.
    Node(usize),
    /// A part, judged against the rest of its superpart.
    Part(PartId),
}

/// Scoring contract used by the move and refine phases.
pub trait QualityModel {
    /// Quality gain of moving `node` to `destination`. Zero if already there.
    fn diff(&self, node: usize, destination: Destination) -> f64;

    /// Whether an item is well connected within its enclosing group.
    fn connected(&self, item: Item) -> bool;
}

/// Strategy building the root-level partition of a Leiden run.
///
/// `graph` has nodes `0..n`; `groups` is the initial grouping of those nodes.
pub trait Partitioning {
    fn init(&self, graph: WeightedDag<usize>, groups: Vec<Vec<usize>>) -> DagResult<PottsPartition>;
}

/// Constant Potts model: every original node has size 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantPotts {
    pub resolution: f64,
}

impl Default for ConstantPotts {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl Partitioning for ConstantPotts {
    fn init(&self, graph: WeightedDag<usize>, groups: Vec<Vec<usize>>) -> DagResult<PottsPartition> {
        let sizes = vec![1.0; graph.node_count()];
        PottsPartition::root(Level::new(graph, sizes), groups, self.resolution)
    }
}

/// Reichardt-Bornholdt model: node size is its weighted degree and the
/// resolution is scaled by twice the total edge weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReichardtBornholdt {
    pub resolution: f64,
}

impl Default for ReichardtBornholdt {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl Partitioning for ReichardtBornholdt {
    fn init(&self, graph: WeightedDag<usize>, groups: Vec<Vec<usize>>) -> DagResult<PottsPartition> {
        let sizes: Vec<f64> = (0..graph.node_count()).map(|v| graph.weight_of(&v)).collect();
        let total = graph.total_weight();
        // Without edges every size is zero, so the scale is irrelevant.
        let resolution = if total > 0.0 {
            self.resolution / (2.0 * total)
        } else {
            self.resolution
        };
        PottsPartition::root(Level::new(graph, sizes), groups, resolution)
    }
}
