//! Leiden community detection over weighted graphs.
//!
//! Each level runs a queue-driven move phase, refines every community into
//! well-connected subcommunities by softmax sampling, then collapses the
//! refined parts into the nodes of the next level. The run stops once a
//! move phase leaves every node in its own part, or after the configured
//! number of levels.

pub mod choose;
pub mod potts;
pub mod quality;

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::graph::{EdgeWeight, GraphView, WeightedDag};
use crate::partition::{Destination, Partition};
use crate::types::{DagError, DagResult, DEFAULT_RESOLUTION, DEFAULT_SMOOTHING};

pub use choose::{argmax, choose, softmax};
pub use potts::{Level, PottsData, PottsPartition};
pub use quality::{ConstantPotts, Item, Partitioning, QualityModel, ReichardtBornholdt};

/// Parameters of a Leiden run.
pub struct LeidenOptions<N> {
    /// Quality model building the root partition.
    pub partitioning: Box<dyn Partitioning>,
    /// Starting grouping. Must cover exactly the graph's nodes. `None` = singletons.
    pub initial_partition: Option<Partition<N>>,
    /// Maximum number of levels. `None` = node count.
    pub iterations: Option<usize>,
    /// Softmax temperature of the refinement phase. Non-positive = greedy.
    pub smoothing: f64,
    /// Seed for refinement sampling. `None` = entropy.
    pub seed: Option<u64>,
}

impl<N> Default for LeidenOptions<N> {
    fn default() -> Self {
        Self {
            partitioning: Box::new(ConstantPotts::default()),
            initial_partition: None,
            iterations: None,
            smoothing: DEFAULT_SMOOTHING,
            seed: None,
        }
    }
}

/// Which quality model a [`LeidenConfig`] selects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityKind {
    #[default]
    ConstantPotts,
    ReichardtBornholdt,
}

/// Serializable form of [`LeidenOptions`], without an initial partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeidenConfig {
    pub model: QualityKind,
    pub resolution: f64,
    pub iterations: Option<usize>,
    pub smoothing: f64,
    pub seed: Option<u64>,
}

impl Default for LeidenConfig {
    fn default() -> Self {
        Self {
            model: QualityKind::default(),
            resolution: DEFAULT_RESOLUTION,
            iterations: None,
            smoothing: DEFAULT_SMOOTHING,
            seed: None,
        }
    }
}

impl<N> From<LeidenConfig> for LeidenOptions<N> {
    fn from(config: LeidenConfig) -> Self {
        let partitioning: Box<dyn Partitioning> = match config.model {
            QualityKind::ConstantPotts => Box::new(ConstantPotts {
                resolution: config.resolution,
            }),
            QualityKind::ReichardtBornholdt => Box::new(ReichardtBornholdt {
                resolution: config.resolution,
            }),
        };
        Self {
            partitioning,
            initial_partition: None,
            iterations: config.iterations,
            smoothing: config.smoothing,
            seed: config.seed,
        }
    }
}

/// Detect communities of `graph`, weighting edges with `edge_weight`.
///
/// Returns disjoint groups covering every node. An empty graph yields no
/// groups.
pub fn leiden<N, G, W>(graph: &G, edge_weight: &W, options: LeidenOptions<N>) -> DagResult<Vec<Vec<N>>>
where
    N: Clone + Eq + Hash,
    G: GraphView<N> + ?Sized,
    W: EdgeWeight<N> + ?Sized,
{
    let nodes = graph.nodes();
    if nodes.is_empty() {
        return Ok(Vec::new());
    }
    let index: HashMap<N, usize> = nodes.iter().cloned().enumerate().map(|(i, n)| (n, i)).collect();

    let mut weighted = WeightedDag::new();
    for i in 0..nodes.len() {
        weighted.add(i);
    }
    for (i, tail) in nodes.iter().enumerate() {
        for head in graph.children_of(tail) {
            if let Some(&j) = index.get(&head) {
                weighted.connect(i, j, edge_weight.weight(tail, &head))?;
            }
        }
    }

    let groups = match &options.initial_partition {
        Some(initial) => initial_groups(initial, &index)?,
        None => (0..nodes.len()).map(|i| vec![i]).collect(),
    };

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut partition = options.partitioning.init(weighted, groups)?;
    let iterations = options.iterations.unwrap_or(nodes.len());
    for level in 0..iterations {
        move_nodes(&mut partition);
        log::debug!(
            "Leiden level {}: {} nodes in {} parts",
            level,
            partition.node_count(),
            partition.part_count()
        );
        if partition.part_count() == partition.node_count() {
            break;
        }
        partition = refine(&partition, options.smoothing, &mut rng).aggregated()?;
    }

    Ok(partition
        .groups()
        .into_iter()
        .map(|group| group.into_iter().map(|i| nodes[i].clone()).collect())
        .collect())
}

fn initial_groups<N: Clone + Eq + Hash>(
    initial: &Partition<N>,
    index: &HashMap<N, usize>,
) -> DagResult<Vec<Vec<usize>>> {
    if initial.node_count() != index.len() {
        return Err(DagError::UnmatchedPartition);
    }
    initial
        .groups()
        .into_iter()
        .map(|group| {
            group
                .iter()
                .map(|node| index.get(node).copied().ok_or(DagError::UnmatchedPartition))
                .collect()
        })
        .collect()
}

/// Greedy move phase. Neighbours of a moved node that now sit in another
/// part are queued again.
pub fn move_nodes(partition: &mut PottsPartition) {
    let n = partition.node_count();
    let mut queue: VecDeque<usize> = (0..n).collect();
    let mut queued = vec![true; n];

    while let Some(node) = queue.pop_front() {
        queued[node] = false;

        let candidates = partition
            .part_ids()
            .into_iter()
            .map(Destination::Part)
            .chain(std::iter::once(Destination::Fresh))
            .map(|dest| (dest, partition.diff(node, dest)));
        let Some((best, gain)) = argmax(candidates) else {
            continue;
        };
        if gain <= 0.0 || !partition.move_node(node, best) {
            continue;
        }
        log::trace!("Moved node {} with gain {:.6}", node, gain);

        let own = partition.part_of(node);
        let neighbours: Vec<usize> = partition.level().neighbours(node).iter().map(|&(u, _)| u).collect();
        for u in neighbours {
            if !queued[u] && partition.part_of(u) != own {
                queued[u] = true;
                queue.push_back(u);
            }
        }
    }
}

/// Refinement phase: split every community into well-connected subparts.
pub fn refine<R: Rng + ?Sized>(partition: &PottsPartition, smoothing: f64, rng: &mut R) -> PottsPartition {
    let mut refined = partition.sub();
    for node in 0..refined.node_count() {
        let alone = refined
            .part_of(node)
            .is_some_and(|p| refined.partition().partition().part_size(p) == 1);
        if !alone || !partition.connected(Item::Node(node)) {
            continue;
        }
        let Some(superpart) = refined.partition().superpart_of(&node) else {
            continue;
        };

        let candidates: Vec<(Destination, f64)> = refined
            .partition()
            .subparts(superpart)
            .into_iter()
            .filter(|&part| refined.connected(Item::Part(part)))
            .map(|part| (Destination::Part(part), refined.diff(node, Destination::Part(part))))
            .filter(|&(_, diff)| diff > 0.0)
            .collect();

        if let Some(chosen) = choose(&candidates, smoothing, rng) {
            refined.move_node(node, chosen);
        }
    }
    refined
}
