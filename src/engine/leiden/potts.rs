//! Potts-style partition state shared by both quality models.
//!
//! Bookkeeping per node `v` of size `s` in part `P` under superpart `S`:
//! - node weight: edge weight between `v` and `P \ v`
//! - parent node weight: edge weight between `v` and `S \ v` (fixed)
//! - part weight: edge weight between `P` and `S \ P`
//!
//! Moving `v` from `B` to `D` changes the quality by
//! `E(v, D) - E(v, B \ v) - gamma * s * (S_D - S_B + s)`.
//! The penalty is scaled by `s`, so it matches the unit-size form
//! `gamma * (S_D - S_B + 1)` only on the first level.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::graph::WeightedDag;
use crate::partition::{Destination, PartId, Partition, SubPartition};
use crate::types::{DagError, DagResult};

use super::quality::{Item, QualityModel};

/// Size and weight of a part.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PottsData {
    /// Summed size of the members.
    pub size: f64,
    /// Edge weight leaving the part within its superpart.
    pub weight: f64,
}

/// One coarsening level: a weighted graph over nodes `0..n`.
pub struct Level {
    graph: WeightedDag<usize>,
    /// Undirected adjacency, both edge directions merged, self-loops dropped.
    neighbours: Vec<Vec<(usize, f64)>>,
    /// Original node indices folded into each level node.
    members: Vec<Vec<usize>>,
    sizes: Vec<f64>,
}

impl Level {
    /// Root level where every node stands for itself.
    pub fn new(graph: WeightedDag<usize>, sizes: Vec<f64>) -> Self {
        let members = (0..graph.node_count()).map(|v| vec![v]).collect();
        Self::with_members(graph, members, sizes)
    }

    fn with_members(graph: WeightedDag<usize>, members: Vec<Vec<usize>>, sizes: Vec<f64>) -> Self {
        let n = members.len();
        let mut neighbours = vec![Vec::new(); n];
        for tail in graph.nodes() {
            for head in graph.children_of(&tail) {
                if tail == head || tail >= n || head >= n {
                    continue;
                }
                let weight = graph.edge_weight(&tail, &head).unwrap_or(0.0);
                neighbours[tail].push((head, weight));
                neighbours[head].push((tail, weight));
            }
        }
        Self {
            graph,
            neighbours,
            members,
            sizes,
        }
    }

    /// Number of level nodes.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the level has no nodes.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Aggregated graph of this level.
    pub fn graph(&self) -> &WeightedDag<usize> {
        &self.graph
    }

    /// Undirected neighbours of a level node with edge weights.
    pub fn neighbours(&self, node: usize) -> &[(usize, f64)] {
        self.neighbours.get(node).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total size of the original nodes folded into a level node.
    pub fn size(&self, node: usize) -> f64 {
        self.sizes.get(node).copied().unwrap_or(0.0)
    }

    /// Original nodes folded into a level node.
    pub fn members(&self, node: usize) -> &[usize] {
        self.members.get(node).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Partition of one level's nodes together with its quality bookkeeping.
pub struct PottsPartition {
    level: Rc<Level>,
    partition: SubPartition<usize>,
    node_weight: Vec<f64>,
    parent_node_weight: Vec<f64>,
    parts: HashMap<PartId, PottsData>,
    parent_sizes: HashMap<PartId, f64>,
    resolution: f64,
}

impl PottsPartition {
    /// Partition of `level` by `groups` under one global superpart.
    pub fn root(level: Level, groups: Vec<Vec<usize>>, resolution: f64) -> DagResult<Self> {
        let everything: Vec<usize> = (0..level.len()).collect();
        let parent = Partition::new(std::iter::once(everything));
        let partition = SubPartition::with_parent(groups, parent)
            .map_err(|_| DagError::UnmatchedPartition)?;
        Ok(Self::assemble(Rc::new(level), partition, resolution))
    }

    /// Compute every aggregate of `partition` from scratch.
    fn assemble(level: Rc<Level>, partition: SubPartition<usize>, resolution: f64) -> Self {
        let n = level.len();
        let mut node_weight = vec![0.0; n];
        let mut parent_node_weight = vec![0.0; n];
        for v in 0..n {
            let own = partition.partition().part_of(&v);
            let superpart = partition.superpart_of(&v);
            for &(u, w) in level.neighbours(v) {
                if partition.partition().part_of(&u) == own {
                    node_weight[v] += w;
                }
                if partition.superpart_of(&u) == superpart {
                    parent_node_weight[v] += w;
                }
            }
        }

        let mut parts: HashMap<PartId, PottsData> = HashMap::new();
        for (part, members) in partition.partition().parts() {
            let data = parts.entry(part).or_default();
            for &v in members {
                data.size += level.size(v);
                data.weight += parent_node_weight[v] - node_weight[v];
            }
        }

        let mut parent_sizes: HashMap<PartId, f64> = HashMap::new();
        for (superpart, members) in partition.parent().parts() {
            parent_sizes.insert(superpart, members.iter().map(|&v| level.size(v)).sum());
        }

        Self {
            level,
            partition,
            node_weight,
            parent_node_weight,
            parts,
            parent_sizes,
            resolution,
        }
    }

    /// Level this partitioning runs on.
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Current parts, nested in the parent partition.
    pub fn partition(&self) -> &SubPartition<usize> {
        &self.partition
    }

    /// Resolution parameter of the quality model.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Number of level nodes.
    pub fn node_count(&self) -> usize {
        self.level.len()
    }

    /// Number of non-empty parts.
    pub fn part_count(&self) -> usize {
        self.partition.partition().part_count()
    }

    /// Part holding a level node.
    pub fn part_of(&self, node: usize) -> Option<PartId> {
        self.partition.partition().part_of(&node)
    }

    /// Ids of the non-empty parts.
    pub fn part_ids(&self) -> Vec<PartId> {
        self.partition.partition().part_ids()
    }

    /// Size and weight of a part.
    pub fn data(&self, part: PartId) -> Option<PottsData> {
        self.parts.get(&part).copied()
    }

    /// Edge weight between `node` and the current members of `part`.
    fn weight_to(&self, node: usize, part: PartId) -> f64 {
        self.level
            .neighbours(node)
            .iter()
            .filter(|(u, _)| self.part_of(*u) == Some(part))
            .map(|(_, w)| w)
            .sum()
    }

    /// Move a node, keeping every aggregate current.
    pub fn move_node(&mut self, node: usize, destination: Destination) -> bool {
        let Some(&in_base) = self.node_weight.get(node) else {
            return false;
        };
        let in_dest = match destination {
            Destination::Part(part) => self.weight_to(node, part),
            Destination::Fresh => 0.0,
        };
        let Some(relocation) = self.partition.relocate(&node, destination) else {
            return false;
        };

        let level = Rc::clone(&self.level);
        for &(u, w) in level.neighbours(node) {
            match self.part_of(u) {
                Some(p) if p == relocation.from => self.node_weight[u] -= w,
                Some(p) if p == relocation.to => self.node_weight[u] += w,
                _ => {}
            }
        }

        let size = level.size(node);
        let outward = self.parent_node_weight[node];
        if relocation.emptied {
            self.parts.remove(&relocation.from);
        } else if let Some(base) = self.parts.get_mut(&relocation.from) {
            base.size -= size;
            base.weight += 2.0 * in_base - outward;
        }
        let dest = self.parts.entry(relocation.to).or_default();
        dest.size += size;
        dest.weight += outward - 2.0 * in_dest;

        self.node_weight[node] = in_dest;
        true
    }

    /// Singleton refinement nested under this partition.
    pub fn sub(&self) -> Self {
        let parent = self.partition.partition().clone();
        let partition = SubPartition::singleton(parent);
        Self::assemble(Rc::clone(&self.level), partition, self.resolution)
    }

    /// Collapse every part into a single node of a new level.
    ///
    /// Intra-part edges vanish and parallel inter-part edges are summed. The
    /// new partition groups the collapsed parts by their superpart. Fails
    /// with [`DagError::NonIsomorphicPartitions`] if a part has no data.
    pub fn aggregated(&self) -> DagResult<Self> {
        let own = self.partition.partition();
        let ids = own.part_ids();
        let index: HashMap<PartId, usize> = ids.iter().enumerate().map(|(i, &p)| (p, i)).collect();

        let mut members = Vec::with_capacity(ids.len());
        let mut sizes = Vec::with_capacity(ids.len());
        for &part in &ids {
            let folded: Vec<usize> = own
                .members(part)
                .iter()
                .flat_map(|&v| self.level.members(v).iter().copied())
                .collect();
            members.push(folded);
            let data = self
                .parts
                .get(&part)
                .ok_or(DagError::NonIsomorphicPartitions)?;
            sizes.push(data.size);
        }

        let graph = self.level.graph();
        let mut summed: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for tail in graph.nodes() {
            let Some(a) = own.part_of(&tail).and_then(|p| index.get(&p)) else {
                continue;
            };
            for head in graph.children_of(&tail) {
                let Some(b) = own.part_of(&head).and_then(|p| index.get(&p)) else {
                    continue;
                };
                if a != b {
                    *summed.entry((*a, *b)).or_insert(0.0) += graph.edge_weight(&tail, &head).unwrap_or(0.0);
                }
            }
        }

        let mut aggregated = WeightedDag::new();
        for node in 0..ids.len() {
            aggregated.add(node);
        }
        for ((a, b), weight) in summed {
            aggregated.connect(a, b, weight)?;
        }

        let groups: Vec<Vec<usize>> = self
            .partition
            .parent()
            .part_ids()
            .into_iter()
            .map(|superpart| {
                self.partition
                    .subparts(superpart)
                    .iter()
                    .filter_map(|p| index.get(p).copied())
                    .collect()
            })
            .collect();

        Self::root(Level::with_members(aggregated, members, sizes), groups, self.resolution)
    }

    /// Current parts expanded to original node indices.
    pub fn groups(&self) -> Vec<Vec<usize>> {
        self.partition
            .partition()
            .parts()
            .map(|(_, nodes)| {
                nodes
                    .iter()
                    .flat_map(|&v| self.level.members(v).iter().copied())
                    .collect()
            })
            .collect()
    }
}

impl QualityModel for PottsPartition {
    fn diff(&self, node: usize, destination: Destination) -> f64 {
        let Some(base) = self.part_of(node) else {
            return 0.0;
        };
        let (in_dest, dest_size) = match destination {
            Destination::Part(part) if part == base => return 0.0,
            Destination::Part(part) => match self.parts.get(&part) {
                Some(data) => (self.weight_to(node, part), data.size),
                None => return 0.0,
            },
            Destination::Fresh => (0.0, 0.0),
        };
        let size = self.level.size(node);
        let base_size = self.parts.get(&base).map_or(size, |d| d.size);
        let in_base = self.node_weight.get(node).copied().unwrap_or(0.0);
        // Aggregated nodes pay for every original node they fold in
        in_dest - in_base - self.resolution * size * (dest_size - base_size + size)
    }

    fn connected(&self, item: Item) -> bool {
        match item {
            Item::Node(node) => {
                let Some(part) = self.part_of(node).and_then(|p| self.parts.get(&p)) else {
                    return false;
                };
                let size = self.level.size(node);
                let weight = self.node_weight.get(node).copied().unwrap_or(0.0);
                weight >= self.resolution * size * (part.size - size)
            }
            Item::Part(part) => {
                let Some(data) = self.parts.get(&part) else {
                    return false;
                };
                let Some(parent_size) = self
                    .partition
                    .superpart_of_part(part)
                    .and_then(|s| self.parent_sizes.get(&s))
                else {
                    return false;
                };
                data.weight >= self.resolution * data.size * (parent_size - data.size)
            }
        }
    }
}
