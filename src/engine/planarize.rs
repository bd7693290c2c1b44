//! Crossing reduction for layered drawings of a DAG.
//!
//! Positions inside each layer are relaxed for a bounded number of rounds.
//! Every round blends three forces per node: its previous position (base),
//! the mean position of its parents in lower layers (wind) and the mean
//! position of its children in higher layers (gravity). Layers are then
//! re-ranked, and the loop stops early once no rank changes.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::graph::{Dag, GraphView, OrderedMultipartite};
use crate::types::{DEFAULT_FORCE_WEIGHT, MAX_PLANARIZATION_ROUNDS};

/// Force weights of the planarizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanarizationParams {
    /// Weight of the previous position.
    pub base: f64,
    /// Weight of the pull towards parents.
    pub wind: f64,
    /// Weight of the pull towards children.
    pub gravity: f64,
    /// Let stable nodes keep half their position against gravity.
    pub use_stable: bool,
}

impl Default for PlanarizationParams {
    fn default() -> Self {
        Self {
            base: DEFAULT_FORCE_WEIGHT,
            wind: DEFAULT_FORCE_WEIGHT,
            gravity: DEFAULT_FORCE_WEIGHT,
            use_stable: true,
        }
    }
}

/// Result of a planarization run.
#[derive(Debug, Clone)]
pub struct Planarization<N> {
    /// Rank of every layered node within its layer.
    pub positions: HashMap<N, f64>,
    /// Relaxation rounds performed.
    pub rounds: usize,
    /// Whether the last round left every rank unchanged.
    pub converged: bool,
}

impl<N: Clone + Eq + Hash> Planarization<N> {
    /// Rank of a node within its layer.
    pub fn position_of(&self, node: &N) -> Option<f64> {
        self.positions.get(node).copied()
    }

    /// Consume the result, keeping only the ranks.
    pub fn into_positions(self) -> HashMap<N, f64> {
        self.positions
    }

    /// Layers of `multipartite` with nodes sorted by position.
    pub fn layers(&self, multipartite: &OrderedMultipartite<N>) -> Vec<(i64, Vec<N>)> {
        multipartite
            .layers()
            .map(|(order, nodes)| {
                let mut nodes = nodes.to_vec();
                nodes.sort_by(|a, b| self.rank(a).total_cmp(&self.rank(b)));
                (order, nodes)
            })
            .collect()
    }

    /// Reorder every layer of `multipartite` by position.
    pub fn apply(&self, multipartite: &mut OrderedMultipartite<N>) {
        let orders: Vec<i64> = multipartite.layers().map(|(order, _)| order).collect();
        for order in orders {
            multipartite.sort_layer_by(order, |a, b| self.rank(a).total_cmp(&self.rank(b)));
        }
    }

    /// Edge crossings of `dag` drawn with these positions.
    pub fn crossings<E: Clone>(&self, multipartite: &OrderedMultipartite<N>, dag: &Dag<N, E>) -> usize {
        crossings_with(multipartite, dag, |n| self.positions.get(n).copied())
    }

    fn rank(&self, node: &N) -> f64 {
        self.positions.get(node).copied().unwrap_or(0.0)
    }
}

/// Relax in-layer positions of `multipartite` to reduce edge crossings.
pub fn planarize_directed_multipartite<N, E>(
    multipartite: &OrderedMultipartite<N>,
    dag: &Dag<N, E>,
    params: &PlanarizationParams,
) -> Planarization<N>
where
    N: Clone + Eq + Hash,
    E: Clone,
{
    let wind_offset = if params.use_stable {
        params.gravity + params.wind
    } else {
        0.0
    };
    let wind_weight = params.wind + wind_offset;

    let widest = multipartite.max_layer_size();
    let mut positions: HashMap<N, f64> = HashMap::new();
    for (_, nodes) in multipartite.layers() {
        let start = (widest - nodes.len()) as f64;
        for (offset, node) in nodes.iter().enumerate() {
            positions.insert(node.clone(), start + offset as f64);
        }
    }

    let stable = if params.use_stable {
        stable_nodes(multipartite, dag)
    } else {
        HashSet::new()
    };
    let reverted = multipartite.reverted();
    let reversed = dag.reversed();
    let nothing = HashSet::new();

    let mut rounds = 0;
    let mut converged = false;
    while rounds < MAX_PLANARIZATION_ROUNDS {
        rounds += 1;
        let previous = positions.clone();
        let wind = pull(multipartite, dag, &positions, &nothing);
        let gravity = pull(&reverted, &reversed, &positions, &stable);

        for (_, nodes) in multipartite.layers() {
            for node in nodes {
                let current = previous.get(node).copied().unwrap_or(0.0);
                let towards_parents = wind.get(node).copied().unwrap_or(0.0);
                let towards_children = gravity.get(node).copied().unwrap_or(0.0);

                let mut position = params.base * current + wind_weight * towards_parents;
                if stable.contains(node) {
                    position += params.gravity * (current + towards_children) / 2.0;
                } else {
                    position += params.gravity * towards_children;
                }
                positions.insert(node.clone(), position);
            }
        }

        let mut changed = false;
        for (_, nodes) in multipartite.layers() {
            let mut ranked = nodes.to_vec();
            ranked.sort_by(|a, b| {
                let a = positions.get(a).copied().unwrap_or(0.0);
                let b = positions.get(b).copied().unwrap_or(0.0);
                a.total_cmp(&b)
            });
            for (rank, node) in ranked.into_iter().enumerate() {
                let rank = rank as f64;
                if previous.get(&node) != Some(&rank) {
                    changed = true;
                }
                positions.insert(node, rank);
            }
        }

        log::trace!("Planarization round {}: changed = {}", rounds, changed);
        if !changed {
            converged = true;
            break;
        }
    }

    Planarization {
        positions,
        rounds,
        converged,
    }
}

/// Mean position of each node's parents in strictly lower layers, each
/// divided by its layer distance.
fn pull<N, G>(
    multipartite: &OrderedMultipartite<N>,
    graph: &G,
    base: &HashMap<N, f64>,
    ignore: &HashSet<N>,
) -> HashMap<N, f64>
where
    N: Clone + Eq + Hash,
    G: GraphView<N> + ?Sized,
{
    let mut pulled = HashMap::new();
    for (order, nodes) in multipartite.layers() {
        for node in nodes {
            if ignore.contains(node) {
                continue;
            }
            let mut sum = 0.0;
            let mut count = 0usize;
            for parent in graph.parents_of(node) {
                let Some(parent_order) = multipartite.order_of(&parent) else {
                    continue;
                };
                if order <= parent_order {
                    continue;
                }
                let distance = (order - parent_order).max(1) as f64;
                sum += base.get(&parent).copied().unwrap_or(0.0) / distance;
                count += 1;
            }
            if count > 0 {
                pulled.insert(node.clone(), sum / count as f64);
            }
        }
    }
    pulled
}

/// Parents whose every child has it as its only parent.
fn stable_nodes<N, E>(multipartite: &OrderedMultipartite<N>, dag: &Dag<N, E>) -> HashSet<N>
where
    N: Clone + Eq + Hash,
    E: Clone,
{
    let mut stable = HashSet::new();
    let mut unstable = HashSet::new();
    for (order, nodes) in multipartite.layers() {
        for node in nodes {
            let parents = dag.parents_of(node);
            if parents.len() > 1 {
                unstable.extend(parents);
                continue;
            }
            for parent in parents {
                let lower = multipartite.order_of(&parent).is_some_and(|p| p < order);
                if lower && !unstable.contains(&parent) {
                    stable.insert(parent);
                }
            }
        }
    }
    stable.retain(|n| !unstable.contains(n));
    stable
}

/// Edge crossings of `dag` drawn with the current in-layer order of
/// `multipartite`.
pub fn count_crossings<N, E>(multipartite: &OrderedMultipartite<N>, dag: &Dag<N, E>) -> usize
where
    N: Clone + Eq + Hash,
    E: Clone,
{
    let mut rank: HashMap<&N, f64> = HashMap::new();
    for (_, nodes) in multipartite.layers() {
        for (i, node) in nodes.iter().enumerate() {
            rank.insert(node, i as f64);
        }
    }
    crossings_with(multipartite, dag, |n| rank.get(n).copied())
}

fn crossings_with<N, E, F>(multipartite: &OrderedMultipartite<N>, dag: &Dag<N, E>, position: F) -> usize
where
    N: Clone + Eq + Hash,
    E: Clone,
    F: Fn(&N) -> Option<f64>,
{
    // (lower layer, upper layer, lower position, upper position)
    let mut segments: Vec<(i64, i64, f64, f64)> = Vec::new();
    for (tail, head) in dag.edges() {
        let (Some(t), Some(h)) = (multipartite.order_of(&tail), multipartite.order_of(&head)) else {
            continue;
        };
        let (Some(pt), Some(ph)) = (position(&tail), position(&head)) else {
            continue;
        };
        match t.cmp(&h) {
            std::cmp::Ordering::Less => segments.push((t, h, pt, ph)),
            std::cmp::Ordering::Greater => segments.push((h, t, ph, pt)),
            std::cmp::Ordering::Equal => {}
        }
    }

    let mut crossings = 0;
    for (i, a) in segments.iter().enumerate() {
        for b in &segments[i + 1..] {
            if a.0 == b.0 && a.1 == b.1 && (a.2 - b.2) * (a.3 - b.3) < 0.0 {
                crossings += 1;
            }
        }
    }
    crossings
}
