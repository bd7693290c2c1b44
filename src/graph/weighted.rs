//! DAG with incrementally maintained edge-weight aggregates.

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

use crate::types::{DagOptions, DagResult};

use super::dag::Dag;
use super::view::GraphView;

/// Strategy assigning a weight to the edge `tail -> head`.
pub trait EdgeWeight<N> {
    /// Weight of the edge `tail -> head`.
    fn weight(&self, tail: &N, head: &N) -> f64;
}

impl<N, F> EdgeWeight<N> for F
where
    F: Fn(&N, &N) -> f64,
{
    fn weight(&self, tail: &N, head: &N) -> f64 {
        self(tail, head)
    }
}

/// Every edge weighs 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitWeight;

impl<N> EdgeWeight<N> for UnitWeight {
    fn weight(&self, _tail: &N, _head: &N) -> f64 {
        1.0
    }
}

/// Size summary of a weighted DAG.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedSize {
    /// Number of nodes.
    pub nodes: usize,
    /// Number of edges.
    pub edges: usize,
    /// Sum of all edge weights.
    pub total_weight: f64,
}

/// A DAG whose edges carry `f64` weights.
///
/// Per-node weight is the sum of incident edge weights. Node and total
/// weights are updated on every mutation and never recomputed.
pub struct WeightedDag<N> {
    dag: Dag<N, f64>,
    weights: HashMap<N, f64>,
    total: f64,
}

impl<N: Clone + Eq + Hash> Clone for WeightedDag<N> {
    fn clone(&self) -> Self {
        Self {
            dag: self.dag.clone(),
            weights: self.weights.clone(),
            total: self.total,
        }
    }
}

impl<N: Clone + Eq + Hash> Default for WeightedDag<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Clone + Eq + Hash> WeightedDag<N> {
    /// Empty weighted DAG with default options.
    pub fn new() -> Self {
        Self::with_options(DagOptions::default())
    }

    /// Empty weighted DAG with the given options.
    pub fn with_options(options: DagOptions) -> Self {
        Self {
            dag: Dag::with_options(options),
            weights: HashMap::new(),
            total: 0.0,
        }
    }

    /// Copy the topology of `graph`, weighting each edge with `weight`.
    pub fn weigh<G, W>(graph: &G, weight: &W, options: DagOptions) -> DagResult<Self>
    where
        G: GraphView<N> + ?Sized,
        W: EdgeWeight<N> + ?Sized,
    {
        let mut weighted = Self::with_options(options);
        for node in graph.nodes() {
            weighted.add(node);
        }
        for tail in graph.nodes() {
            for head in graph.children_of(&tail) {
                let w = weight.weight(&tail, &head);
                weighted.connect(tail.clone(), head, w)?;
            }
        }
        Ok(weighted)
    }

    /// The underlying DAG, edge payloads being weights.
    pub fn dag(&self) -> &Dag<N, f64> {
        &self.dag
    }

    /// Add a node with zero weight. Returns false if it already exists.
    pub fn add(&mut self, node: N) -> bool {
        if !self.dag.add(node.clone()) {
            return false;
        }
        self.weights.insert(node, 0.0);
        true
    }

    /// Remove a node. Each neighbour loses the weight of the shared edge.
    pub fn delete(&mut self, node: &N) -> bool {
        if !self.dag.contains(node) {
            return false;
        }
        for parent in self.dag.parents_of(node) {
            self.disconnect(&parent, node);
        }
        for child in self.dag.children_of(node) {
            self.disconnect(node, &child);
        }
        self.weights.remove(node);
        self.dag.delete(node)
    }

    /// Connect `tail -> head` with the given weight, adding missing endpoints.
    pub fn connect(&mut self, tail: N, head: N, weight: f64) -> DagResult<bool> {
        if !self.dag.connect_with(tail.clone(), head.clone(), weight)? {
            return Ok(false);
        }
        *self.weights.entry(tail).or_insert(0.0) += weight;
        *self.weights.entry(head).or_insert(0.0) += weight;
        self.total += weight;
        Ok(true)
    }

    /// Remove `tail -> head`, subtracting its weight from both endpoints.
    pub fn disconnect(&mut self, tail: &N, head: &N) -> bool {
        let Some(weight) = self.dag.take_edge(tail, head) else {
            return false;
        };
        if let Some(w) = self.weights.get_mut(tail) {
            *w -= weight;
        }
        if let Some(w) = self.weights.get_mut(head) {
            *w -= weight;
        }
        self.total -= weight;
        true
    }

    /// Remove every node and edge.
    pub fn clear(&mut self) {
        self.dag.clear();
        self.weights.clear();
        self.total = 0.0;
    }

    /// Sum of incident edge weights. Zero for unknown nodes.
    pub fn weight_of(&self, node: &N) -> f64 {
        self.weights.get(node).copied().unwrap_or(0.0)
    }

    /// Weight of `tail -> head`, if the edge exists.
    pub fn edge_weight(&self, tail: &N, head: &N) -> Option<f64> {
        self.dag.edge_data(tail, head)
    }

    /// Sum of all edge weights.
    pub fn total_weight(&self) -> f64 {
        self.total
    }

    /// All nodes.
    pub fn nodes(&self) -> Vec<N> {
        self.dag.nodes()
    }

    /// Whether the node exists.
    pub fn contains(&self, node: &N) -> bool {
        self.dag.contains(node)
    }

    /// Whether `tail -> head` exists.
    pub fn has_edge(&self, tail: &N, head: &N) -> bool {
        self.dag.has_edge(tail, head)
    }

    /// Direct predecessors of a node.
    pub fn parents_of(&self, node: &N) -> Vec<N> {
        self.dag.parents_of(node)
    }

    /// Direct successors of a node.
    pub fn children_of(&self, node: &N) -> Vec<N> {
        self.dag.children_of(node)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.dag.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.dag.edge_count()
    }

    /// Node count, edge count and total weight.
    pub fn size(&self) -> WeightedSize {
        WeightedSize {
            nodes: self.dag.node_count(),
            edges: self.dag.edge_count(),
            total_weight: self.total,
        }
    }
}

impl<N: Clone + Eq + Hash> GraphView<N> for WeightedDag<N> {
    type Edge = f64;

    fn nodes(&self) -> Vec<N> {
        self.dag.nodes()
    }

    fn contains(&self, node: &N) -> bool {
        self.dag.contains(node)
    }

    fn has_edge(&self, tail: &N, head: &N) -> bool {
        self.dag.has_edge(tail, head)
    }

    fn parents_of(&self, node: &N) -> Vec<N> {
        self.dag.parents_of(node)
    }

    fn children_of(&self, node: &N) -> Vec<N> {
        self.dag.children_of(node)
    }

    fn edge_data(&self, tail: &N, head: &N) -> Option<f64> {
        self.dag.edge_data(tail, head)
    }

    fn node_count(&self) -> usize {
        self.dag.node_count()
    }
}
