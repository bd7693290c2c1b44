//! Layering mask assigning graph nodes to ordered layers.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Nodes grouped into layers keyed by an integer order.
///
/// Each layer keeps its nodes in a stable sequence. Empty layers are never
/// stored.
#[derive(Debug, Clone)]
pub struct OrderedMultipartite<N> {
    order: HashMap<N, i64>,
    layers: BTreeMap<i64, Vec<N>>,
}

impl<N: Clone + Eq + Hash> Default for OrderedMultipartite<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Clone + Eq + Hash> OrderedMultipartite<N> {
    /// Empty multipartite.
    pub fn new() -> Self {
        Self {
            order: HashMap::new(),
            layers: BTreeMap::new(),
        }
    }

    /// Build from consecutive layers, the first one getting order 0.
    pub fn from_layers<L, I>(layers: L) -> Self
    where
        L: IntoIterator<Item = I>,
        I: IntoIterator<Item = N>,
    {
        let mut multipartite = Self::new();
        for (order, layer) in (0_i64..).zip(layers) {
            for node in layer {
                multipartite.set(node, order);
            }
        }
        multipartite
    }

    /// Put `node` at the end of layer `order`, moving it if already placed.
    pub fn set(&mut self, node: N, order: i64) -> &mut Self {
        match self.order_of(&node) {
            Some(current) if current == order => return self,
            Some(current) => self.detach(&node, current),
            None => {}
        }
        self.order.insert(node.clone(), order);
        self.layers.entry(order).or_default().push(node);
        self
    }

    fn detach(&mut self, node: &N, order: i64) {
        if let Some(layer) = self.layers.get_mut(&order) {
            layer.retain(|n| n != node);
            if layer.is_empty() {
                self.layers.remove(&order);
            }
        }
    }

    /// Remove a node. Returns false if it was not placed.
    pub fn delete(&mut self, node: &N) -> bool {
        match self.order.remove(node) {
            Some(order) => {
                self.detach(node, order);
                true
            }
            None => false,
        }
    }

    /// Whether the node is placed in a layer.
    pub fn contains(&self, node: &N) -> bool {
        self.order.contains_key(node)
    }

    /// Whether a layer with this order holds any node.
    pub fn has_layer(&self, order: i64) -> bool {
        self.layers.contains_key(&order)
    }

    /// Layer order of a node.
    pub fn order_of(&self, node: &N) -> Option<i64> {
        self.order.get(node).copied()
    }

    /// Nodes of one layer, in sequence. Empty for unknown layers.
    pub fn nodes_of(&self, order: i64) -> &[N] {
        self.layers.get(&order).map(Vec::as_slice).unwrap_or_default()
    }

    /// Layers in ascending order.
    pub fn layers(&self) -> impl Iterator<Item = (i64, &[N])> + '_ {
        self.layers.iter().map(|(&order, nodes)| (order, nodes.as_slice()))
    }

    /// Number of non-empty layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Number of placed nodes.
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Size of the largest layer.
    pub fn max_layer_size(&self) -> usize {
        self.layers.values().map(Vec::len).max().unwrap_or(0)
    }

    /// Remove every node and layer.
    pub fn clear(&mut self) {
        self.order.clear();
        self.layers.clear();
    }

    /// Renumber layers to `0..layer_count` keeping their relative order.
    ///
    /// Returns true if any order changed.
    pub fn normalize(&mut self) -> bool {
        let changed = self.layers.keys().zip(0_i64..).any(|(&old, new)| old != new);
        if !changed {
            return false;
        }
        let layers = std::mem::take(&mut self.layers);
        for (new, (_, nodes)) in (0_i64..).zip(layers) {
            for node in &nodes {
                self.order.insert(node.clone(), new);
            }
            self.layers.insert(new, nodes);
        }
        true
    }

    /// Copy with every order negated, so the layer sequence runs backwards.
    pub fn reverted(&self) -> Self {
        Self {
            order: self.order.iter().map(|(n, &o)| (n.clone(), -o)).collect(),
            layers: self
                .layers
                .iter()
                .map(|(&o, nodes)| (-o, nodes.clone()))
                .collect(),
        }
    }

    /// Stable-sort the nodes of one layer.
    pub fn sort_layer_by<F>(&mut self, order: i64, compare: F)
    where
        F: FnMut(&N, &N) -> Ordering,
    {
        if let Some(layer) = self.layers.get_mut(&order) {
            layer.sort_by(compare);
        }
    }
}
