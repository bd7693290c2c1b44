//! Core DAG structure: node arena, adjacency sets and cached metrics.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::rc::Rc;

use serde::Serialize;

use crate::types::{DagError, DagOptions, DagResult};

use super::handle::{EdgeMut, EdgeRef, NodeMut, NodeRef};
use super::traversal::{BreadthFirst, BreadthFirstOptions, DepthFirst, DepthFirstOptions, InjectOn};
use super::view::GraphView;

/// Stable internal key of a node inside the arena.
type NodeKey = usize;

/// Which adjacency set plays the role of "children".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Forward,
    Reversed,
}

impl Orientation {
    fn flip(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Reversed,
            Orientation::Reversed => Orientation::Forward,
        }
    }
}

#[derive(Clone)]
struct Slot<N> {
    node: N,
    parents: BTreeSet<NodeKey>,
    children: BTreeSet<NodeKey>,
}

/// Shared storage. Edge payloads are always keyed in forward orientation.
#[derive(Clone)]
struct Store<N, E> {
    keys: HashMap<N, NodeKey>,
    slots: Vec<Option<Slot<N>>>,
    /// Vacant slots, reused by `insert`.
    free: Vec<NodeKey>,
    edges: HashMap<(NodeKey, NodeKey), E>,
    /// Bumped by every topology mutation.
    generation: u64,
}

impl<N: Clone + Eq + Hash, E> Store<N, E> {
    fn new() -> Self {
        Self {
            keys: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            edges: HashMap::new(),
            generation: 0,
        }
    }

    fn key(&self, node: &N) -> Option<NodeKey> {
        self.keys.get(node).copied()
    }

    fn slot(&self, key: NodeKey) -> Option<&Slot<N>> {
        self.slots.get(key).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, key: NodeKey) -> Option<&mut Slot<N>> {
        self.slots.get_mut(key).and_then(Option::as_mut)
    }

    fn resolve(&self, keys: &BTreeSet<NodeKey>) -> Vec<N> {
        keys.iter()
            .filter_map(|&k| self.slot(k).map(|s| s.node.clone()))
            .collect()
    }

    /// Insert a node if absent, returning its key and whether it was new.
    fn insert(&mut self, node: N) -> (NodeKey, bool) {
        if let Some(key) = self.key(&node) {
            return (key, false);
        }
        let slot = Slot {
            node: node.clone(),
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
        };
        let key = match self.free.pop() {
            Some(key) => {
                self.slots[key] = Some(slot);
                key
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        self.keys.insert(node, key);
        self.generation += 1;
        (key, true)
    }

    fn link(&mut self, tail: NodeKey, head: NodeKey, data: E) -> bool {
        if self.edges.contains_key(&(tail, head)) {
            return false;
        }
        if let Some(slot) = self.slot_mut(tail) {
            slot.children.insert(head);
        }
        if let Some(slot) = self.slot_mut(head) {
            slot.parents.insert(tail);
        }
        self.edges.insert((tail, head), data);
        self.generation += 1;
        true
    }

    fn unlink(&mut self, tail: NodeKey, head: NodeKey) -> Option<E> {
        let data = self.edges.remove(&(tail, head))?;
        if let Some(slot) = self.slot_mut(tail) {
            slot.children.remove(&head);
        }
        if let Some(slot) = self.slot_mut(head) {
            slot.parents.remove(&tail);
        }
        self.generation += 1;
        Some(data)
    }

    fn remove(&mut self, node: &N) -> bool {
        let Some(key) = self.keys.remove(node) else {
            return false;
        };
        let Some(slot) = self.slots.get_mut(key).and_then(Option::take) else {
            return false;
        };
        for parent in slot.parents {
            self.edges.remove(&(parent, key));
            if let Some(p) = self.slot_mut(parent) {
                p.children.remove(&key);
            }
        }
        for child in slot.children {
            self.edges.remove(&(key, child));
            if let Some(c) = self.slot_mut(child) {
                c.parents.remove(&key);
            }
        }
        self.free.push(key);
        self.generation += 1;
        true
    }

    fn clear(&mut self) {
        self.keys.clear();
        self.slots.clear();
        self.free.clear();
        self.edges.clear();
        self.generation += 1;
    }
}

/// Memoized metrics, valid for one storage generation.
struct Cache<N> {
    generation: Option<u64>,
    sorted: Option<Vec<N>>,
    depth: Option<usize>,
    width: Option<usize>,
}

impl<N> Default for Cache<N> {
    fn default() -> Self {
        Self {
            generation: None,
            sorted: None,
            depth: None,
            width: None,
        }
    }
}

/// Size summary of a DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DagSize {
    /// Number of nodes.
    pub nodes: usize,
    /// Number of edges.
    pub edges: usize,
    /// Length of the longest path, in edges.
    pub depth: usize,
    /// Heuristic antichain width.
    pub width: usize,
}

/// A mutable directed acyclic graph with optional edge payloads.
///
/// Nodes are arbitrary hashable values. Cloning performs a deep copy, while
/// [`Dag::reversed`] returns an alias sharing the same storage.
pub struct Dag<N, E = ()> {
    store: Rc<RefCell<Store<N, E>>>,
    orientation: Orientation,
    options: DagOptions,
    cache: RefCell<Cache<N>>,
}

impl<N: Clone + Eq + Hash, E: Clone> Clone for Dag<N, E> {
    fn clone(&self) -> Self {
        let store = self.store.borrow().clone();
        Self {
            store: Rc::new(RefCell::new(store)),
            orientation: self.orientation,
            options: self.options,
            cache: RefCell::new(Cache::default()),
        }
    }
}

impl<N: Clone + Eq + Hash, E: Clone> Default for Dag<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Clone + Eq + Hash, E: Clone> Dag<N, E> {
    /// Create an empty DAG with default (unsafe) options.
    pub fn new() -> Self {
        Self::with_options(DagOptions::default())
    }

    /// Create an empty DAG with the given options.
    pub fn with_options(options: DagOptions) -> Self {
        Self {
            store: Rc::new(RefCell::new(Store::new())),
            orientation: Orientation::Forward,
            options,
            cache: RefCell::new(Cache::default()),
        }
    }

    /// Deep copy of any graph view, payloads included.
    pub fn from_view<G>(source: &G, options: DagOptions) -> Self
    where
        G: GraphView<N, Edge = E> + ?Sized,
        E: Default,
    {
        let dag = Self::with_options(options);
        {
            let mut store = dag.store.borrow_mut();
            for node in source.nodes() {
                store.insert(node);
            }
            for tail in source.nodes() {
                for head in source.children_of(&tail) {
                    let data = source.edge_data(&tail, &head).unwrap_or_default();
                    let (t, _) = store.insert(tail.clone());
                    let (h, _) = store.insert(head);
                    store.link(t, h, data);
                }
            }
        }
        dag
    }

    /// Options this graph was built with.
    pub fn options(&self) -> DagOptions {
        self.options
    }

    /// An alias of this graph with every edge reversed.
    ///
    /// The alias shares storage: mutations through either graph are visible
    /// in both. Clone first for an independent reversed copy.
    pub fn reversed(&self) -> Self {
        Self {
            store: Rc::clone(&self.store),
            orientation: self.orientation.flip(),
            options: self.options,
            cache: RefCell::new(Cache::default()),
        }
    }

    /// Map a view-oriented edge to its storage orientation.
    fn stored<'a>(&self, tail: &'a N, head: &'a N) -> (&'a N, &'a N) {
        match self.orientation {
            Orientation::Forward => (tail, head),
            Orientation::Reversed => (head, tail),
        }
    }

    // ==================== Queries ====================

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.store.borrow().keys.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.store.borrow().edges.len()
    }

    /// Number of allocated node slots, live or vacant.
    pub fn capacity(&self) -> usize {
        self.store.borrow().slots.len()
    }

    /// All nodes in slot order. This is insertion order until a delete
    /// frees a slot for reuse.
    pub fn nodes(&self) -> Vec<N> {
        let store = self.store.borrow();
        store
            .slots
            .iter()
            .flatten()
            .map(|slot| slot.node.clone())
            .collect()
    }

    /// All edges as `(tail, head)` pairs.
    pub fn edges(&self) -> Vec<(N, N)> {
        let store = self.store.borrow();
        let mut edges = Vec::with_capacity(store.edges.len());
        for slot in store.slots.iter().flatten() {
            for child in store.resolve(&slot.children) {
                edges.push(match self.orientation {
                    Orientation::Forward => (slot.node.clone(), child),
                    Orientation::Reversed => (child, slot.node.clone()),
                });
            }
        }
        edges
    }

    /// Whether the node exists.
    pub fn contains(&self, node: &N) -> bool {
        self.store.borrow().keys.contains_key(node)
    }

    /// Whether the edge `tail -> head` exists.
    pub fn has_edge(&self, tail: &N, head: &N) -> bool {
        let (tail, head) = self.stored(tail, head);
        let store = self.store.borrow();
        match (store.key(tail), store.key(head)) {
            (Some(t), Some(h)) => store.edges.contains_key(&(t, h)),
            _ => false,
        }
    }

    /// Direct parents of a node. Empty if the node is unknown.
    pub fn parents_of(&self, node: &N) -> Vec<N> {
        let store = self.store.borrow();
        let Some(slot) = store.key(node).and_then(|k| store.slot(k)) else {
            return Vec::new();
        };
        match self.orientation {
            Orientation::Forward => store.resolve(&slot.parents),
            Orientation::Reversed => store.resolve(&slot.children),
        }
    }

    /// Direct children of a node. Empty if the node is unknown.
    pub fn children_of(&self, node: &N) -> Vec<N> {
        let store = self.store.borrow();
        let Some(slot) = store.key(node).and_then(|k| store.slot(k)) else {
            return Vec::new();
        };
        match self.orientation {
            Orientation::Forward => store.resolve(&slot.children),
            Orientation::Reversed => store.resolve(&slot.parents),
        }
    }

    /// Payload of the edge `tail -> head`.
    pub fn edge_data(&self, tail: &N, head: &N) -> Option<E> {
        let (tail, head) = self.stored(tail, head);
        let store = self.store.borrow();
        let key = (store.key(tail)?, store.key(head)?);
        store.edges.get(&key).cloned()
    }

    /// Whether `head` is reachable from `tail` within `max_length` edges.
    ///
    /// A node always reaches itself.
    pub fn has_path_between(&self, tail: &N, head: &N, max_length: Option<usize>) -> bool {
        if tail == head {
            return true;
        }
        if !self.contains(tail) || !self.contains(head) {
            return false;
        }
        let options = BreadthFirstOptions {
            depth: max_length,
            ..Default::default()
        };
        BreadthFirst::new(self, tail.clone(), options).any(|(node, _)| &node == head)
    }

    /// Nodes from which `node` is reachable within `max_depth` edges.
    pub fn ancestors_of(&self, node: &N, max_depth: Option<usize>) -> HashSet<N> {
        self.reversed().descendants_of(node, max_depth)
    }

    /// Nodes reachable from `node` within `max_depth` edges.
    pub fn descendants_of(&self, node: &N, max_depth: Option<usize>) -> HashSet<N> {
        if !self.contains(node) {
            return HashSet::new();
        }
        let options = BreadthFirstOptions {
            depth: max_depth,
            ..Default::default()
        };
        BreadthFirst::new(self, node.clone(), options)
            .filter(|(_, depth)| *depth > 0)
            .map(|(n, _)| n)
            .collect()
    }

    // ==================== Mutation ====================

    /// Add a node. Returns false if it was already present.
    pub fn add(&mut self, node: N) -> bool {
        self.store.borrow_mut().insert(node).1
    }

    /// Remove a node and all incident edges. Returns false if unknown.
    pub fn delete(&mut self, node: &N) -> bool {
        self.store.borrow_mut().remove(node)
    }

    /// Connect `tail -> head` with a default payload.
    pub fn connect(&mut self, tail: N, head: N) -> DagResult<bool>
    where
        E: Default,
    {
        self.connect_with(tail, head, E::default())
    }

    /// Connect `tail -> head` carrying `data`, adding missing endpoints.
    ///
    /// Returns `Ok(false)` if the edge already exists. Under the safe
    /// strategy an edge closing a cycle is rejected without mutation.
    pub fn connect_with(&mut self, tail: N, head: N, data: E) -> DagResult<bool> {
        if self.has_edge(&tail, &head) {
            return Ok(false);
        }
        if self.options.is_safe() && self.has_path_between(&head, &tail, None) {
            log::debug!("Rejected edge closing a cycle");
            return Err(DagError::CycleProhibited(
                "edge would close a cycle".to_string(),
            ));
        }
        let (tail, head) = match self.orientation {
            Orientation::Forward => (tail, head),
            Orientation::Reversed => (head, tail),
        };
        let mut store = self.store.borrow_mut();
        let (t, _) = store.insert(tail);
        let (h, _) = store.insert(head);
        Ok(store.link(t, h, data))
    }

    /// Remove the edge `tail -> head`. Returns false if it did not exist.
    pub fn disconnect(&mut self, tail: &N, head: &N) -> bool {
        self.take_edge(tail, head).is_some()
    }

    /// Remove the edge `tail -> head`, returning its payload.
    pub fn take_edge(&mut self, tail: &N, head: &N) -> Option<E> {
        let (tail, head) = self.stored(tail, head);
        let mut store = self.store.borrow_mut();
        let (t, h) = (store.key(tail)?, store.key(head)?);
        store.unlink(t, h)
    }

    /// Replace the payload of an existing edge. Returns false if it does not exist.
    pub fn set_edge_data(&mut self, tail: &N, head: &N, data: E) -> bool {
        let (tail, head) = self.stored(tail, head);
        let mut store = self.store.borrow_mut();
        let (Some(t), Some(h)) = (store.key(tail), store.key(head)) else {
            return false;
        };
        match store.edges.get_mut(&(t, h)) {
            Some(slot) => {
                *slot = data;
                true
            }
            None => false,
        }
    }

    /// Remove every node and edge.
    pub fn clear(&mut self) {
        self.store.borrow_mut().clear();
    }

    // ==================== Handles ====================

    /// Read-only handle to a node.
    pub fn node(&self, node: &N) -> Option<NodeRef<'_, N, E>> {
        self.contains(node).then(|| NodeRef::new(self, node.clone()))
    }

    /// Mutable handle to a node.
    pub fn node_mut(&mut self, node: &N) -> Option<NodeMut<'_, N, E>> {
        if self.contains(node) {
            Some(NodeMut::new(self, node.clone()))
        } else {
            None
        }
    }

    /// Read-only handle to an edge.
    pub fn edge(&self, tail: &N, head: &N) -> Option<EdgeRef<'_, N, E>> {
        self.has_edge(tail, head)
            .then(|| EdgeRef::new(self, tail.clone(), head.clone()))
    }

    /// Mutable handle to an edge.
    pub fn edge_mut(&mut self, tail: &N, head: &N) -> Option<EdgeMut<'_, N, E>> {
        if self.has_edge(tail, head) {
            Some(EdgeMut::new(self, tail.clone(), head.clone()))
        } else {
            None
        }
    }

    // ==================== Cached metrics ====================

    fn sync_cache(&self) {
        let generation = self.store.borrow().generation;
        let mut cache = self.cache.borrow_mut();
        if cache.generation != Some(generation) {
            *cache = Cache {
                generation: Some(generation),
                ..Cache::default()
            };
        }
    }

    /// Nodes in topological order.
    ///
    /// Computed lazily and cached until the next mutation.
    pub fn sorted(&self) -> Vec<N> {
        self.sync_cache();
        if let Some(sorted) = &self.cache.borrow().sorted {
            return sorted.clone();
        }
        let sorted = self.topological_order();
        self.cache.borrow_mut().sorted = Some(sorted.clone());
        sorted
    }

    /// Iterate nodes in topological order.
    pub fn iter(&self) -> std::vec::IntoIter<N> {
        self.sorted().into_iter()
    }

    fn topological_order(&self) -> Vec<N> {
        let nodes = self.nodes();
        let options = DepthFirstOptions {
            inject_on: InjectOn::Leave,
            ..Default::default()
        };
        let mut postorder = Vec::with_capacity(nodes.len());
        for step in DepthFirst::forest(self, nodes.clone(), options) {
            match step {
                Ok((node, _)) => postorder.push(node),
                Err(err) => {
                    log::warn!("Topological order is partial: {}", err);
                    break;
                }
            }
        }
        postorder.reverse();
        if postorder.len() < nodes.len() {
            let seen: HashSet<N> = postorder.iter().cloned().collect();
            postorder.extend(nodes.into_iter().filter(|n| !seen.contains(n)));
        }
        postorder
    }

    /// Length of the longest path, in edges.
    pub fn depth(&self) -> usize {
        self.sync_cache();
        if let Some(depth) = self.cache.borrow().depth {
            return depth;
        }
        let mut depths: HashMap<N, usize> = HashMap::new();
        let mut depth = 0;
        for node in self.sorted().into_iter().rev() {
            let own = self
                .children_of(&node)
                .iter()
                .map(|child| depths.get(child).map_or(1, |d| d + 1))
                .max()
                .unwrap_or(0);
            depth = depth.max(own);
            depths.insert(node, own);
        }
        self.cache.borrow_mut().depth = Some(depth);
        depth
    }

    /// Heuristic antichain width.
    ///
    /// Repeatedly removes the remaining node of lowest non-zero degree along
    /// with its ancestors and descendants, counting one per round. Isolated
    /// nodes count one each. Not guaranteed to be the maximum antichain.
    pub fn width(&self) -> usize {
        self.sync_cache();
        if let Some(width) = self.cache.borrow().width {
            return width;
        }
        let nodes = self.nodes();
        let degree = |n: &N| self.parents_of(n).len() + self.children_of(n).len();
        let mut width = nodes.iter().filter(|n| degree(*n) == 0).count();
        let mut remaining: Vec<N> = nodes.into_iter().filter(|n| degree(n) > 0).collect();
        while let Some(pick) = remaining.iter().min_by_key(|n| degree(*n)).cloned() {
            let mut removed = self.descendants_of(&pick, None);
            removed.extend(self.ancestors_of(&pick, None));
            removed.insert(pick);
            remaining.retain(|n| !removed.contains(n));
            width += 1;
        }
        self.cache.borrow_mut().width = Some(width);
        width
    }

    /// Node, edge, depth and width summary.
    pub fn size(&self) -> DagSize {
        DagSize {
            nodes: self.node_count(),
            edges: self.edge_count(),
            depth: self.depth(),
            width: self.width(),
        }
    }
}

impl<N: Clone + Eq + Hash, E: Clone> GraphView<N> for Dag<N, E> {
    type Edge = E;

    fn nodes(&self) -> Vec<N> {
        Dag::nodes(self)
    }

    fn contains(&self, node: &N) -> bool {
        Dag::contains(self, node)
    }

    fn has_edge(&self, tail: &N, head: &N) -> bool {
        Dag::has_edge(self, tail, head)
    }

    fn parents_of(&self, node: &N) -> Vec<N> {
        Dag::parents_of(self, node)
    }

    fn children_of(&self, node: &N) -> Vec<N> {
        Dag::children_of(self, node)
    }

    fn edge_data(&self, tail: &N, head: &N) -> Option<E> {
        Dag::edge_data(self, tail, head)
    }

    fn node_count(&self) -> usize {
        Dag::node_count(self)
    }
}

impl<'a, N: Clone + Eq + Hash, E: Clone> IntoIterator for &'a Dag<N, E> {
    type Item = N;
    type IntoIter = std::vec::IntoIter<N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
