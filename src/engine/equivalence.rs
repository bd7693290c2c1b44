//! Structural equivalence of nodes within a subset.
//!
//! Two nodes are equivalent by parents when their parents restricted to the
//! subset coincide, and by children symmetrically. Classification walks the
//! topological order so the in-subset parents of a node are collected in the
//! same sequence for every node sharing them, which lets a trie key on that
//! sequence directly.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::graph::Dag;
use crate::index::Trie;

/// Equivalence classes of a node subset.
#[derive(Debug, Clone)]
pub struct Equivalence<N> {
    classes: Vec<Vec<N>>,
    index: HashMap<N, usize>,
}

impl<N: Clone + Eq + Hash> Equivalence<N> {
    fn new() -> Self {
        Self {
            classes: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn assign(&mut self, node: N, class: usize) {
        if class == self.classes.len() {
            self.classes.push(Vec::new());
        }
        self.classes[class].push(node.clone());
        self.index.insert(node, class);
    }

    /// Classes in order of first appearance.
    pub fn classes(&self) -> &[Vec<N>] {
        &self.classes
    }

    /// Number of classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Index of a node's class. `None` for nodes outside the subset.
    pub fn class_index(&self, node: &N) -> Option<usize> {
        self.index.get(node).copied()
    }

    /// Members of a node's class, the node included.
    pub fn class_of(&self, node: &N) -> Option<&[N]> {
        self.class_index(node).map(|i| self.classes[i].as_slice())
    }

    /// Whether both nodes belong to the same class.
    pub fn are_equivalent(&self, a: &N, b: &N) -> bool {
        match (self.class_index(a), self.class_index(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }
}

/// Group subset nodes by their in-subset parents.
pub fn equivalent_by_parents<N, E>(dag: &Dag<N, E>, subset: &HashSet<N>) -> Equivalence<N>
where
    N: Clone + Eq + Hash,
    E: Clone,
{
    let mut equivalence = Equivalence::new();
    let mut visited_parents: HashMap<N, Vec<N>> = HashMap::new();
    let mut trie: Trie<N, usize> = Trie::new();

    for node in dag.sorted() {
        if !subset.contains(&node) {
            continue;
        }
        let parents = visited_parents.remove(&node).unwrap_or_default();
        let next = trie.len();
        let class = *trie.get_or_insert_with(parents, || next);
        equivalence.assign(node.clone(), class);

        for child in dag.children_of(&node) {
            if subset.contains(&child) {
                visited_parents.entry(child).or_default().push(node.clone());
            }
        }
    }
    equivalence
}

/// Group subset nodes by their in-subset children.
pub fn equivalent_by_children<N, E>(dag: &Dag<N, E>, subset: &HashSet<N>) -> Equivalence<N>
where
    N: Clone + Eq + Hash,
    E: Clone,
{
    equivalent_by_parents(&dag.reversed(), subset)
}

/// Group subset nodes sharing both their in-subset parents and children.
pub fn equivalent_nodes<N, E>(dag: &Dag<N, E>, subset: &HashSet<N>) -> Equivalence<N>
where
    N: Clone + Eq + Hash,
    E: Clone,
{
    let by_parents = equivalent_by_parents(dag, subset);
    let by_children = equivalent_by_children(dag, subset);

    let mut equivalence = Equivalence::new();
    let mut pairs: HashMap<(usize, usize), usize> = HashMap::new();
    for node in dag.sorted() {
        let (Some(p), Some(c)) = (by_parents.class_index(&node), by_children.class_index(&node))
        else {
            continue;
        };
        let next = pairs.len();
        let class = *pairs.entry((p, c)).or_insert(next);
        equivalence.assign(node, class);
    }
    equivalence
}
