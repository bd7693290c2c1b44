//! Handles scoped to a single node or edge of a [`Dag`].

use std::collections::HashSet;
use std::hash::Hash;

use crate::types::DagResult;

use super::dag::Dag;

/// Read-only view of one node.
pub struct NodeRef<'a, N, E> {
    dag: &'a Dag<N, E>,
    node: N,
}

impl<'a, N: Clone + Eq + Hash, E: Clone> NodeRef<'a, N, E> {
    pub(crate) fn new(dag: &'a Dag<N, E>, node: N) -> Self {
        Self { dag, node }
    }

    /// The node value.
    pub fn id(&self) -> &N {
        &self.node
    }

    /// Direct predecessors.
    pub fn parents(&self) -> Vec<N> {
        self.dag.parents_of(&self.node)
    }

    /// Direct successors.
    pub fn children(&self) -> Vec<N> {
        self.dag.children_of(&self.node)
    }

    /// Ancestors up to `max_depth` edges away.
    pub fn ancestors(&self, max_depth: Option<usize>) -> HashSet<N> {
        self.dag.ancestors_of(&self.node, max_depth)
    }

    /// Descendants up to `max_depth` edges away.
    pub fn descendants(&self, max_depth: Option<usize>) -> HashSet<N> {
        self.dag.descendants_of(&self.node, max_depth)
    }

    /// Whether `self -> other` exists.
    pub fn is_parent_of(&self, other: &N) -> bool {
        self.dag.has_edge(&self.node, other)
    }

    /// Whether `other -> self` exists.
    pub fn is_child_of(&self, other: &N) -> bool {
        self.dag.has_edge(other, &self.node)
    }

    /// Whether `other` is a strict descendant of this node.
    pub fn is_ancestor_of(&self, other: &N) -> bool {
        &self.node != other && self.dag.has_path_between(&self.node, other, None)
    }

    /// Whether `other` is a strict ancestor of this node.
    pub fn is_descendant_of(&self, other: &N) -> bool {
        &self.node != other && self.dag.has_path_between(other, &self.node, None)
    }
}

/// Mutable handle to one node.
pub struct NodeMut<'a, N, E> {
    dag: &'a mut Dag<N, E>,
    node: N,
}

impl<'a, N: Clone + Eq + Hash, E: Clone> NodeMut<'a, N, E> {
    pub(crate) fn new(dag: &'a mut Dag<N, E>, node: N) -> Self {
        Self { dag, node }
    }

    /// The node value.
    pub fn id(&self) -> &N {
        &self.node
    }

    /// Read-only view of the same node.
    pub fn view(&self) -> NodeRef<'_, N, E> {
        NodeRef::new(self.dag, self.node.clone())
    }

    /// Connect this node to `head`.
    pub fn connect_to(&mut self, head: N) -> DagResult<bool>
    where
        E: Default,
    {
        self.dag.connect(self.node.clone(), head)
    }

    /// Connect `tail` to this node.
    pub fn connect_from(&mut self, tail: N) -> DagResult<bool>
    where
        E: Default,
    {
        self.dag.connect(tail, self.node.clone())
    }

    /// Remove `self -> head`.
    pub fn disconnect_to(&mut self, head: &N) -> bool {
        self.dag.disconnect(&self.node, head)
    }

    /// Remove `tail -> self`.
    pub fn disconnect_from(&mut self, tail: &N) -> bool {
        self.dag.disconnect(tail, &self.node)
    }

    /// Remove the node and its edges from the graph.
    pub fn delete(self) -> bool {
        self.dag.delete(&self.node)
    }
}

/// Read-only view of one edge.
pub struct EdgeRef<'a, N, E> {
    dag: &'a Dag<N, E>,
    tail: N,
    head: N,
}

impl<'a, N: Clone + Eq + Hash, E: Clone> EdgeRef<'a, N, E> {
    pub(crate) fn new(dag: &'a Dag<N, E>, tail: N, head: N) -> Self {
        Self { dag, tail, head }
    }

    /// Source endpoint.
    pub fn tail(&self) -> &N {
        &self.tail
    }

    /// Target endpoint.
    pub fn head(&self) -> &N {
        &self.head
    }

    /// Edge payload.
    pub fn data(&self) -> Option<E> {
        self.dag.edge_data(&self.tail, &self.head)
    }
}

/// Mutable handle to one edge.
pub struct EdgeMut<'a, N, E> {
    dag: &'a mut Dag<N, E>,
    tail: N,
    head: N,
}

impl<'a, N: Clone + Eq + Hash, E: Clone> EdgeMut<'a, N, E> {
    pub(crate) fn new(dag: &'a mut Dag<N, E>, tail: N, head: N) -> Self {
        Self { dag, tail, head }
    }

    /// Source endpoint.
    pub fn tail(&self) -> &N {
        &self.tail
    }

    /// Target endpoint.
    pub fn head(&self) -> &N {
        &self.head
    }

    /// Edge payload.
    pub fn data(&self) -> Option<E> {
        self.dag.edge_data(&self.tail, &self.head)
    }

    /// Replace the payload.
    pub fn set_data(&mut self, data: E) -> bool {
        self.dag.set_edge_data(&self.tail, &self.head, data)
    }

    /// Remove the edge, returning its payload.
    pub fn delete(self) -> Option<E> {
        self.dag.take_edge(&self.tail, &self.head)
    }
}
