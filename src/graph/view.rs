//! Read-only graph contract shared by every graph type and algorithm.

/// Read-only access to a directed graph over nodes of type `N`.
///
/// Adjacency is returned as owned vectors so implementors are free to keep
/// their storage behind interior mutability.
pub trait GraphView<N> {
    /// Payload attached to an edge.
    type Edge;

    /// All nodes, in a stable order.
    fn nodes(&self) -> Vec<N>;

    /// Whether the node is part of the graph.
    fn contains(&self, node: &N) -> bool;

    /// Whether the edge `tail -> head` exists.
    fn has_edge(&self, tail: &N, head: &N) -> bool;

    /// Direct predecessors of a node. Empty for unknown nodes.
    fn parents_of(&self, node: &N) -> Vec<N>;

    /// Direct successors of a node. Empty for unknown nodes.
    fn children_of(&self, node: &N) -> Vec<N>;

    /// Payload of the edge `tail -> head`, if the edge exists.
    fn edge_data(&self, tail: &N, head: &N) -> Option<Self::Edge>;

    /// Number of nodes.
    fn node_count(&self) -> usize {
        self.nodes().len()
    }
}
