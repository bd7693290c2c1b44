//! Fluent API for building Dag instances.

use std::hash::Hash;

use crate::types::{DagOptions, DagResult};

use super::dag::Dag;

/// Fluent builder for constructing a [`Dag`].
///
/// Edges are applied in insertion order, so under the safe strategy the
/// first edge that would close a cycle fails the build.
pub struct DagBuilder<N, E = ()> {
    options: DagOptions,
    nodes: Vec<N>,
    edges: Vec<(N, N, E)>,
}

impl<N: Clone + Eq + Hash, E: Clone> DagBuilder<N, E> {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self::with_options(DagOptions::default())
    }

    /// Create a builder with specific options.
    pub fn with_options(options: DagOptions) -> Self {
        Self {
            options,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Add a node, even if it ends up with no edges.
    pub fn node(&mut self, node: N) -> &mut Self {
        self.nodes.push(node);
        self
    }

    /// Add several nodes.
    pub fn nodes<I: IntoIterator<Item = N>>(&mut self, nodes: I) -> &mut Self {
        self.nodes.extend(nodes);
        self
    }

    /// Add an edge carrying a payload.
    pub fn edge_with(&mut self, tail: N, head: N, data: E) -> &mut Self {
        self.edges.push((tail, head, data));
        self
    }

    /// Add a chain `a -> b -> c -> ...` of default-payload edges.
    pub fn chain<I: IntoIterator<Item = N>>(&mut self, nodes: I) -> &mut Self
    where
        E: Default,
    {
        let mut previous: Option<N> = None;
        for node in nodes {
            match previous.take() {
                Some(tail) => self.edges.push((tail, node.clone(), E::default())),
                None => self.nodes.push(node.clone()),
            }
            previous = Some(node);
        }
        self
    }

    /// Add an edge with a default payload.
    pub fn edge(&mut self, tail: N, head: N) -> &mut Self
    where
        E: Default,
    {
        self.edge_with(tail, head, E::default())
    }

    /// Build the final Dag.
    pub fn build(self) -> DagResult<Dag<N, E>> {
        let mut dag = Dag::with_options(self.options);
        for node in self.nodes {
            dag.add(node);
        }
        for (tail, head, data) in self.edges {
            dag.connect_with(tail, head, data)?;
        }
        Ok(dag)
    }
}

impl<N: Clone + Eq + Hash, E: Clone> Default for DagBuilder<N, E> {
    fn default() -> Self {
        Self::new()
    }
}
