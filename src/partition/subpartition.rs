//! Partition refining a parent partition part by part.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use crate::types::{DagError, DagResult};

use super::parts::{Destination, PartId, Partition, Relocation};

/// A partition whose every part lies inside exactly one part of `parent`.
///
/// The superpart -> subparts index is kept in sync on every move.
#[derive(Debug, Clone)]
pub struct SubPartition<N> {
    partition: Partition<N>,
    parent: Partition<N>,
    subparts: HashMap<PartId, BTreeSet<PartId>>,
}

impl<N: Clone + Eq + Hash> SubPartition<N> {
    /// Build from own groups and parent groups.
    pub fn new<I, G, P, Q>(groups: I, parent: P) -> DagResult<Self>
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = N>,
        P: IntoIterator<Item = Q>,
        Q: IntoIterator<Item = N>,
    {
        Self::with_parent(groups, Partition::new(parent))
    }

    /// Build from own groups under an existing parent partition.
    pub fn with_parent<I, G>(groups: I, parent: Partition<N>) -> DagResult<Self>
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = N>,
    {
        let partition = Partition::new(groups);
        if partition.node_count() != parent.node_count() {
            return Err(DagError::UnmatchedSubPartition);
        }

        let mut subparts: HashMap<PartId, BTreeSet<PartId>> = HashMap::new();
        for (part, members) in partition.parts() {
            let mut superpart: Option<PartId> = None;
            for node in members {
                let own = parent
                    .part_of(node)
                    .ok_or(DagError::UnmatchedSubPartition)?;
                match superpart {
                    Some(expected) if expected != own => {
                        return Err(DagError::InvalidSubPartitioning)
                    }
                    Some(_) => {}
                    None => superpart = Some(own),
                }
            }
            if let Some(superpart) = superpart {
                subparts.entry(superpart).or_default().insert(part);
            }
        }

        Ok(Self {
            partition,
            parent,
            subparts,
        })
    }

    /// Every node alone in its own part.
    pub fn singleton(parent: Partition<N>) -> Self {
        let partition = Partition::singleton(parent.nodes());
        let mut subparts: HashMap<PartId, BTreeSet<PartId>> = HashMap::new();
        for (part, members) in partition.parts() {
            if let Some(superpart) = members.first().and_then(|n| parent.part_of(n)) {
                subparts.entry(superpart).or_default().insert(part);
            }
        }
        Self {
            partition,
            parent,
            subparts,
        }
    }

    /// Own partition.
    pub fn partition(&self) -> &Partition<N> {
        &self.partition
    }

    /// Partition this one refines.
    pub fn parent(&self) -> &Partition<N> {
        &self.parent
    }

    /// Own parts contained in a parent part.
    pub fn subparts(&self, superpart: PartId) -> Vec<PartId> {
        self.subparts
            .get(&superpart)
            .map(|parts| parts.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Parent part of a node.
    pub fn superpart_of(&self, node: &N) -> Option<PartId> {
        self.parent.part_of(node)
    }

    /// Parent part containing an own part.
    pub fn superpart_of_part(&self, part: PartId) -> Option<PartId> {
        self.partition
            .members(part)
            .first()
            .and_then(|node| self.parent.part_of(node))
    }

    /// Move a node within its superpart. See [`SubPartition::relocate`].
    pub fn move_node(&mut self, node: &N, destination: Destination) -> bool {
        self.relocate(node, destination).is_some()
    }

    /// Move a node, refusing destinations outside its superpart.
    pub fn relocate(&mut self, node: &N, destination: Destination) -> Option<Relocation> {
        let superpart = self.superpart_of(node)?;
        if let Destination::Part(to) = destination {
            if self.partition.contains_part(to) && self.superpart_of_part(to) != Some(superpart) {
                return None;
            }
        }
        let relocation = self.partition.relocate(node, destination)?;
        let siblings = self.subparts.entry(superpart).or_default();
        if relocation.emptied {
            siblings.remove(&relocation.from);
        }
        siblings.insert(relocation.to);
        Some(relocation)
    }
}
