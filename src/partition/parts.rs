//! Mutable grouping of nodes into disjoint, non-empty parts.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde::Serialize;

/// Handle of a part. Never reused within one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(u64);

/// Target of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// An existing part.
    Part(PartId),
    /// A new singleton part.
    Fresh,
}

/// Outcome of a successful move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation {
    /// Part the node left.
    pub from: PartId,
    /// Part the node joined.
    pub to: PartId,
    /// Whether `from` became empty and was removed.
    pub emptied: bool,
}

/// Node and part counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartitionSize {
    pub nodes: usize,
    pub parts: usize,
}

/// Every known node belongs to exactly one part, and no part is empty.
#[derive(Debug, Clone)]
pub struct Partition<N> {
    /// node -> (part, position within the part's member list)
    index: HashMap<N, (PartId, usize)>,
    parts: BTreeMap<PartId, Vec<N>>,
    next_part: u64,
}

impl<N: Clone + Eq + Hash> Default for Partition<N> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            parts: BTreeMap::new(),
            next_part: 0,
        }
    }
}

impl<N: Clone + Eq + Hash> Partition<N> {
    /// Build from groups. Empty groups are skipped and a node listed twice
    /// stays in the first group that named it.
    pub fn new<I, G>(groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = N>,
    {
        let mut partition = Self::default();
        for group in groups {
            let mut part: Option<PartId> = None;
            for node in group {
                if partition.index.contains_key(&node) {
                    continue;
                }
                match part {
                    Some(id) => partition.push(id, node),
                    None => part = Some(partition.create(node)),
                }
            }
        }
        partition
    }

    /// One part per node.
    pub fn singleton<I: IntoIterator<Item = N>>(nodes: I) -> Self {
        Self::new(nodes.into_iter().map(std::iter::once))
    }

    fn create(&mut self, node: N) -> PartId {
        let id = PartId(self.next_part);
        self.next_part += 1;
        self.parts.insert(id, Vec::new());
        self.push(id, node);
        id
    }

    fn push(&mut self, id: PartId, node: N) {
        if let Some(members) = self.parts.get_mut(&id) {
            self.index.insert(node.clone(), (id, members.len()));
            members.push(node);
        }
    }

    /// Detach a node from its part. Returns whether the part was emptied.
    fn detach(&mut self, id: PartId, position: usize) -> bool {
        let Some(members) = self.parts.get_mut(&id) else {
            return false;
        };
        members.swap_remove(position);
        if let Some(moved) = members.get(position) {
            self.index.insert(moved.clone(), (id, position));
        }
        if members.is_empty() {
            self.parts.remove(&id);
            return true;
        }
        false
    }

    /// Node and part counts.
    pub fn size(&self) -> PartitionSize {
        PartitionSize {
            nodes: self.index.len(),
            parts: self.parts.len(),
        }
    }

    /// Number of assigned nodes.
    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    /// Number of non-empty parts.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// All nodes, grouped part by part.
    pub fn nodes(&self) -> Vec<N> {
        self.parts.values().flatten().cloned().collect()
    }

    /// Parts in creation order.
    pub fn parts(&self) -> impl Iterator<Item = (PartId, &[N])> + '_ {
        self.parts.iter().map(|(&id, members)| (id, members.as_slice()))
    }

    /// Ids of the non-empty parts in creation order.
    pub fn part_ids(&self) -> Vec<PartId> {
        self.parts.keys().copied().collect()
    }

    /// Parts as plain node groups.
    pub fn groups(&self) -> Vec<Vec<N>> {
        self.parts.values().cloned().collect()
    }

    /// Whether the node is assigned to a part.
    pub fn contains(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    /// Whether the part exists and is non-empty.
    pub fn contains_part(&self, part: PartId) -> bool {
        self.parts.contains_key(&part)
    }

    /// Part holding a node.
    pub fn part_of(&self, node: &N) -> Option<PartId> {
        self.index.get(node).map(|&(id, _)| id)
    }

    /// Members of a part. Empty for unknown parts.
    pub fn members(&self, part: PartId) -> &[N] {
        self.parts.get(&part).map(Vec::as_slice).unwrap_or_default()
    }

    /// Member count of a part. Zero for unknown parts.
    pub fn part_size(&self, part: PartId) -> usize {
        self.members(part).len()
    }

    /// Move a node. See [`Partition::relocate`].
    pub fn move_node(&mut self, node: &N, destination: Destination) -> bool {
        self.relocate(node, destination).is_some()
    }

    /// Move a node, reporting where it went.
    ///
    /// Fails if the node is unknown, the destination is its own part, or the
    /// destination names a part that does not exist.
    pub fn relocate(&mut self, node: &N, destination: Destination) -> Option<Relocation> {
        let &(from, position) = self.index.get(node)?;
        if let Destination::Part(to) = destination {
            if to == from || !self.parts.contains_key(&to) {
                return None;
            }
        }
        let emptied = self.detach(from, position);
        let to = match destination {
            Destination::Part(to) => {
                self.push(to, node.clone());
                to
            }
            Destination::Fresh => self.create(node.clone()),
        };
        Some(Relocation { from, to, emptied })
    }
}
