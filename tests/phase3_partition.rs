//! Phase 3 tests: partitions, subpartitions, weighted graphs, the trie
//! index and equivalence classes.

use std::collections::HashSet;

use dagkit::engine::{equivalent_by_children, equivalent_by_parents, equivalent_nodes};
use dagkit::graph::{Dag, UnitWeight, WeightedDag};
use dagkit::index::Trie;
use dagkit::partition::{Destination, Partition, PartitionSize, SubPartition};
use dagkit::types::{DagError, DagOptions};

fn sorted_groups(mut groups: Vec<Vec<u32>>) -> Vec<Vec<u32>> {
    for group in &mut groups {
        group.sort();
    }
    groups.sort();
    groups
}

// ==================== Partition ====================

#[test]
fn test_partition_from_groups() {
    let partition = Partition::new(vec![vec![1, 2], vec![], vec![3]]);
    assert_eq!(partition.size(), PartitionSize { nodes: 3, parts: 2 });
    assert_eq!(partition.part_of(&1), partition.part_of(&2));
    assert_ne!(partition.part_of(&1), partition.part_of(&3));
    assert!(partition.part_of(&4).is_none());
}

#[test]
fn test_partition_duplicate_keeps_first_group() {
    let partition = Partition::new(vec![vec![1, 2], vec![2, 3]]);
    assert_eq!(partition.node_count(), 3);
    assert_eq!(partition.part_of(&2), partition.part_of(&1));
    assert_eq!(
        sorted_groups(partition.groups()),
        vec![vec![1, 2], vec![3]]
    );
}

#[test]
fn test_partition_singleton() {
    let partition = Partition::singleton(0..5u32);
    assert_eq!(partition.part_count(), 5);
    assert!(partition.parts().all(|(_, members)| members.len() == 1));
}

#[test]
fn test_partition_move_into_existing_part() {
    let mut partition = Partition::new(vec![vec![1, 2], vec![3]]);
    let target = partition.part_of(&3).unwrap();
    let relocation = partition.relocate(&1, Destination::Part(target)).unwrap();
    assert_eq!(relocation.to, target);
    assert!(!relocation.emptied);
    assert_eq!(partition.part_size(target), 2);
    assert_eq!(partition.members(relocation.from), &[2]);
}

#[test]
fn test_partition_emptied_part_disappears() {
    let mut partition = Partition::new(vec![vec![1], vec![2]]);
    let old = partition.part_of(&1).unwrap();
    let target = partition.part_of(&2).unwrap();
    let relocation = partition.relocate(&1, Destination::Part(target)).unwrap();
    assert!(relocation.emptied);
    assert!(!partition.contains_part(old));
    assert_eq!(partition.part_count(), 1);
    assert!(partition.members(old).is_empty());
}

#[test]
fn test_partition_fresh_part_ids_are_never_reused() {
    let mut partition = Partition::new(vec![vec![1], vec![2, 3]]);
    let seen: HashSet<_> = partition.part_ids().into_iter().collect();
    let target = partition.part_of(&2).unwrap();
    partition.move_node(&1, Destination::Part(target));
    let relocation = partition.relocate(&3, Destination::Fresh).unwrap();
    assert!(!seen.contains(&relocation.to));
    assert_eq!(partition.members(relocation.to), &[3]);
}

#[test]
fn test_partition_rejected_moves() {
    let mut partition = Partition::new(vec![vec![1, 2]]);
    let own = partition.part_of(&1).unwrap();
    assert!(!partition.move_node(&1, Destination::Part(own)));
    assert!(!partition.move_node(&9, Destination::Fresh));

    let mut other = Partition::new(vec![vec![7], vec![8]]);
    let stale = other.part_of(&7).unwrap();
    let target = other.part_of(&8).unwrap();
    other.move_node(&7, Destination::Part(target));
    assert!(!other.move_node(&8, Destination::Part(stale)));
}

#[test]
fn test_partition_covers_every_node_after_many_moves() {
    let mut partition = Partition::singleton(0..20u32);
    for node in 0..20u32 {
        let target = partition.part_of(&(node / 4 * 4)).unwrap();
        partition.move_node(&node, Destination::Part(target));
    }
    assert_eq!(partition.node_count(), 20);
    assert_eq!(partition.part_count(), 5);
    let mut nodes = partition.nodes();
    nodes.sort();
    assert_eq!(nodes, (0..20).collect::<Vec<_>>());
    for (part, members) in partition.parts() {
        for node in members {
            assert_eq!(partition.part_of(node), Some(part));
        }
    }
}

// ==================== SubPartition ====================

#[test]
fn test_subpartition_indexes_subparts() {
    let sub = SubPartition::new(
        vec![vec![1], vec![2], vec![3, 4]],
        vec![vec![1, 2], vec![3, 4]],
    )
    .unwrap();
    let first = sub.superpart_of(&1).unwrap();
    let second = sub.superpart_of(&3).unwrap();
    assert_eq!(sub.subparts(first).len(), 2);
    assert_eq!(sub.subparts(second).len(), 1);
    let part = sub.partition().part_of(&3).unwrap();
    assert_eq!(sub.superpart_of_part(part), Some(second));
}

#[test]
fn test_subpartition_rejects_straddling_part() {
    let result = SubPartition::new(vec![vec![1, 2]], vec![vec![1], vec![2]]);
    assert_eq!(result.unwrap_err(), DagError::InvalidSubPartitioning);
}

#[test]
fn test_subpartition_rejects_mismatched_nodes() {
    let result = SubPartition::new(vec![vec![1]], vec![vec![1, 2]]);
    assert_eq!(result.unwrap_err(), DagError::UnmatchedSubPartition);

    let result = SubPartition::new(vec![vec![1], vec![3]], vec![vec![1, 2]]);
    assert_eq!(result.unwrap_err(), DagError::UnmatchedSubPartition);
}

#[test]
fn test_subpartition_moves_stay_inside_superpart() {
    let mut sub = SubPartition::singleton(Partition::new(vec![vec![1, 2], vec![3]]));
    let outside = sub.partition().part_of(&3).unwrap();
    assert!(!sub.move_node(&1, Destination::Part(outside)));

    let inside = sub.partition().part_of(&2).unwrap();
    let superpart = sub.superpart_of(&1).unwrap();
    assert!(sub.move_node(&1, Destination::Part(inside)));
    assert_eq!(sub.subparts(superpart), vec![inside]);

    let relocation = sub.relocate(&1, Destination::Fresh).unwrap();
    assert_eq!(sub.subparts(superpart).len(), 2);
    assert!(sub.subparts(superpart).contains(&relocation.to));
    assert_eq!(sub.superpart_of_part(relocation.to), Some(superpart));
}

#[test]
fn test_subpartition_parent_is_untouched_by_moves() {
    let parent = Partition::new(vec![vec![1, 2, 3]]);
    let mut sub = SubPartition::singleton(parent);
    let target = sub.partition().part_of(&1).unwrap();
    sub.move_node(&2, Destination::Part(target));
    sub.move_node(&3, Destination::Part(target));
    assert_eq!(sub.partition().part_count(), 1);
    assert_eq!(sub.parent().part_count(), 1);
    assert_eq!(sub.parent().node_count(), 3);
}

// ==================== Weighted DAG ====================

#[test]
fn test_weighted_aggregates() {
    let mut graph: WeightedDag<&str> = WeightedDag::new();
    graph.connect("a", "b", 2.0).unwrap();
    graph.connect("b", "c", 3.0).unwrap();
    graph.add("d");
    assert_eq!(graph.weight_of(&"a"), 2.0);
    assert_eq!(graph.weight_of(&"b"), 5.0);
    assert_eq!(graph.weight_of(&"d"), 0.0);
    assert_eq!(graph.total_weight(), 5.0);
    assert_eq!(graph.edge_weight(&"b", &"c"), Some(3.0));
    assert_eq!(graph.size().edges, 2);
}

#[test]
fn test_weighted_duplicate_edge_is_ignored() {
    let mut graph: WeightedDag<u32> = WeightedDag::new();
    assert!(graph.connect(1, 2, 1.5).unwrap());
    assert!(!graph.connect(1, 2, 4.0).unwrap());
    assert_eq!(graph.total_weight(), 1.5);
    assert_eq!(graph.edge_weight(&1, &2), Some(1.5));
}

#[test]
fn test_weighted_delete_restores_neighbours() {
    let mut graph: WeightedDag<u32> = WeightedDag::new();
    graph.connect(1, 2, 1.0).unwrap();
    graph.connect(2, 3, 2.0).unwrap();
    graph.connect(1, 3, 4.0).unwrap();
    assert!(graph.delete(&2));
    assert_eq!(graph.weight_of(&1), 4.0);
    assert_eq!(graph.weight_of(&3), 4.0);
    assert_eq!(graph.total_weight(), 4.0);
    assert!(!graph.contains(&2));
    assert!(!graph.delete(&2));
}

#[test]
fn test_weighted_clone_is_independent() {
    let mut original: WeightedDag<u32> = WeightedDag::new();
    original.connect(1, 2, 1.0).unwrap();
    original.connect(2, 3, 2.0).unwrap();

    let mut copy = original.clone();
    copy.connect(3, 4, 5.0).unwrap();
    copy.delete(&1);
    assert_eq!(copy.weight_of(&2), 2.0);
    assert_eq!(copy.total_weight(), 7.0);

    assert_eq!(original.weight_of(&1), 1.0);
    assert_eq!(original.weight_of(&2), 3.0);
    assert_eq!(original.weight_of(&3), 2.0);
    assert_eq!(original.total_weight(), 3.0);
    assert!(original.contains(&1));
    assert!(!original.contains(&4));
    assert_eq!(original.edge_count(), 2);
}

#[test]
fn test_weighted_disconnect_and_clear() {
    let mut graph: WeightedDag<u32> = WeightedDag::new();
    graph.connect(1, 2, 1.0).unwrap();
    assert!(graph.disconnect(&1, &2));
    assert!(!graph.disconnect(&1, &2));
    assert_eq!(graph.weight_of(&1), 0.0);
    assert_eq!(graph.total_weight(), 0.0);
    graph.connect(3, 4, 1.0).unwrap();
    graph.clear();
    assert_eq!(graph.node_count(), 0);
    assert_eq!(graph.total_weight(), 0.0);
}

#[test]
fn test_weigh_copies_topology() {
    let mut dag: Dag<u32> = Dag::new();
    dag.connect(1, 2).unwrap();
    dag.connect(2, 3).unwrap();
    let unit = WeightedDag::weigh(&dag, &UnitWeight, DagOptions::default()).unwrap();
    assert_eq!(unit.total_weight(), 2.0);
    assert_eq!(unit.weight_of(&2), 2.0);

    let scaled =
        WeightedDag::weigh(&dag, &|t: &u32, h: &u32| (t + h) as f64, DagOptions::default())
            .unwrap();
    assert_eq!(scaled.edge_weight(&2, &3), Some(5.0));
    assert_eq!(scaled.total_weight(), 8.0);
}

#[test]
fn test_weighted_safe_mode() {
    let mut graph: WeightedDag<u32> = WeightedDag::with_options(DagOptions::safe());
    graph.connect(1, 2, 1.0).unwrap();
    assert!(graph.connect(2, 1, 1.0).is_err());
    assert_eq!(graph.total_weight(), 1.0);
    assert_eq!(graph.weight_of(&1), 1.0);
}

// ==================== Trie ====================

#[test]
fn test_trie_insert_and_get() {
    let mut trie: Trie<u32, &str> = Trie::new();
    assert!(trie.is_empty());
    assert_eq!(trie.insert(vec![1, 2], "ab"), None);
    assert_eq!(trie.insert(vec![1], "a"), None);
    assert_eq!(trie.insert(vec![1, 2], "AB"), Some("ab"));
    assert_eq!(trie.len(), 2);
    assert_eq!(trie.get(&[1, 2]), Some(&"AB"));
    assert_eq!(trie.get(&[1]), Some(&"a"));
    assert!(trie.get(&[2]).is_none());
    // Prefix nodes without a value are not keys
    assert!(!trie.contains(&[1, 2, 3]));
}

#[test]
fn test_trie_empty_key() {
    let mut trie: Trie<u32, usize> = Trie::new();
    assert!(!trie.contains(&[]));
    *trie.get_or_insert_with(Vec::new(), || 0) += 5;
    assert_eq!(trie.get(&[]), Some(&5));
    assert_eq!(trie.len(), 1);
}

#[test]
fn test_trie_get_or_insert_with_keeps_existing() {
    let mut trie: Trie<char, usize> = Trie::new();
    let first = *trie.get_or_insert_with("ab".chars(), || 1);
    let second = *trie.get_or_insert_with("ab".chars(), || 2);
    assert_eq!(first, 1);
    assert_eq!(second, 1);
    assert_eq!(trie.len(), 1);
}

// ==================== Equivalence ====================

/// a -> c, a -> d, b -> e
fn fan() -> Dag<&'static str> {
    let mut dag = Dag::new();
    dag.connect("a", "c").unwrap();
    dag.connect("a", "d").unwrap();
    dag.connect("b", "e").unwrap();
    dag
}

fn everything(dag: &Dag<&'static str>) -> HashSet<&'static str> {
    dag.nodes().into_iter().collect()
}

#[test]
fn test_equivalent_by_parents() {
    let dag = fan();
    let classes = equivalent_by_parents(&dag, &everything(&dag));
    assert_eq!(classes.class_count(), 3);
    assert!(classes.are_equivalent(&"a", &"b"));
    assert!(classes.are_equivalent(&"c", &"d"));
    assert!(!classes.are_equivalent(&"c", &"e"));
    let mut class = classes.class_of(&"c").unwrap().to_vec();
    class.sort();
    assert_eq!(class, vec!["c", "d"]);
}

#[test]
fn test_equivalent_by_children() {
    let dag = fan();
    let classes = equivalent_by_children(&dag, &everything(&dag));
    assert!(classes.are_equivalent(&"c", &"e"));
    assert!(classes.are_equivalent(&"d", &"e"));
    assert!(!classes.are_equivalent(&"a", &"b"));
    assert_eq!(classes.class_count(), 3);
}

#[test]
fn test_equivalent_nodes_intersects_both() {
    let dag = fan();
    let classes = equivalent_nodes(&dag, &everything(&dag));
    assert!(classes.are_equivalent(&"c", &"d"));
    assert!(!classes.are_equivalent(&"c", &"e"));
    assert!(!classes.are_equivalent(&"a", &"b"));
    assert_eq!(classes.class_count(), 4);
}

#[test]
fn test_equivalence_is_restricted_to_subset() {
    let dag = fan();
    let subset: HashSet<&str> = ["c", "d", "e"].into_iter().collect();
    let classes = equivalent_by_parents(&dag, &subset);
    // Parents outside the subset are ignored
    assert_eq!(classes.class_count(), 1);
    assert!(classes.are_equivalent(&"c", &"e"));
    assert!(classes.class_index(&"a").is_none());
    assert!(!classes.are_equivalent(&"a", &"a"));
}

#[test]
fn test_equivalence_classes_partition_the_subset() {
    let mut dag: Dag<u32> = Dag::new();
    for i in 0..10u32 {
        dag.connect(i % 3, 10 + i).unwrap();
    }
    let subset: HashSet<u32> = dag.nodes().into_iter().collect();
    let classes = equivalent_nodes(&dag, &subset);
    let total: usize = classes.classes().iter().map(Vec::len).sum();
    assert_eq!(total, subset.len());
    // Heads sharing a single parent collapse, roots differ by children
    assert!(classes.are_equivalent(&10, &13));
    assert!(!classes.are_equivalent(&10, &11));
    assert!(!classes.are_equivalent(&0, &1));
}

// ==================== Errors ====================

#[test]
fn test_error_messages() {
    let err = DagError::CycleProhibited("a -> a".to_string());
    assert_eq!(err.to_string(), "Cycle prohibited: a -> a");
    assert_eq!(
        DagError::NonIsomorphicPartitions.to_string(),
        "Partitions are not isomorphic."
    );
    assert!(!DagError::UnmatchedSubPartition.to_string().is_empty());
}
