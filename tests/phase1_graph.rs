//! Phase 1 tests: DAG storage, mutation, metrics and handles.

use std::collections::HashSet;

use dagkit::graph::{Dag, DagBuilder, DagSize, GraphView};
use dagkit::types::{DagError, DagOptions, EdgeAdditionStrategy};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// N1 -> N2 -> ... -> Nn
fn chain(n: usize) -> Dag<String> {
    let mut builder = DagBuilder::new();
    builder.chain((1..=n).map(|i| format!("N{}", i)));
    builder.build().unwrap()
}

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn s(name: &str) -> String {
    name.to_string()
}

/// Random DAG whose edges always point from lower to higher index.
fn random_dag(nodes: usize, edges: usize, seed: u64) -> Dag<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut dag = Dag::new();
    for i in 0..nodes {
        dag.add(i);
    }
    for _ in 0..edges {
        let a = rng.gen_range(0..nodes);
        let b = rng.gen_range(0..nodes);
        if a != b {
            dag.connect(a.min(b), a.max(b)).unwrap();
        }
    }
    dag
}

// ==================== Construction ====================

#[test]
fn test_default_strategy_is_unsafe() {
    let options = DagOptions::default();
    assert_eq!(options.edge_addition_strategy, EdgeAdditionStrategy::Unsafe);
    assert!(!options.is_safe());
    assert!(DagOptions::safe().is_safe());
}

#[test]
fn test_options_deserialize() {
    let options: DagOptions =
        serde_json::from_str(r#"{"edge_addition_strategy":"safe"}"#).unwrap();
    assert!(options.is_safe());
    let options: DagOptions = serde_json::from_str("{}").unwrap();
    assert!(!options.is_safe());
}

#[test]
fn test_empty_dag() {
    let dag: Dag<u32> = Dag::new();
    assert_eq!(
        dag.size(),
        DagSize {
            nodes: 0,
            edges: 0,
            depth: 0,
            width: 0
        }
    );
    assert!(dag.sorted().is_empty());
    assert!(dag.nodes().is_empty());
}

#[test]
fn test_add_is_idempotent() {
    let mut dag: Dag<u32> = Dag::new();
    assert!(dag.add(1));
    assert!(!dag.add(1));
    assert_eq!(dag.node_count(), 1);
}

#[test]
fn test_connect_adds_missing_nodes() {
    let mut dag: Dag<&str> = Dag::new();
    assert!(dag.connect("a", "b").unwrap());
    assert!(dag.contains(&"a"));
    assert!(dag.contains(&"b"));
    assert!(dag.has_edge(&"a", &"b"));
    assert!(!dag.has_edge(&"b", &"a"));
    assert!(!dag.connect("a", "b").unwrap());
    assert_eq!(dag.edge_count(), 1);
}

#[test]
fn test_builder_edges_and_payloads() {
    let mut builder: DagBuilder<&str, u32> = DagBuilder::new();
    builder
        .node("lonely")
        .edge_with("a", "b", 7)
        .edge_with("b", "c", 9);
    let dag = builder.build().unwrap();
    assert_eq!(dag.node_count(), 4);
    assert_eq!(dag.edge_data(&"a", &"b"), Some(7));
    assert_eq!(dag.edge_data(&"b", &"c"), Some(9));
    assert_eq!(dag.edge_data(&"a", &"c"), None);
}

// ==================== Adjacency ====================

#[test]
fn test_adjacency_symmetry() {
    let dag = random_dag(40, 120, 7);
    for a in dag.nodes() {
        for b in dag.children_of(&a) {
            assert!(dag.parents_of(&b).contains(&a));
        }
        for p in dag.parents_of(&a) {
            assert!(dag.children_of(&p).contains(&a));
        }
    }
}

#[test]
fn test_unknown_node_queries() {
    let dag = chain(3);
    assert!(dag.parents_of(&s("X")).is_empty());
    assert!(dag.children_of(&s("X")).is_empty());
    assert!(dag.descendants_of(&s("X"), None).is_empty());
    assert!(!dag.has_path_between(&s("N1"), &s("X"), None));
    assert!(dag.node(&s("X")).is_none());
}

#[test]
fn test_disconnect() {
    let mut dag = chain(3);
    assert!(dag.disconnect(&s("N1"), &s("N2")));
    assert!(!dag.disconnect(&s("N1"), &s("N2")));
    assert!(!dag.has_edge(&s("N1"), &s("N2")));
    assert!(dag.parents_of(&s("N2")).is_empty());
    assert_eq!(dag.edge_count(), 1);
    assert_eq!(dag.node_count(), 3);
}

#[test]
fn test_delete_removes_incident_edges() {
    let mut dag = chain(3);
    assert!(dag.delete(&s("N2")));
    assert!(!dag.delete(&s("N2")));
    assert_eq!(dag.node_count(), 2);
    assert_eq!(dag.edge_count(), 0);
    assert!(dag.children_of(&s("N1")).is_empty());
    assert!(dag.parents_of(&s("N3")).is_empty());
}

#[test]
fn test_deleted_slots_are_reused() {
    let mut dag: Dag<u32> = Dag::new();
    for _ in 0..10_000 {
        dag.add(1);
        dag.delete(&1);
    }
    dag.add(1);
    assert_eq!(dag.node_count(), 1);
    assert_eq!(dag.capacity(), 1);
}

#[test]
fn test_reused_slot_starts_without_edges() {
    let mut dag: Dag<u32> = Dag::new();
    dag.connect(1, 2).unwrap();
    dag.connect(2, 3).unwrap();
    dag.delete(&2);
    dag.add(9);
    assert_eq!(dag.capacity(), 3);
    assert!(dag.parents_of(&9).is_empty());
    assert!(dag.children_of(&9).is_empty());
    assert!(dag.children_of(&1).is_empty());
    assert!(dag.parents_of(&3).is_empty());
    dag.connect(1, 9).unwrap();
    assert_eq!(dag.edges(), vec![(1, 9)]);

    dag.clear();
    assert_eq!(dag.capacity(), 0);
}

#[test]
fn test_clear() {
    let mut dag = chain(5);
    dag.clear();
    assert_eq!(dag.node_count(), 0);
    assert_eq!(dag.edge_count(), 0);
    assert!(dag.sorted().is_empty());
    // Reusable after clearing
    dag.connect(s("x"), s("y")).unwrap();
    assert_eq!(dag.sorted(), vec![s("x"), s("y")]);
}

// ==================== Cycle policy ====================

#[test]
fn test_safe_rejects_cycle() {
    init_logger();
    let mut dag: Dag<u32> = Dag::with_options(DagOptions::safe());
    dag.connect(1, 2).unwrap();
    dag.connect(2, 3).unwrap();
    let err = dag.connect(3, 1).unwrap_err();
    assert!(matches!(err, DagError::CycleProhibited(_)));
    assert!(!dag.has_edge(&3, &1));
    assert_eq!(dag.edge_count(), 2);
}

#[test]
fn test_safe_rejects_self_loop() {
    let mut dag: Dag<u32> = Dag::with_options(DagOptions::safe());
    assert!(matches!(
        dag.connect(1, 1),
        Err(DagError::CycleProhibited(_))
    ));
    assert_eq!(dag.node_count(), 0);
}

#[test]
fn test_unsafe_allows_cycle() {
    let mut dag: Dag<u32> = Dag::new();
    dag.connect(1, 2).unwrap();
    assert!(dag.connect(2, 1).unwrap());
    assert!(dag.has_edge(&2, &1));
}

#[test]
fn test_sorted_on_cycle_is_still_a_permutation() {
    init_logger();
    let mut dag: Dag<u32> = Dag::new();
    dag.connect(1, 2).unwrap();
    dag.connect(2, 3).unwrap();
    dag.connect(3, 1).unwrap();
    dag.add(4);
    let mut sorted = dag.sorted();
    sorted.sort();
    assert_eq!(sorted, vec![1, 2, 3, 4]);
}

// ==================== Paths ====================

#[test]
fn test_has_path_between() {
    let dag = chain(5);
    assert!(dag.has_path_between(&s("N1"), &s("N5"), None));
    assert!(dag.has_path_between(&s("N1"), &s("N1"), None));
    assert!(!dag.has_path_between(&s("N5"), &s("N1"), None));
    assert!(dag.has_path_between(&s("N1"), &s("N3"), Some(2)));
    assert!(!dag.has_path_between(&s("N1"), &s("N4"), Some(2)));
}

#[test]
fn test_chain_ancestors_and_descendants() {
    let dag = chain(5);
    assert_eq!(dag.ancestors_of(&s("N4"), Some(1)), set(&["N3"]));
    assert_eq!(dag.descendants_of(&s("N1"), Some(2)), set(&["N2", "N3"]));
    assert_eq!(dag.ancestors_of(&s("N4"), None), set(&["N1", "N2", "N3"]));
    assert!(dag.descendants_of(&s("N5"), None).is_empty());
}

#[test]
fn test_bounded_descendants_use_shortest_distance() {
    // a -> b -> c -> d and a shortcut a -> d
    let mut dag: Dag<&str> = Dag::new();
    dag.connect("a", "b").unwrap();
    dag.connect("b", "c").unwrap();
    dag.connect("c", "d").unwrap();
    dag.connect("a", "d").unwrap();
    let near: HashSet<&str> = dag.descendants_of(&"a", Some(1));
    assert_eq!(near, ["b", "d"].into_iter().collect());
}

// ==================== Metrics ====================

#[test]
fn test_chain_metrics() {
    let dag = chain(5);
    assert_eq!(dag.depth(), 4);
    assert_eq!(dag.width(), 1);
    let expected: Vec<String> = (1..=5).map(|i| format!("N{}", i)).collect();
    assert_eq!(dag.sorted(), expected);
    assert_eq!(dag.size().edges, 4);
}

#[test]
fn test_antichain_width() {
    let mut dag: Dag<u32> = Dag::new();
    for i in 0..6 {
        dag.add(i);
    }
    assert_eq!(dag.width(), 6);
    assert_eq!(dag.depth(), 0);
}

#[test]
fn test_layered_width() {
    // Complete bipartite layers of size 2 and 3
    let mut dag: Dag<&str> = Dag::new();
    for top in ["a1", "a2"] {
        for bottom in ["b1", "b2", "b3"] {
            dag.connect(top, bottom).unwrap();
        }
    }
    assert_eq!(dag.depth(), 1);
    assert_eq!(dag.width(), 3);
}

#[test]
fn test_depth_uses_longest_path() {
    // a -> b -> c, a -> c, d -> c
    let mut dag: Dag<&str> = Dag::new();
    dag.connect("a", "b").unwrap();
    dag.connect("b", "c").unwrap();
    dag.connect("a", "c").unwrap();
    dag.connect("d", "c").unwrap();
    assert_eq!(dag.depth(), 2);
}

#[test]
fn test_sorted_respects_every_edge() {
    let dag = random_dag(60, 200, 42);
    let sorted = dag.sorted();
    assert_eq!(sorted.len(), 60);
    let position: std::collections::HashMap<usize, usize> =
        sorted.iter().enumerate().map(|(i, &n)| (n, i)).collect();
    for (tail, head) in dag.edges() {
        assert!(position[&tail] < position[&head]);
    }
}

#[test]
fn test_metrics_refresh_after_mutation() {
    let mut dag = chain(3);
    assert_eq!(dag.depth(), 2);
    dag.connect(s("N3"), s("N4")).unwrap();
    assert_eq!(dag.depth(), 3);
    assert_eq!(dag.sorted().last(), Some(&s("N4")));
    dag.add(s("N0"));
    assert_eq!(dag.width(), 2);
}

#[test]
fn test_into_iterator_is_topological() {
    let dag = chain(4);
    let order: Vec<String> = (&dag).into_iter().collect();
    assert_eq!(order, dag.sorted());
    let mut count = 0;
    for _ in &dag {
        count += 1;
    }
    assert_eq!(count, 4);
}

#[test]
fn test_size_serializes() {
    let dag = chain(2);
    let json = serde_json::to_value(dag.size()).unwrap();
    assert_eq!(json["nodes"], 2);
    assert_eq!(json["edges"], 1);
}

// ==================== Copies and aliases ====================

#[test]
fn test_clone_is_independent() {
    let original = chain(3);
    let mut copy = original.clone();
    copy.connect(s("N3"), s("N4")).unwrap();
    copy.delete(&s("N1"));
    assert_eq!(original.node_count(), 3);
    assert!(original.contains(&s("N1")));
    assert!(!original.contains(&s("N4")));
}

#[test]
fn test_from_view_copies_payloads() {
    let mut source: Dag<u32, &str> = Dag::new();
    source.connect_with(1, 2, "one-two").unwrap();
    source.add(3);
    let copy = Dag::from_view(&source, DagOptions::safe());
    assert_eq!(copy.node_count(), 3);
    assert_eq!(copy.edge_data(&1, &2), Some("one-two"));
    assert!(copy.options().is_safe());
}

#[test]
fn test_reversed_swaps_roles() {
    let dag = chain(3);
    let reversed = dag.reversed();
    for (a, b) in dag.edges() {
        assert!(reversed.has_edge(&b, &a));
        assert!(!reversed.has_edge(&a, &b));
    }
    assert_eq!(reversed.children_of(&s("N2")), vec![s("N1")]);
    assert_eq!(
        reversed.sorted(),
        vec![s("N3"), s("N2"), s("N1")]
    );
}

#[test]
fn test_reversed_aliases_storage() {
    let dag = chain(2);
    let mut reversed = dag.reversed();
    reversed.connect(s("N3"), s("N2")).unwrap();
    // N3 -> N2 in the alias is N2 -> N3 in the original
    assert!(dag.has_edge(&s("N2"), &s("N3")));
    assert_eq!(dag.depth(), 2);
}

#[test]
fn test_reversed_edge_payload() {
    let mut dag: Dag<u32, i32> = Dag::new();
    dag.connect_with(1, 2, -5).unwrap();
    assert_eq!(dag.reversed().edge_data(&2, &1), Some(-5));
    assert_eq!(dag.reversed().edge_data(&1, &2), None);
}

// ==================== Handles ====================

#[test]
fn test_node_handle_queries() {
    let dag = chain(4);
    let node = dag.node(&s("N2")).unwrap();
    assert_eq!(node.id(), &s("N2"));
    assert_eq!(node.parents(), vec![s("N1")]);
    assert_eq!(node.children(), vec![s("N3")]);
    assert!(node.is_parent_of(&s("N3")));
    assert!(node.is_child_of(&s("N1")));
    assert!(node.is_ancestor_of(&s("N4")));
    assert!(node.is_descendant_of(&s("N1")));
    assert!(!node.is_ancestor_of(&s("N2")));
    assert_eq!(node.descendants(None), set(&["N3", "N4"]));
    assert_eq!(node.ancestors(None), set(&["N1"]));
}

#[test]
fn test_node_handle_mutation() {
    let mut dag = chain(2);
    {
        let mut node = dag.node_mut(&s("N2")).unwrap();
        node.connect_to(s("N3")).unwrap();
        node.connect_from(s("N0")).unwrap();
        assert!(node.disconnect_from(&s("N1")));
        assert_eq!(node.view().parents(), vec![s("N0")]);
    }
    assert!(dag.has_edge(&s("N2"), &s("N3")));
    assert!(dag.node_mut(&s("N2")).unwrap().delete());
    assert!(!dag.contains(&s("N2")));
}

#[test]
fn test_edge_handles() {
    let mut dag: Dag<u32, f64> = Dag::new();
    dag.connect_with(1, 2, 0.5).unwrap();
    assert!(dag.edge(&2, &1).is_none());
    {
        let edge = dag.edge(&1, &2).unwrap();
        assert_eq!(edge.tail(), &1);
        assert_eq!(edge.head(), &2);
        assert_eq!(edge.data(), Some(0.5));
    }
    let mut edge = dag.edge_mut(&1, &2).unwrap();
    assert!(edge.set_data(2.0));
    assert_eq!(edge.data(), Some(2.0));
    assert_eq!(edge.delete(), Some(2.0));
    assert_eq!(dag.edge_count(), 0);
}

#[test]
fn test_graph_view_contract() {
    fn count_edges<G: GraphView<u32> + ?Sized>(graph: &G) -> usize {
        graph.nodes().iter().map(|n| graph.children_of(n).len()).sum()
    }
    let mut dag: Dag<u32> = Dag::new();
    dag.connect(1, 2).unwrap();
    dag.connect(1, 3).unwrap();
    assert_eq!(count_edges(&dag), 2);
    assert_eq!(GraphView::node_count(&dag), 3);
}
