use std::collections::HashMap;

use causal_scm::{CausalError, CausalGraph};
use proptest::prelude::*;

fn name(i: usize) -> String {
    format!("v{i}")
}

/// Random DAG over `n` nodes: edges only go from lower to higher index.
fn dag_edges() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..12).prop_flat_map(|n| {
        let pair = (0..n, 0..n).prop_filter_map("forward edge", |(a, b)| {
            if a < b { Some((a, b)) } else { None }
        });
        (Just(n), prop::collection::vec(pair, 0..30))
    })
}

proptest! {
    #[test]
    fn topological_order_respects_every_edge((n, edges) in dag_edges()) {
        let mut graph = CausalGraph::new();
        for i in (0..n).rev() {
            graph.add_node(name(i));
        }
        for (a, b) in &edges {
            graph.add_edge(name(*a), name(*b)).unwrap();
        }

        let order: Vec<String> = graph.topological_order().map(|v| v.to_string()).collect();
        prop_assert_eq!(order.len(), n);
        let position: HashMap<&str, usize> = order.iter().enumerate().map(|(i, v)| (v.as_str(), i)).collect();
        for (parent, child) in graph.edges() {
            prop_assert!(position[parent.as_str()] < position[child.as_str()]);
        }

        // Repeated traversals agree.
        let again: Vec<String> = graph.topological_order().map(|v| v.to_string()).collect();
        prop_assert_eq!(order, again);
    }

    #[test]
    fn back_edges_are_rejected_without_mutation((_n, edges) in dag_edges()) {
        let mut graph = CausalGraph::new();
        for (a, b) in &edges {
            graph.add_edge(name(*a), name(*b)).unwrap();
        }
        prop_assume!(!edges.is_empty());
        let (a, b) = edges[0];
        let before = graph.edge_count();
        let err = graph.add_edge(name(b), name(a)).unwrap_err();
        let is_cycle = matches!(err, CausalError::Cycle { .. });
        prop_assert!(is_cycle);
        prop_assert_eq!(graph.edge_count(), before);
    }
}

#[test]
fn ties_follow_insertion_order() {
    let mut graph = CausalGraph::new();
    for v in ["c", "a", "b"] {
        graph.add_node(v);
    }
    graph.add_edge("b", "a").unwrap();
    let order: Vec<&str> = graph.topological_order().map(|v| v.as_str()).collect();
    assert_eq!(order, vec!["c", "b", "a"]);
}
