//! Directed acyclic graph over named variables.
//!
//! Storage is a `petgraph` `DiGraph`; because nodes are never removed, a
//! node's `NodeIndex` doubles as its insertion rank, which is what parent
//! ordering and topological tie-breaking are keyed on.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::Direction;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};

use crate::domain::Variable;
use crate::error::{CausalError, Result};

/// Causal DAG. An edge `X -> Y` reads "X causes Y".
#[derive(Debug, Clone, Default)]
pub struct CausalGraph {
    graph: DiGraph<Variable, ()>,
    index: HashMap<Variable, NodeIndex>,
}

impl CausalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(parent, child)` pairs, in order.
    pub fn from_edges<I, V>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (V, V)>,
        V: Into<Variable>,
    {
        let mut graph = Self::new();
        for (parent, child) in edges {
            graph.add_edge(parent, child)?;
        }
        Ok(graph)
    }

    /// Insert a node if it is not already present.
    pub fn add_node(&mut self, node: impl Into<Variable>) -> bool {
        let node = node.into();
        if self.index.contains_key(&node) {
            return false;
        }
        self.insert(node);
        true
    }

    fn insert(&mut self, node: Variable) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node) {
            return idx;
        }
        let idx = self.graph.add_node(node.clone());
        self.index.insert(node, idx);
        idx
    }

    /// Add `parent -> child`, creating missing endpoints.
    ///
    /// Fails with [`CausalError::Cycle`] (and leaves the graph untouched) if the
    /// edge would close a cycle. Re-adding an existing edge is a no-op.
    pub fn add_edge(&mut self, parent: impl Into<Variable>, child: impl Into<Variable>) -> Result<()> {
        let parent = parent.into();
        let child = child.into();

        let cycle = || CausalError::Cycle {
            parent: parent.to_string(),
            child: child.to_string(),
        };
        if parent == child {
            return Err(cycle());
        }
        if let (Some(&p), Some(&c)) = (self.index.get(&parent), self.index.get(&child)) {
            if self.graph.find_edge(p, c).is_some() {
                return Ok(());
            }
            if has_path_connecting(&self.graph, c, p, None) {
                return Err(cycle());
            }
        }

        let p = self.insert(parent);
        let c = self.insert(child);
        self.graph.add_edge(p, c, ());
        Ok(())
    }

    pub fn contains(&self, node: &str) -> bool {
        self.index.contains_key(node)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Variable> {
        self.graph.node_indices().map(move |i| &self.graph[i])
    }

    /// `(parent, child)` pairs in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&Variable, &Variable)> {
        self.graph
            .edge_references()
            .map(move |e| (&self.graph[e.source()], &self.graph[e.target()]))
    }

    fn idx(&self, node: &str) -> Result<NodeIndex> {
        self.index
            .get(node)
            .copied()
            .ok_or_else(|| CausalError::UnknownNode(node.to_string()))
    }

    fn neighbors_sorted(&self, idx: NodeIndex, dir: Direction) -> Vec<Variable> {
        let mut out: Vec<NodeIndex> = self.graph.neighbors_directed(idx, dir).collect();
        out.sort();
        out.into_iter().map(|i| self.graph[i].clone()).collect()
    }

    /// Direct parents, ordered by node insertion order.
    pub fn parents_of(&self, node: &str) -> Result<Vec<Variable>> {
        let idx = self.idx(node)?;
        Ok(self.neighbors_sorted(idx, Direction::Incoming))
    }

    /// Direct children, ordered by node insertion order.
    pub fn children_of(&self, node: &str) -> Result<Vec<Variable>> {
        let idx = self.idx(node)?;
        Ok(self.neighbors_sorted(idx, Direction::Outgoing))
    }

    pub fn is_root(&self, node: &str) -> Result<bool> {
        let idx = self.idx(node)?;
        Ok(self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
            .is_none())
    }

    pub fn has_edge(&self, parent: &str, child: &str) -> bool {
        match (self.index.get(parent), self.index.get(child)) {
            (Some(&p), Some(&c)) => self.graph.find_edge(p, c).is_some(),
            _ => false,
        }
    }

    /// True if a directed path of length >= 1 leads from `from` to `to`.
    pub fn has_directed_path(&self, from: &str, to: &str) -> Result<bool> {
        let a = self.idx(from)?;
        let b = self.idx(to)?;
        if a == b {
            return Ok(false);
        }
        Ok(has_path_connecting(&self.graph, a, b, None))
    }

    /// All nodes reachable from `node` (excluding itself), in insertion order.
    pub fn descendants_of(&self, node: &str) -> Result<Vec<Variable>> {
        let start = self.idx(node)?;
        let mut seen = Vec::new();
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(idx) = dfs.next(&self.graph) {
            if idx != start {
                seen.push(idx);
            }
        }
        seen.sort();
        Ok(seen.into_iter().map(|i| self.graph[i].clone()).collect())
    }

    /// Lazy topological order; ties broken by node insertion order.
    ///
    /// Each call starts a fresh traversal.
    pub fn topological_order(&self) -> TopologicalOrder<'_> {
        let in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|i| self.graph.neighbors_directed(i, Direction::Incoming).count())
            .collect();
        let ready = in_degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| Reverse(i))
            .collect();
        TopologicalOrder {
            graph: self,
            in_degree,
            ready,
        }
    }
}

/// Iterator returned by [`CausalGraph::topological_order`] (Kahn's algorithm).
#[derive(Debug, Clone)]
pub struct TopologicalOrder<'a> {
    graph: &'a CausalGraph,
    in_degree: Vec<usize>,
    ready: BinaryHeap<Reverse<usize>>,
}

impl<'a> Iterator for TopologicalOrder<'a> {
    type Item = &'a Variable;

    fn next(&mut self) -> Option<Self::Item> {
        let Reverse(i) = self.ready.pop()?;
        let g = &self.graph.graph;
        let idx = NodeIndex::new(i);
        for child in g.neighbors_directed(idx, Direction::Outgoing) {
            let d = &mut self.in_degree[child.index()];
            *d -= 1;
            if *d == 0 {
                self.ready.push(Reverse(child.index()));
            }
        }
        Some(&g[idx])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.ready.len(), Some(self.graph.node_count()))
    }
}
