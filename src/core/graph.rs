//! Compiled pathway graph.
//!
//! A [`PathwayGraph`] is an arena of integer nodes plus a flat edge list.
//! Parallel edges between the same pair of nodes are separate entries in the
//! edge list. Node `0` is the start and node `1` is the end of every graph.
//!
//! The structure is immutable once compiled. Per-query state (`weight_new`)
//! lives in a [`WeightSnapshot`] owned by the caller, so any number of queries
//! can run against one shared graph.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

/// Index of a node in a [`PathwayGraph`]
pub type NodeId = usize;

/// Index of an edge in a [`PathwayGraph`] (registration order)
pub type EdgeId = usize;

/// Distinguished start node
pub const START_NODE: NodeId = 0;

/// Distinguished end node
pub const END_NODE: NodeId = 1;

/// Label used for the explicit "no step here" marker (`--`)
pub const MISSING_STEP_LABEL: &str = "K00000";

/// A directed, labelled, weighted edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,

    /// Identifier (KO) carried by this edge
    pub label: String,

    /// Compiled weight; fixed after compilation
    pub weight: f64,

    /// Edge comes from an optional marker and is never reported as missing
    #[serde(default)]
    pub optional: bool,
}

/// Compiled graph for one module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathwayGraph {
    node_count: usize,

    edges: Vec<Edge>,

    /// Labels carried by at least one optional edge; never reported missing
    optional_labels: BTreeSet<String>,

    // === Derived, rebuilt on load ===
    /// label -> edges carrying it, in registration order
    #[serde(skip)]
    label_index: HashMap<String, Vec<EdgeId>>,

    /// node -> incoming edges, ordered by (source node, registration order)
    #[serde(skip)]
    incoming: Vec<Vec<EdgeId>>,

    #[serde(skip)]
    topo_order: Vec<NodeId>,
}

impl PathwayGraph {
    /// Create a graph holding only the start and end nodes
    #[must_use]
    pub fn new() -> Self {
        Self {
            node_count: 2,
            edges: Vec::new(),
            optional_labels: BTreeSet::new(),
            label_index: HashMap::new(),
            incoming: vec![Vec::new(), Vec::new()],
            topo_order: Vec::new(),
        }
    }

    /// Allocate a fresh intermediate node
    pub fn add_node(&mut self) -> NodeId {
        let id = self.node_count;
        self.node_count += 1;
        self.incoming.push(Vec::new());
        id
    }

    /// Register an edge. Both endpoints must already exist.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        label: impl Into<String>,
        weight: f64,
        optional: bool,
    ) -> EdgeId {
        debug_assert!(from < self.node_count && to < self.node_count);

        let id = self.edges.len();
        let label = label.into();

        self.label_index.entry(label.clone()).or_default().push(id);
        if optional {
            self.optional_labels.insert(label.clone());
        }

        let edges = &self.edges;
        let slot = &mut self.incoming[to];
        let pos = slot.partition_point(|&e| edges[e].from <= from);
        slot.insert(pos, id);

        self.edges.push(Edge {
            from,
            to,
            label,
            weight,
            optional,
        });

        // Structure changed; order is recomputed by `rebuild_indexes`
        self.topo_order.clear();
        id
    }

    /// Recompute every derived index from the node count and edge list.
    ///
    /// Called once after compilation and after deserialization.
    pub fn rebuild_indexes(&mut self) {
        self.label_index.clear();
        self.incoming = vec![Vec::new(); self.node_count];

        for (id, edge) in self.edges.iter().enumerate() {
            self.label_index
                .entry(edge.label.clone())
                .or_default()
                .push(id);
            if edge.to < self.node_count {
                self.incoming[edge.to].push(id);
            }
        }

        let edges = &self.edges;
        for slot in &mut self.incoming {
            slot.sort_by_key(|&e| (edges[e].from, e));
        }

        self.topo_order = self.compute_topological_order();
    }

    /// Kahn's algorithm, smallest ready node first
    fn compute_topological_order(&self) -> Vec<NodeId> {
        let mut in_degree = vec![0usize; self.node_count];
        let mut outgoing: Vec<Vec<NodeId>> = vec![Vec::new(); self.node_count];
        for edge in &self.edges {
            if edge.from >= self.node_count || edge.to >= self.node_count {
                continue;
            }
            in_degree[edge.to] += 1;
            outgoing[edge.from].push(edge.to);
        }

        let mut ready: BinaryHeap<Reverse<NodeId>> = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d == 0)
            .map(|(n, _)| Reverse(n))
            .collect();

        let mut order = Vec::with_capacity(self.node_count);
        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for &next in &outgoing[node] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }
        order
    }

    /// Check the invariants a compiled graph must satisfy: endpoints in range,
    /// acyclic, and the end node reachable in the topological order.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let endpoints_ok = self
            .edges
            .iter()
            .all(|e| e.from < self.node_count && e.to < self.node_count);
        endpoints_ok && self.node_count >= 2 && self.topo_order.len() == self.node_count
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    /// Edges carrying `label`, in registration order
    #[must_use]
    pub fn edges_by_label(&self, label: &str) -> &[EdgeId] {
        self.label_index.get(label).map_or(&[], Vec::as_slice)
    }

    /// All distinct labels used by this graph
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.label_index.keys().map(String::as_str)
    }

    #[must_use]
    pub fn optional_labels(&self) -> &BTreeSet<String> {
        &self.optional_labels
    }

    #[must_use]
    pub fn is_optional(&self, label: &str) -> bool {
        self.optional_labels.contains(label)
    }

    /// Incoming edges of `node` as `(edge, predecessor)` pairs in canonical order
    pub fn predecessors_of(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, NodeId)> + '_ {
        self.incoming
            .get(node)
            .into_iter()
            .flatten()
            .map(move |&e| (e, self.edges[e].from))
    }

    /// Nodes in topological order (cached at compile/load time)
    #[must_use]
    pub fn topological_order(&self) -> &[NodeId] {
        &self.topo_order
    }

    /// Fresh per-query copy of `weight_new` (all equal to `weight`)
    #[must_use]
    pub fn snapshot_for_query(&self) -> WeightSnapshot {
        WeightSnapshot {
            weight_new: self.edges.iter().map(|e| e.weight).collect(),
        }
    }

    /// Number of distinct start-to-end paths, saturating at `u64::MAX`
    #[must_use]
    pub fn path_count(&self) -> u64 {
        let mut counts = vec![0u64; self.node_count];
        for &node in &self.topo_order {
            if node == START_NODE {
                counts[node] = 1;
                continue;
            }
            counts[node] = self
                .predecessors_of(node)
                .fold(0u64, |acc, (_, pred)| acc.saturating_add(counts[pred]));
        }
        counts.get(END_NODE).copied().unwrap_or(0)
    }
}

impl Default for PathwayGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PathwayGraph {
    fn eq(&self, other: &Self) -> bool {
        self.node_count == other.node_count
            && self.edges == other.edges
            && self.optional_labels == other.optional_labels
    }
}

/// Per-query mutable copy of the `weight_new` value of every edge
#[derive(Debug, Clone)]
pub struct WeightSnapshot {
    weight_new: Vec<f64>,
}

impl WeightSnapshot {
    #[must_use]
    pub fn get(&self, edge: EdgeId) -> f64 {
        self.weight_new[edge]
    }

    /// Mark an edge as satisfied
    pub fn satisfy(&mut self, edge: EdgeId) {
        self.weight_new[edge] = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> PathwayGraph {
        // 0 -A-> 2 -B-> 1, plus 2 -C-> 1
        let mut g = PathwayGraph::new();
        let mid = g.add_node();
        g.add_edge(START_NODE, mid, "A", 0.5, false);
        g.add_edge(mid, END_NODE, "B", 0.5, false);
        g.add_edge(mid, END_NODE, "C", 0.5, false);
        g.rebuild_indexes();
        g
    }

    #[test]
    fn test_new_graph_has_start_and_end() {
        let g = PathwayGraph::new();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_topological_order_puts_end_last() {
        let g = chain();
        assert_eq!(g.topological_order(), &[0, 2, 1]);
        assert!(g.is_well_formed());
    }

    #[test]
    fn test_predecessors_in_registration_order() {
        let g = chain();
        let preds: Vec<_> = g.predecessors_of(END_NODE).collect();
        assert_eq!(preds, vec![(1, 2), (2, 2)]);
        assert_eq!(g.predecessors_of(START_NODE).count(), 0);
    }

    #[test]
    fn test_incoming_sorted_by_source_node() {
        let mut g = PathwayGraph::new();
        let a = g.add_node();
        let b = g.add_node();
        g.add_edge(b, END_NODE, "X", 1.0, false);
        g.add_edge(a, END_NODE, "Y", 1.0, false);
        g.add_edge(START_NODE, a, "P", 1.0, false);
        g.add_edge(START_NODE, b, "Q", 1.0, false);
        let incremental: Vec<_> = g.predecessors_of(END_NODE).collect();
        g.rebuild_indexes();
        let rebuilt: Vec<_> = g.predecessors_of(END_NODE).collect();
        assert_eq!(incremental, vec![(1, a), (0, b)]);
        assert_eq!(incremental, rebuilt);
    }

    #[test]
    fn test_label_index_and_optional() {
        let mut g = PathwayGraph::new();
        g.add_edge(START_NODE, END_NODE, "K1", 1.0, false);
        g.add_edge(START_NODE, END_NODE, "K2", 0.0, true);
        g.rebuild_indexes();

        assert_eq!(g.edges_by_label("K1"), &[0]);
        assert!(g.edges_by_label("K9").is_empty());
        assert_eq!(g.edges_by_label("K2"), &[1]);
        assert!(g.is_optional("K2"));
        assert!(!g.is_optional("K1"));
    }

    #[test]
    fn test_snapshot_is_isolated() {
        let g = chain();
        let mut snap = g.snapshot_for_query();
        snap.satisfy(0);
        assert!((snap.get(0) - 0.0).abs() < f64::EPSILON);
        assert!((g.edge(0).weight - 0.5).abs() < f64::EPSILON);
        assert!((g.snapshot_for_query().get(0) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_path_count() {
        assert_eq!(chain().path_count(), 2);
    }

    #[test]
    fn test_cycle_is_not_well_formed() {
        let mut g = PathwayGraph::new();
        let a = g.add_node();
        g.add_edge(START_NODE, a, "A", 1.0, false);
        g.add_edge(a, END_NODE, "B", 1.0, false);
        g.add_edge(END_NODE, a, "C", 1.0, false);
        g.rebuild_indexes();
        assert!(!g.is_well_formed());
    }

    #[test]
    fn test_serde_skips_derived_indexes() {
        let g = chain();
        let json = serde_json::to_string(&g).unwrap();
        assert!(!json.contains("topo_order"));

        let mut back: PathwayGraph = serde_json::from_str(&json).unwrap();
        assert!(back.topological_order().is_empty());
        back.rebuild_indexes();
        assert_eq!(back, g);
        assert_eq!(back.topological_order(), g.topological_order());
        assert_eq!(back.edges_by_label("C"), &[2]);
    }
}
