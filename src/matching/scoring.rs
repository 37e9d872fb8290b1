use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;
use thiserror::Error;

use crate::core::graph::{EdgeId, NodeId, PathwayGraph, END_NODE, START_NODE};
use crate::utils::validation::check_path_limit;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("More than {limit} paths reach node {node}")]
    TooManyPaths { node: NodeId, limit: usize },
}

/// A start-to-node path built during enumeration
#[derive(Debug, Clone)]
struct PathRecord {
    edges: Vec<EdgeId>,
    weight: f64,
    weight_new: f64,
}

impl PathRecord {
    fn empty() -> Self {
        Self {
            edges: Vec::new(),
            weight: 0.0,
            weight_new: 0.0,
        }
    }

    fn extend(&self, edge: EdgeId, weight: f64, weight_new: f64) -> Self {
        let mut edges = Vec::with_capacity(self.edges.len() + 1);
        edges.extend_from_slice(&self.edges);
        edges.push(edge);
        Self {
            edges,
            weight: self.weight + weight,
            weight_new: self.weight_new + weight_new,
        }
    }

    /// Unsatisfied share of the path's weight; an all-optional path counts as satisfied
    fn metric(&self) -> f64 {
        if self.weight == 0.0 {
            0.0
        } else {
            self.weight_new / self.weight
        }
    }
}

/// Result of scoring one graph against one observed set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreOutcome {
    /// Completeness rounded to two decimals; `None` when nothing on the best path is satisfied
    pub percentage: Option<f64>,

    /// Number of paths sharing the minimum metric
    pub candidate_count: usize,

    /// Number of start-to-end paths enumerated
    pub path_count: usize,

    /// Edges of the selected path, start to end
    pub best_path: Vec<EdgeId>,

    pub matching: BTreeSet<String>,
    pub missing: BTreeSet<String>,

    /// Compiled weight of each identifier's edge on the selected path
    pub path_weights: BTreeMap<String, f64>,
}

impl ScoreOutcome {
    fn no_paths() -> Self {
        Self {
            percentage: None,
            candidate_count: 0,
            path_count: 0,
            best_path: Vec::new(),
            matching: BTreeSet::new(),
            missing: BTreeSet::new(),
            path_weights: BTreeMap::new(),
        }
    }
}

/// Round to two decimals, exact halves to the even neighbour (`90.625` -> `90.62`)
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Score `graph` against `observed`.
///
/// Every start-to-end path is enumerated in topological order; the first path
/// (in canonical order) with the smallest unsatisfied share of weight is selected.
/// The graph itself is not modified.
///
/// Enumeration is exponential in the number of nested alternatives; `max_paths`
/// bounds the number of records any single node may collect.
///
/// # Errors
///
/// Returns `ScoreError::TooManyPaths` if a node would exceed `max_paths` records.
#[allow(clippy::implicit_hasher)]
pub fn score_pathway(
    graph: &PathwayGraph,
    observed: &HashSet<String>,
    max_paths: usize,
) -> Result<ScoreOutcome, ScoreError> {
    let mut snapshot = graph.snapshot_for_query();
    for label in graph.labels().filter(|l| observed.contains(*l)) {
        for &edge in graph.edges_by_label(label) {
            snapshot.satisfy(edge);
        }
    }

    let mut records: Vec<Vec<PathRecord>> = vec![Vec::new(); graph.node_count()];
    for &node in graph.topological_order() {
        if node == START_NODE {
            records[node] = vec![PathRecord::empty()];
            continue;
        }

        let mut reaching = Vec::new();
        for (edge, pred) in graph.predecessors_of(node) {
            let weight = graph.edge(edge).weight;
            let weight_new = snapshot.get(edge);
            for parent in &records[pred] {
                if check_path_limit(reaching.len(), max_paths).is_some() {
                    return Err(ScoreError::TooManyPaths {
                        node,
                        limit: max_paths,
                    });
                }
                reaching.push(parent.extend(edge, weight, weight_new));
            }
        }
        records[node] = reaching;
    }

    let Some(finals) = records.get(END_NODE).filter(|r| !r.is_empty()) else {
        return Ok(ScoreOutcome::no_paths());
    };

    let mut best = 0;
    let mut best_metric = f64::INFINITY;
    let mut candidate_count = 0;
    for (i, record) in finals.iter().enumerate() {
        let metric = record.metric();
        if metric < best_metric {
            best = i;
            best_metric = metric;
            candidate_count = 1;
        } else if metric == best_metric {
            candidate_count += 1;
        }
    }

    let best_path = finals[best].edges.clone();
    let percentage = round2((1.0 - best_metric) * 100.0);

    let mut matching = BTreeSet::new();
    let mut missing = BTreeSet::new();
    let mut path_weights = BTreeMap::new();
    for &edge in &best_path {
        let edge = graph.edge(edge);
        path_weights
            .entry(edge.label.clone())
            .or_insert_with(|| round2(edge.weight));
        if observed.contains(&edge.label) {
            matching.insert(edge.label.clone());
        } else if !graph.is_optional(&edge.label) {
            missing.insert(edge.label.clone());
        }
    }

    Ok(ScoreOutcome {
        percentage: (percentage > 0.0).then_some(percentage),
        candidate_count,
        path_count: finals.len(),
        best_path,
        matching,
        missing,
        path_weights,
    })
}
