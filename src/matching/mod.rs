//! Completeness scoring engine.
//!
//! This module provides the scoring functionality:
//!
//! - [`scoring`]: scores one compiled graph against one observed identifier set
//! - [`engine`]: runs the scorer over every relevant module for each sample
//! - [`report`]: formats results as tab-separated summaries
//!
//! ## Scoring Algorithm
//!
//! 1. Every edge whose identifier was observed is marked satisfied in a
//!    per-query copy of the edge weights (the compiled graph is never touched).
//! 2. All start-to-end paths are enumerated in topological order.
//! 3. Each path's metric is its unsatisfied weight divided by its total weight.
//!    A path of only optional steps has metric 0.
//! 4. The first path with the smallest metric is the best path;
//!    completeness is `(1 - metric) * 100`, rounded to two decimals.
//! 5. Observed identifiers on the best path are *matching*; unobserved,
//!    non-optional ones are *missing*.
//!
//! Path order is canonical: incoming edges of each node are visited by source
//! node, then registration order. For `K1 (K2,K3)` with only `K1` observed,
//! the best path goes through `K2`.
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashSet;
//! use kegg_completeness::matching::scoring::score_pathway;
//! use kegg_completeness::parsing::definition::compile_definition;
//!
//! let graph = compile_definition("M1", "K1 (K2,K3)").unwrap();
//! let observed: HashSet<String> = ["K1".to_string()].into_iter().collect();
//! let outcome = score_pathway(&graph, &observed, 1_000_000).unwrap();
//!
//! assert_eq!(outcome.percentage, Some(50.0));
//! assert!(outcome.missing.contains("K2"));
//! ```

pub mod engine;
pub mod report;
pub mod scoring;
