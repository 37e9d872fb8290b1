//! Core data types for module completeness scoring.
//!
//! - [`graph`]: the compiled [`PathwayGraph`](graph::PathwayGraph) of one module
//! - [`module`]: module identity, display metadata, and compiled modules
//! - [`sample`]: named groups of observed identifiers
//! - [`types`]: small shared enums and newtypes
//!
//! ## Identifiers
//!
//! Identifiers (KO codes such as `K00844`) are opaque strings. Nothing in the
//! crate inspects their format; two identifiers match only if the strings are
//! equal.

pub mod graph;
pub mod module;
pub mod sample;
pub mod types;
