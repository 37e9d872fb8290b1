//! # kegg-completeness
//!
//! A library for scoring how complete KEGG modules are, given the KO
//! identifiers observed in a genome, contig, or sample.
//!
//! Each module is defined by a small expression language: spaces and `+`
//! join required steps, commas separate alternatives, brackets group, and a
//! leading `-` marks a step as optional. A definition is compiled once into a
//! weighted directed graph; scoring then finds the start-to-end path that best
//! explains the observed identifiers.
//!
//! ## Features
//!
//! - **One-time compilation**: graphs are saved with bincode and reused across runs
//! - **Best-path scoring**: completeness, matching, and missing identifiers per module
//! - **Deterministic ties**: equally good paths are resolved in a fixed canonical order
//! - **Batch runs**: aggregate and per-sample summaries, scored in parallel
//!
//! ## Example
//!
//! ```rust
//! use kegg_completeness::{CompletenessConfig, CompletenessEngine, MetadataTable, SampleSet};
//! use kegg_completeness::catalog::builder::CatalogBuilder;
//! use kegg_completeness::parsing::modules::parse_module_lines;
//!
//! let lines = parse_module_lines("M00001:K00844 (K01810,K06859)\n").unwrap();
//! let mut builder = CatalogBuilder::default();
//! builder.add_lines(&lines).unwrap();
//! let (catalog, _) = builder.build();
//!
//! let mut samples = SampleSet::new();
//! samples.add("genome_1", ["K00844", "K06859"]);
//!
//! let metadata = MetadataTable::new();
//! let engine = CompletenessEngine::new(&catalog, &metadata, CompletenessConfig::default());
//! let report = engine.run(&samples);
//!
//! assert_eq!(report.summary[0].percentage, 100.0);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Graph, module, and sample types
//! - [`parsing`]: Definition compiler and input file parsers
//! - [`catalog`]: Compiled module storage, indexing, and metadata
//! - [`matching`]: Path scoring, batch engine, and TSV reports
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::metadata::MetadataTable;
pub use catalog::store::ModuleCatalog;
pub use core::graph::PathwayGraph;
pub use core::module::{CompiledModule, ModuleMetadata};
pub use core::sample::{Sample, SampleSet};
pub use core::types::*;
pub use matching::engine::{CompletenessConfig, CompletenessEngine, CompletenessRecord};
pub use parsing::definition::compile_definition;
