//! Compiled module storage and indexing.
//!
//! A catalog holds one compiled [`PathwayGraph`](crate::core::graph::PathwayGraph)
//! per module. Compiling every definition is done once; the result is saved
//! with bincode and reloaded by later runs without re-parsing.
//!
//! ## Example
//!
//! ```rust,no_run
//! use kegg_completeness::catalog::builder::{CatalogBuilder, ParseErrorPolicy};
//! use kegg_completeness::parsing::modules::load_module_lines;
//! use std::path::Path;
//!
//! let lines = load_module_lines(Path::new("all_pathways.txt")).unwrap();
//! let mut builder = CatalogBuilder::new(ParseErrorPolicy::Skip);
//! builder.add_lines(&lines).unwrap();
//! let (catalog, report) = builder.build();
//!
//! catalog.save_to_file(Path::new("graphs.bin")).unwrap();
//! println!("{report}");
//! ```
//!
//! ## Staleness
//!
//! Each compiled module stores the MD5 of the definition it came from. When a
//! saved catalog is used together with a definitions file, modules whose
//! definition changed since compilation are reported.

pub mod builder;
pub mod index;
pub mod metadata;
pub mod store;
