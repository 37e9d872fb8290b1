//! Parsers for module definitions and observed-identifier inputs.
//!
//! This module provides:
//!
//! - **Definition expressions**: compile one module definition into a graph ([`definition`])
//! - **`id:text` list files**: module definitions, names, and classes ([`modules`])
//! - **Identifier inputs**: per-sample tables and single delimited lists ([`ko_input`])
//! - **KEGG flat-file entries**: `ENTRY`/`NAME`/`CLASS`/`DEFINITION` records ([`kegg_entry`])
//!
//! All file loaders read gzip-compressed input transparently when the path ends in `.gz`.
//!
//! ## Example
//!
//! ```rust
//! use kegg_completeness::parsing::definition::compile_definition;
//!
//! let graph = compile_definition("M00001", "K00844 (K01810,K06859)").unwrap();
//! assert_eq!(graph.edge_count(), 3);
//! ```

pub mod definition;
pub mod kegg_entry;
pub mod ko_input;
pub mod modules;

use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input format: {0}")]
    InvalidFormat(String),

    #[error("No identifiers found in {0}")]
    NoIdentifiers(String),

    #[error("Too many samples: {0} exceeds maximum allowed")]
    TooManySamples(usize),
}

/// Read a whole text file, decompressing it first if the name ends in `.gz`
///
/// # Errors
///
/// Returns `InputError::Io` if the file cannot be opened, decompressed, or is not UTF-8.
pub fn read_text(path: &Path) -> Result<String, InputError> {
    let is_gzipped = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"));

    if is_gzipped {
        let file = std::fs::File::open(path)?;
        let mut decoder = GzDecoder::new(file);
        let mut content = String::new();
        decoder.read_to_string(&mut content)?;
        Ok(content)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}
