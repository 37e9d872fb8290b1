//! Command-line interface for kegg-completeness.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **compile**: Compile module definitions into a reusable graph file
//! - **completeness**: Score identifier sets against every module and write summaries
//! - **score**: Score one definition against one identifier list
//! - **modules**: List or inspect compiled modules
//! - **import**: Convert KEGG flat-file module entries into `id:text` lists
//!
//! ## Usage
//!
//! ```text
//! # Compile once
//! kegg-completeness compile -a all_pathways.txt -o graphs.bin
//!
//! # Per-contig completeness with weights
//! kegg-completeness completeness -i contigs.tsv -g graphs.bin \
//!     -n all_pathways_names.txt -c all_pathways_class.txt -o out --per-sample -w
//!
//! # Quick check of one definition
//! kegg-completeness score --definition "K1 (K2,K3)" --kos K1,K2
//! ```

use std::path::Path;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::catalog::builder::{CatalogBuilder, ParseErrorPolicy};
use crate::catalog::store::ModuleCatalog;
use crate::parsing::modules::load_module_lines;

pub mod compile;
pub mod completeness;
pub mod import;
pub mod modules;
pub mod score;

#[derive(Parser)]
#[command(name = "kegg-completeness")]
#[command(version)]
#[command(about = "Compute KEGG module completeness from observed KO identifiers")]
#[command(
    long_about = "kegg-completeness compiles KEGG module definitions into weighted graphs and scores how complete each module is for a set of observed KO identifiers.\n\nFor every module it reports:\n- The completeness percentage of the best-explaining path\n- The observed identifiers on that path\n- The required identifiers still missing"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile module definitions into a graph file
    Compile(compile::CompileArgs),

    /// Compute module completeness for identifier sets
    Completeness(completeness::CompletenessArgs),

    /// Score a single definition against an identifier list
    Score(score::ScoreArgs),

    /// Inspect compiled modules
    Modules(modules::ModulesArgs),

    /// Convert KEGG flat-file module entries into definition, name, and class lists
    Import(import::ImportArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// What to do when a module definition does not parse
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OnErrorArg {
    /// Warn and leave the module out
    #[default]
    Skip,
    /// Stop with an error
    Abort,
}

impl From<OnErrorArg> for ParseErrorPolicy {
    fn from(arg: OnErrorArg) -> Self {
        match arg {
            OnErrorArg::Skip => ParseErrorPolicy::Skip,
            OnErrorArg::Abort => ParseErrorPolicy::Abort,
        }
    }
}

/// Load compiled graphs from `graphs`, or compile them from `definitions`.
///
/// With both given, graphs are loaded and checked against the definitions
/// for staleness.
pub(crate) fn load_catalog(
    graphs: Option<&Path>,
    definitions: Option<&Path>,
    policy: ParseErrorPolicy,
    verbose: bool,
) -> anyhow::Result<ModuleCatalog> {
    let catalog = match (graphs, definitions) {
        (Some(graphs), definitions) => {
            let catalog = ModuleCatalog::load_from_file(graphs)?;
            if let Some(definitions) = definitions {
                let lines = load_module_lines(definitions)?;
                let stale = catalog.stale_modules(&lines);
                for id in &stale {
                    warn!(
                        "Module {} in {} was compiled from a different definition than {}",
                        id,
                        graphs.display(),
                        definitions.display()
                    );
                }
            }
            catalog
        }
        (None, Some(definitions)) => {
            let lines = load_module_lines(definitions)?;
            let mut builder = CatalogBuilder::new(policy);
            builder.add_lines(&lines)?;
            let (catalog, report) = builder.build();
            if verbose && report.has_problems() {
                eprint!("{report}");
            }
            catalog
        }
        (None, None) => anyhow::bail!("Either --graphs or --definitions is required"),
    };

    if verbose {
        eprintln!("Loaded {} compiled modules", catalog.len());
    }
    Ok(catalog)
}

/// Configure the global rayon pool; 0 keeps rayon's default
pub(crate) fn configure_threads(threads: usize) -> anyhow::Result<()> {
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| anyhow::anyhow!("Failed to configure thread pool: {e}"))?;
    }
    Ok(())
}
