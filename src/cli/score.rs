//! Score command - compile one definition and score it against one identifier list.
//!
//! Useful for checking a definition by hand without a graph file.

use std::collections::HashSet;

use clap::Args;

use crate::cli::OutputFormat;
use crate::matching::report::{format_decimal, format_labels};
use crate::matching::scoring::{score_pathway, ScoreOutcome};
use crate::parsing::definition::compile_definition;
use crate::utils::validation::DEFAULT_MAX_PATHS;

/// Arguments for the score command
#[derive(Args)]
pub struct ScoreArgs {
    /// Module definition, e.g. "K00844 (K01810,K06859)"
    #[arg(short = 'd', long, required = true)]
    pub definition: String,

    /// Observed identifiers, separated by --separator
    #[arg(short = 'k', long, default_value = "")]
    pub kos: String,

    /// Separator for --kos
    #[arg(short = 's', long, default_value = ",")]
    pub separator: String,

    /// Module id used in messages and output
    #[arg(long, default_value = "query")]
    pub module: String,

    /// Annotate identifiers with their compiled weight
    #[arg(short = 'w', long)]
    pub include_weights: bool,

    /// Give up when any step is reached by more than this many paths
    #[arg(long, default_value_t = DEFAULT_MAX_PATHS)]
    pub max_paths: usize,
}

/// Execute the score command
///
/// # Errors
///
/// Returns an error if the definition does not parse or has too many paths.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: ScoreArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let graph = compile_definition(&args.module, &args.definition)?;
    if verbose {
        eprintln!(
            "Compiled {}: {} nodes, {} edges, {} paths",
            args.module,
            graph.node_count(),
            graph.edge_count(),
            graph.path_count()
        );
    }

    let observed: HashSet<String> = args
        .kos
        .split(args.separator.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let outcome = score_pathway(&graph, &observed, args.max_paths)?;

    match format {
        OutputFormat::Text => print_text_result(&args, &outcome),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "module": args.module,
                "definition": args.definition,
                "outcome": outcome,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            let weights = args.include_weights.then_some(&outcome.path_weights);
            println!("module\tcompleteness\tmatching_ko\tmissing_ko\tbest_paths\ttotal_paths");
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                args.module,
                outcome.percentage.map(format_decimal).unwrap_or_default(),
                format_labels(&sorted(&outcome.matching), weights),
                format_labels(&sorted(&outcome.missing), weights),
                outcome.candidate_count,
                outcome.path_count,
            );
        }
    }

    Ok(())
}

fn sorted(labels: &std::collections::BTreeSet<String>) -> Vec<String> {
    labels.iter().cloned().collect()
}

fn print_text_result(args: &ScoreArgs, outcome: &ScoreOutcome) {
    let weights = args.include_weights.then_some(&outcome.path_weights);

    println!("Module:       {}", args.module);
    println!("Definition:   {}", args.definition);
    match outcome.percentage {
        Some(p) => println!("Completeness: {}%", format_decimal(p)),
        None => println!("Completeness: none of the best path is observed"),
    }
    println!("Matching:     {}", format_labels(&sorted(&outcome.matching), weights));
    println!("Missing:      {}", format_labels(&sorted(&outcome.missing), weights));
    println!(
        "Paths:        {} best of {} total",
        outcome.candidate_count, outcome.path_count
    );
}
