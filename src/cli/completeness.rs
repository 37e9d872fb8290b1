//! Completeness command - score identifier sets against every module and
//! write summary tables.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

use crate::catalog::metadata::MetadataTable;
use crate::cli::{configure_threads, load_catalog, OnErrorArg, OutputFormat};
use crate::core::sample::SampleSet;
use crate::matching::engine::{
    CompletenessConfig, CompletenessEngine, CompletenessRecord, CompletenessReport,
};
use crate::matching::report::{self, DEFAULT_OUTPUT_PREFIX};
use crate::parsing::ko_input::{load_ko_list, load_ko_table, DEFAULT_LIST_SEPARATOR};
use crate::utils::validation::DEFAULT_MAX_PATHS;

/// Arguments for the completeness command
#[derive(Args)]
pub struct CompletenessArgs {
    // === Identifier input (one of) ===
    /// Table of `sample<TAB>K1<TAB>K2...`, one sample per line
    #[arg(short = 'i', long = "input", required_unless_present = "input_list", conflicts_with = "input_list")]
    pub input: Option<PathBuf>,

    /// Single delimited list of identifiers, scored as one sample named after the file
    #[arg(short = 'l', long = "input-list")]
    pub input_list: Option<PathBuf>,

    /// Separator for --input-list
    #[arg(short = 's', long, default_value = DEFAULT_LIST_SEPARATOR)]
    pub list_separator: String,

    // === Module data ===
    /// Compiled graphs from the compile command
    #[arg(short = 'g', long, required_unless_present = "definitions")]
    pub graphs: Option<PathBuf>,

    /// Module definitions (`id:definition`); compiled on the fly without --graphs,
    /// checked for staleness with it
    #[arg(short = 'a', long)]
    pub definitions: Option<PathBuf>,

    /// Module names (`id:name`)
    #[arg(short = 'n', long)]
    pub names: Option<PathBuf>,

    /// Module classes (`id:class`)
    #[arg(short = 'c', long)]
    pub classes: Option<PathBuf>,

    // === Output ===
    /// Output directory (created if missing)
    #[arg(short = 'o', long, default_value = ".")]
    pub outdir: PathBuf,

    /// Prefix for output file names
    #[arg(short = 'r', long, default_value = DEFAULT_OUTPUT_PREFIX)]
    pub outprefix: String,

    /// Annotate each identifier with its compiled weight, e.g. K00001(0.5)
    #[arg(short = 'w', long)]
    pub include_weights: bool,

    /// Also write a per-sample table
    #[arg(short = 'm', long, visible_alias = "add-per-contig")]
    pub per_sample: bool,

    // === Resources ===
    /// Worker threads (0 = one per core)
    #[arg(short = 't', long, default_value = "0")]
    pub threads: usize,

    /// Give up on a module when any step is reached by more than this many paths
    #[arg(long, default_value_t = DEFAULT_MAX_PATHS)]
    pub max_paths: usize,

    /// What to do with definitions that do not parse (with --definitions only)
    #[arg(long, value_enum, default_value = "skip")]
    pub on_error: OnErrorArg,
}

/// Execute the completeness command
///
/// # Errors
///
/// Returns an error if inputs cannot be read or parsed, or outputs cannot be written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: CompletenessArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    configure_threads(args.threads)?;

    let samples = load_samples(&args)?;
    if verbose {
        eprintln!(
            "Loaded {} samples with {} distinct identifiers",
            samples.len(),
            samples.identifier_count()
        );
    }

    let catalog = load_catalog(
        args.graphs.as_deref(),
        args.definitions.as_deref(),
        args.on_error.into(),
        verbose,
    )?;
    let metadata = MetadataTable::load(args.names.as_deref(), args.classes.as_deref())?;

    let config = CompletenessConfig {
        include_weights: args.include_weights,
        per_sample: args.per_sample,
        max_paths: args.max_paths,
    };
    let engine = CompletenessEngine::new(&catalog, &metadata, config);
    let report = engine.run(&samples);

    std::fs::create_dir_all(&args.outdir)?;
    let summary_path = write_table(&args, &report.summary, false)?;
    let per_sample_path = if args.per_sample {
        Some(write_table(&args, &report.per_sample, true)?)
    } else {
        None
    };

    match format {
        OutputFormat::Text => {
            print_text_summary(&report, &summary_path, per_sample_path.as_deref());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Tsv => print_module_matching(&report),
    }

    Ok(())
}

fn load_samples(args: &CompletenessArgs) -> anyhow::Result<SampleSet> {
    match (&args.input, &args.input_list) {
        (Some(table), _) => Ok(load_ko_table(table)?),
        (None, Some(list)) => Ok(load_ko_list(list, &args.list_separator)?),
        (None, None) => anyhow::bail!("Either --input or --input-list is required"),
    }
}

fn write_table(
    args: &CompletenessArgs,
    records: &[CompletenessRecord],
    per_sample: bool,
) -> anyhow::Result<PathBuf> {
    let name = report::output_file_name(&args.outprefix, per_sample, args.include_weights);
    let path = args.outdir.join(name);

    let mut out = BufWriter::new(File::create(&path)?);
    report::write_tsv(&mut out, records, per_sample, args.include_weights)?;
    out.flush()?;

    info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(path)
}

fn print_text_summary(report: &CompletenessReport, summary: &Path, per_sample: Option<&Path>) {
    println!(
        "{} modules with completeness > 0 ({} complete)",
        report.summary.len(),
        report
            .summary
            .iter()
            .filter(|r| r.percentage >= 100.0)
            .count()
    );
    println!("Summary:    {}", summary.display());
    if let Some(path) = per_sample {
        println!("Per sample: {} ({} rows)", path.display(), report.per_sample.len());
    }
    if !report.failures.is_empty() {
        println!("Skipped {} module scorings:", report.failures.len());
        for f in &report.failures {
            println!(
                "  - {} ({}): {}",
                f.module,
                f.sample.as_deref().unwrap_or("all"),
                f.error
            );
        }
    }
}

/// Module to matching identifiers, as consumed by plotting tools
fn print_module_matching(report: &CompletenessReport) {
    println!("module_accession\tmatching_ko");
    for (module, matching) in &report.module_matching {
        println!("{}\t{}", module, matching.join(","));
    }
}
