//! Compile command - parse every module definition once and save the graphs.

use std::path::PathBuf;

use clap::Args;

use crate::catalog::builder::{BuildReport, CatalogBuilder};
use crate::catalog::store::ModuleCatalog;
use crate::cli::{OnErrorArg, OutputFormat};
use crate::parsing::modules::load_module_lines;

/// Arguments for the compile command
#[derive(Args)]
pub struct CompileArgs {
    /// Module definitions, one `id:definition` per line (may be gzipped)
    #[arg(short = 'a', long = "definitions", required = true)]
    pub definitions: PathBuf,

    /// Output file for the compiled graphs (bincode, or JSON if it ends in .json)
    #[arg(short, long, default_value = "graphs.bin")]
    pub output: PathBuf,

    /// Also write a JSON dump of every compiled graph
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// What to do with definitions that do not parse
    #[arg(long, value_enum, default_value = "skip")]
    pub on_error: OnErrorArg,
}

/// Execute the compile command
///
/// # Errors
///
/// Returns an error if the definitions cannot be read, a definition fails
/// under `--on-error abort`, or the output cannot be written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: CompileArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let lines = load_module_lines(&args.definitions)?;
    if verbose {
        eprintln!(
            "Read {} definitions from {}",
            lines.len(),
            args.definitions.display()
        );
    }

    let mut builder = CatalogBuilder::new(args.on_error.into());
    builder.add_lines(&lines)?;
    let (catalog, report) = builder.build();

    catalog.save_to_file(&args.output)?;
    if let Some(ref json_path) = args.json {
        std::fs::write(json_path, catalog.to_json()?)?;
    }

    match format {
        OutputFormat::Text => print_text_summary(&args, &catalog, &report),
        OutputFormat::Json => print_json_summary(&args, &catalog, &report)?,
        OutputFormat::Tsv => print_tsv_summary(&catalog, &report),
    }

    Ok(())
}

fn print_text_summary(args: &CompileArgs, catalog: &ModuleCatalog, report: &BuildReport) {
    println!(
        "Compiled {} modules to {}",
        catalog.len(),
        args.output.display()
    );
    if let Some(ref json_path) = args.json {
        println!("JSON dump written to {}", json_path.display());
    }
    if report.has_problems() {
        println!();
        print!("{report}");
    }
}

fn print_json_summary(
    args: &CompileArgs,
    catalog: &ModuleCatalog,
    report: &BuildReport,
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "output": args.output.display().to_string(),
        "modules": catalog.len(),
        "skipped": report
            .skipped
            .iter()
            .map(|e| serde_json::json!({ "module": e.module(), "error": e.to_string() }))
            .collect::<Vec<_>>(),
        "duplicates": report.duplicates.iter().map(ToString::to_string).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_summary(catalog: &ModuleCatalog, report: &BuildReport) {
    println!("module\tstatus\tnodes\tedges\terror");
    for module in catalog.iter() {
        println!(
            "{}\tcompiled\t{}\t{}\t",
            module.id,
            module.graph.node_count(),
            module.graph.edge_count()
        );
    }
    for e in &report.skipped {
        println!("{}\tskipped\t\t\t{}", e.module(), e);
    }
}
