//! Import command - convert KEGG flat-file module entries into the three
//! `id:text` list files used by the other commands.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::warn;

use crate::cli::OutputFormat;
use crate::parsing::kegg_entry::{load_kegg_entries, KeggModuleEntry};

pub const DEFINITIONS_FILE: &str = "all_pathways.txt";
pub const NAMES_FILE: &str = "all_pathways_names.txt";
pub const CLASSES_FILE: &str = "all_pathways_class.txt";

/// Modules whose definition spans several lines, listed for review
pub const MULTILINE_FILE: &str = "all_pathways_multiline.txt";

/// Arguments for the import command
#[derive(Args)]
pub struct ImportArgs {
    /// KEGG flat-file module entries (one or more files, may be gzipped)
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Output directory (created if missing)
    #[arg(short = 'o', long, default_value = ".")]
    pub outdir: PathBuf,
}

/// Execute the import command
///
/// # Errors
///
/// Returns an error if an input cannot be parsed or an output cannot be written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: ImportArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut entries = Vec::new();
    for path in &args.inputs {
        let parsed = load_kegg_entries(path)?;
        if verbose {
            eprintln!("Read {} entries from {}", parsed.len(), path.display());
        }
        entries.extend(parsed);
    }

    let (usable, no_definition): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|e| !e.definition_lines.is_empty());
    for entry in &no_definition {
        warn!("Entry {} has no DEFINITION; skipped", entry.id);
    }

    std::fs::create_dir_all(&args.outdir)?;
    write_list(&args.outdir.join(DEFINITIONS_FILE), &usable, KeggModuleEntry::definition)?;
    write_list(&args.outdir.join(NAMES_FILE), &usable, |e| e.name.clone())?;
    write_list(&args.outdir.join(CLASSES_FILE), &usable, |e| e.class.clone())?;

    let multiline: Vec<_> = usable.iter().filter(|e| e.is_multiline()).cloned().collect();
    if !multiline.is_empty() {
        write_list(&args.outdir.join(MULTILINE_FILE), &multiline, KeggModuleEntry::definition)?;
    }

    match format {
        OutputFormat::Text => {
            println!(
                "Imported {} modules into {}",
                usable.len(),
                args.outdir.display()
            );
            if !multiline.is_empty() {
                println!("{} multi-line definitions joined", multiline.len());
            }
            if !no_definition.is_empty() {
                println!("{} entries without a definition skipped", no_definition.len());
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "outdir": args.outdir.display().to_string(),
                "modules": usable.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
                "multiline": multiline.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
                "skipped": no_definition.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("id\tname\tclass\tdefinition");
            for e in &usable {
                println!("{}\t{}\t{}\t{}", e.id, e.name, e.class, e.definition());
            }
        }
    }

    Ok(())
}

fn write_list(
    path: &Path,
    entries: &[KeggModuleEntry],
    text: impl Fn(&KeggModuleEntry) -> String,
) -> anyhow::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for entry in entries {
        writeln!(out, "{}:{}", entry.id, text(entry))?;
    }
    out.flush()?;
    Ok(())
}
