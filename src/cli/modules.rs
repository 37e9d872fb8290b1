use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::catalog::builder::ParseErrorPolicy;
use crate::catalog::metadata::MetadataTable;
use crate::cli::{load_catalog, OutputFormat};
use crate::core::module::CompiledModule;
use crate::core::types::ModuleId;

#[derive(Args)]
pub struct ModulesArgs {
    #[command(subcommand)]
    pub command: ModulesCommands,
}

/// Where to find compiled modules
#[derive(Args)]
pub struct SourceArgs {
    /// Compiled graphs from the compile command
    #[arg(short = 'g', long, required_unless_present = "definitions")]
    pub graphs: Option<PathBuf>,

    /// Module definitions to compile on the fly
    #[arg(short = 'a', long)]
    pub definitions: Option<PathBuf>,

    /// Module names (`id:name`)
    #[arg(short = 'n', long)]
    pub names: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ModulesCommands {
    /// List all compiled modules
    List {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Show the compiled graph of one module
    Show {
        /// Module ID
        #[arg(required = true)]
        id: String,

        #[command(flatten)]
        source: SourceArgs,
    },
}

pub fn run(args: ModulesArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        ModulesCommands::List { source } => run_list(&source, format, verbose),
        ModulesCommands::Show { id, source } => run_show(&id, &source, format, verbose),
    }
}

fn load(source: &SourceArgs, verbose: bool) -> anyhow::Result<(Vec<CompiledModule>, MetadataTable)> {
    let catalog = load_catalog(
        source.graphs.as_deref(),
        source.definitions.as_deref(),
        ParseErrorPolicy::Skip,
        verbose,
    )?;
    let metadata = MetadataTable::load(source.names.as_deref(), None)?;
    Ok((catalog.modules, metadata))
}

fn run_list(source: &SourceArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let (modules, metadata) = load(source, verbose)?;

    match format {
        OutputFormat::Text => {
            println!("{:<10} {:>6} {:>6} {:>10}  Name", "ID", "Nodes", "Edges", "Paths");
            println!("{}", "-".repeat(60));
            for module in &modules {
                println!(
                    "{:<10} {:>6} {:>6} {:>10}  {}",
                    module.id,
                    module.graph.node_count(),
                    module.graph.edge_count(),
                    module.graph.path_count(),
                    metadata.name(&module.id).unwrap_or("-")
                );
            }
            println!("\nTotal: {} modules", modules.len());
        }
        OutputFormat::Json => {
            let output: Vec<_> = modules
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "id": m.id,
                        "name": metadata.name(&m.id),
                        "nodes": m.graph.node_count(),
                        "edges": m.graph.edge_count(),
                        "paths": m.graph.path_count(),
                        "definition": m.definition,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("id\tnodes\tedges\tpaths\tdefinition");
            for m in &modules {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    m.id,
                    m.graph.node_count(),
                    m.graph.edge_count(),
                    m.graph.path_count(),
                    m.definition
                );
            }
        }
    }

    Ok(())
}

fn run_show(
    id: &str,
    source: &SourceArgs,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let (modules, metadata) = load(source, verbose)?;
    let id = ModuleId::new(id);
    let module = modules
        .iter()
        .find(|m| m.id == id)
        .ok_or_else(|| anyhow::anyhow!("Module not found: {id}"))?;
    let graph = &module.graph;

    match format {
        OutputFormat::Text => {
            println!("ID:          {}", module.id);
            if let Some(name) = metadata.name(&module.id) {
                println!("Name:        {name}");
            }
            println!("Definition:  {}", module.definition);
            println!("MD5:         {}", module.definition_md5);
            println!(
                "Graph:       {} nodes, {} edges, {} paths",
                graph.node_count(),
                graph.edge_count(),
                graph.path_count()
            );
            println!("Topo order:  {:?}", graph.topological_order());
            if !graph.optional_labels().is_empty() {
                let optional: Vec<_> = graph.optional_labels().iter().cloned().collect();
                println!("Optional:    {}", optional.join(","));
            }

            println!("\nEdges:");
            println!("  {:>4} {:>4}  {:<10} {:>8}", "From", "To", "Label", "Weight");
            for edge in graph.edges() {
                println!(
                    "  {:>4} {:>4}  {:<10} {:>8.4}{}",
                    edge.from,
                    edge.to,
                    edge.label,
                    edge.weight,
                    if edge.optional { "  (optional)" } else { "" }
                );
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": module.id,
                "name": metadata.name(&module.id),
                "definition": module.definition,
                "definition_md5": module.definition_md5,
                "topological_order": graph.topological_order(),
                "paths": graph.path_count(),
                "graph": graph,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("from\tto\tlabel\tweight\toptional");
            for edge in graph.edges() {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    edge.from, edge.to, edge.label, edge.weight, edge.optional
                );
            }
        }
    }

    Ok(())
}
