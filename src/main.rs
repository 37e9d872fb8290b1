use clap::Parser;
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod core;
mod matching;
mod parsing;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("kegg_completeness=debug,info")
    } else {
        EnvFilter::new("kegg_completeness=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Compile(args) => {
            cli::compile::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Completeness(args) => {
            cli::completeness::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Score(args) => {
            cli::score::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Modules(args) => {
            cli::modules::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Import(args) => {
            cli::import::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
