use clap::Parser;
use iconbadge::cli::{Cli, Commands};
use iconbadge::output::Printer;
use miette::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "iconbadge=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let printer = Printer::new();

    match cli.command {
        Commands::Generate(args) => iconbadge::cli::generate::run(args, &printer)?,
        Commands::Inspect(args) => iconbadge::cli::inspect::run(args, &printer)?,
        Commands::Init(args) => iconbadge::cli::init::run(args, &printer)?,
        Commands::Completions(args) => iconbadge::cli::completions::run(args)?,
    }

    Ok(())
}
