//! Reservation pipeline - Main Entry Point

use clap::Parser;
use colored::*;
use reservation_pipeline::cli::{cmd_ingest, cmd_preprocess, cmd_run, cmd_train, Cli, Commands};
use reservation_pipeline::config::PipelinePaths;
use reservation_pipeline::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(&cli.log_dir)?;

    let paths = PipelinePaths::under(&cli.artifacts);

    let result = match cli.command {
        Commands::Run => cmd_run(&cli.config, paths).await,
        Commands::Ingest => cmd_ingest(&cli.config, paths).await,
        Commands::Preprocess => cmd_preprocess(&cli.config, paths),
        Commands::Train => cmd_train(&cli.config, paths),
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Pipeline failed");
        eprintln!("  {} {:#}", "error:".red().bold(), e);
    }
    result
}
