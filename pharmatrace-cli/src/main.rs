//! Pharmatrace CLI -- supply-chain integrity engine command-line tool

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use cli::{Cli, Commands};
use error::CliError;
use output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    logging::init_tracing(&cli.log_level, &cli.log_format)?;
    tracing::debug!(config = %cli.config.display(), "pharmatrace-cli starting");

    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Config(args) => commands::config::run(args, &cli.config, &writer).await,
        Commands::Batch(args) => {
            let config = commands::load_config(&cli.config).await?;
            commands::batch::run(args, &config, &writer).await
        }
        Commands::Simulate(args) => {
            let config = commands::load_config(&cli.config).await?;
            commands::simulate::run(args, &config, &writer).await
        }
        Commands::Verify(args) => commands::verify::run(&args, &writer),
    }
}
