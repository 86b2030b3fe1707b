//! RFP Scout CLI
//!
//! Chat with the RFP database, query it directly, or serve its tools over MCP.

use anyhow::Result;
use clap::Parser;
use rfpscout_core::error::exit_codes;
use rfpscout_core::{Config, RfpScoutError};

mod app;
mod commands;
mod output;

use app::{Cli, Commands, ServiceArgs};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for MCP and JSON output
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<RfpScoutError>()
            .map(RfpScoutError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.service)?;

    match cli.command {
        Commands::Chat(args) => commands::chat::run(args, &config, cli.format).await,
        Commands::Ask(args) => commands::chat::run_ask(args, &config, cli.format).await,
        Commands::Search(args) => commands::search::run(args, &config, cli.format).await,
        Commands::Stats(args) => commands::search::run_stats(args, &config, cli.format).await,
        Commands::Schema => commands::schema::run(&config, cli.format).await,
        Commands::Tools => commands::schema::run_tools(&config).await,
        Commands::Mcp => commands::schema::run_mcp(&config).await,
    }
}

/// Config file (or `--config`), then command-line overrides
fn load_config(service: &ServiceArgs) -> Result<Config> {
    let mut config = match &service.config {
        Some(path) if !path.exists() => {
            return Err(RfpScoutError::Config(format!(
                "Config file not found: {}",
                path.display()
            ))
            .into())
        }
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply(service.overrides());
    Ok(config)
}
