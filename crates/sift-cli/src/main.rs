//! Sift CLI entrypoint.

use clap::Parser;

mod commands;
mod config;
mod handlers;

use commands::Commands;
use config::CliConfig;

#[derive(Parser)]
#[command(name = "sift")]
#[command(author, version, about = "Test-impact orchestration command-line interface", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = CliConfig::load().unwrap_or_default();

    let code = match cli.command {
        Commands::Run(args) => handlers::run(&config, args).await?,
        Commands::Resolve(args) => handlers::resolve(&config, args)?,
        Commands::Validate(args) => handlers::validate(&config, args)?,
        Commands::Environments(args) => handlers::environments(&config, args)?,
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
