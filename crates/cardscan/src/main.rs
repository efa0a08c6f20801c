mod cli;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            image,
            config,
            timeout,
            providers,
        } => cli::scan::run(&image, config.as_deref(), timeout, &providers).await,
        Commands::Parse { file } => cli::parse::run(file.as_deref()),
        Commands::Providers { config } => cli::providers::run(config.as_deref()),
    }
}
