mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tokenator_config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing on stderr so reports on stdout stay clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();
    let config = Config::load()?;

    match cli.command {
        cli::Commands::Count { input, json } => commands::count::handle(input, json, &config).await,
        cli::Commands::Report {
            input,
            format,
            output,
        } => commands::report::handle(input, format.map(Into::into), output, &config).await,
        cli::Commands::Config => commands::config::handle(&config),
    }
}
