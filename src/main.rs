use anyhow::Result;
use clap::{Parser, Subcommand};
use cryptoval::core::config::HoldingConfig;
use cryptoval::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Currency to value the portfolio in (e.g. GBP)
    #[arg(long)]
    currency: Option<String>,

    /// Holding as <identifier>:<quantity>, may be repeated
    #[arg(long = "holding", value_name = "IDENTIFIER:QUANTITY")]
    holdings: Vec<HoldingConfig>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display portfolio summary (default)
    Summary,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let options = cryptoval::RunOptions {
        config_path: cli.config_path,
        currency: cli.currency,
        holdings: cli.holdings,
    };

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(Commands::Summary) | None => {
            cryptoval::run_command(cryptoval::AppCommand::Summary, &options).await
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> Result<()> {
    let path = cryptoval::cli::setup::setup()?;
    println!("Created default configuration at {}", path.display());
    Ok(())
}
