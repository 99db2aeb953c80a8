use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use kira::core::currency::CurrencyRef;
use kira::core::log::{init_logging, level_for};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between MYR, USD, BTC, ETH, SOL and HLQ
    Convert {
        /// Amount to convert
        amount: Option<f64>,
        /// Currency to convert from
        #[arg(short, long)]
        from: Option<CurrencyRef>,
        /// Currency to convert to
        #[arg(short, long)]
        to: Option<CurrencyRef>,
    },
    /// Display the latest exchange rate and crypto prices
    Rates,
    /// Serve the rate API over HTTP
    Serve {
        /// Address to listen on, overrides the configured one
        #[arg(short, long)]
        bind: Option<String>,
    },
}

impl From<Commands> for kira::AppCommand {
    fn from(cmd: Commands) -> kira::AppCommand {
        match cmd {
            Commands::Convert { amount, from, to } => kira::AppCommand::Convert { amount, from, to },
            Commands::Rates => kira::AppCommand::Rates,
            Commands::Serve { bind } => kira::AppCommand::Serve { bind },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let serving = matches!(cli.command, Some(Commands::Serve { .. }));
    init_logging(level_for(cli.verbose, serving));

    let result = match cli.command {
        Some(Commands::Setup) => kira::cli::setup::setup(),
        Some(cmd) => kira::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
