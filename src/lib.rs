pub mod api;
pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::currency::CurrencyRef;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Convert {
        amount: Option<f64>,
        from: Option<CurrencyRef>,
        to: Option<CurrencyRef>,
    },
    Rates,
    Serve {
        bind: Option<String>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("kira starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let bnm = config.providers.bnm();
    let fiat_provider = providers::BnmProvider::new(&bnm.base_url, &bnm.session, &bnm.quote);
    let crypto_provider = providers::CoinGeckoProvider::new(&config.providers.coingecko().base_url);

    match command {
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(
                amount.unwrap_or(config.defaults.amount),
                from.unwrap_or(config.defaults.from),
                to.unwrap_or(config.defaults.to),
                &fiat_provider,
                &crypto_provider,
            )
            .await
        }
        AppCommand::Rates => cli::rates::run(&fiat_provider, &crypto_provider).await,
        AppCommand::Serve { bind } => api::serve(config, bind.as_deref()).await,
    }
}
