pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::{
    AppConfig, DEFAULT_COINGECKO_URL, DEFAULT_YAHOO_URL, HoldingConfig,
};
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Summary,
}

/// Command line overrides applied on top of the configuration file.
#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    pub config_path: Option<String>,
    pub currency: Option<String>,
    pub holdings: Vec<HoldingConfig>,
}

/// Loads the configuration. Holdings given on the command line make the
/// configuration file optional.
fn load_config(options: &RunOptions) -> Result<AppConfig> {
    let config = match options.config_path.as_deref() {
        Some(path) => AppConfig::load_from_path(path)?,
        None if options.holdings.is_empty() => AppConfig::load()?,
        None => {
            let path = AppConfig::default_config_path()?;
            if path.exists() {
                AppConfig::load_from_path(&path)?
            } else {
                debug!("No config at {}, using defaults", path.display());
                AppConfig::default()
            }
        }
    };

    Ok(config.with_overrides(options.currency.as_deref(), &options.holdings))
}

pub async fn run_command(command: AppCommand, options: &RunOptions) -> Result<()> {
    info!("Crypto portfolio valuation starting...");

    let config = load_config(options)?;
    debug!("Loaded config: {config:#?}");

    let coingecko_url = config
        .providers
        .coingecko
        .as_ref()
        .map_or(DEFAULT_COINGECKO_URL, |p| &p.base_url);
    let yahoo_url = config
        .providers
        .yahoo
        .as_ref()
        .map_or(DEFAULT_YAHOO_URL, |p| &p.base_url);

    let quote_provider =
        providers::coingecko::CoinGeckoProvider::new(coingecko_url, config.timeout())?;
    let rate_provider =
        providers::yahoo_finance::YahooCurrencyProvider::new(yahoo_url, config.timeout())?;

    match command {
        AppCommand::Summary => {
            cli::summary::run(
                &config.holdings,
                &quote_provider,
                &rate_provider,
                &config.currency,
            )
            .await
        }
    }
}
