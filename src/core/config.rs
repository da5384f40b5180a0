use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_CURRENCY: &str = "GBP";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com";

/// One configured position: an asset identifier and the quantity held.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HoldingConfig {
    pub asset: String,
    pub quantity: f64,
    /// Target currency for this holding, defaults to the portfolio currency.
    #[serde(default)]
    pub currency: Option<String>,
}

/// Parses the command line form `<identifier>:<quantity>`.
impl FromStr for HoldingConfig {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (asset, quantity) = s
            .rsplit_once(':')
            .ok_or_else(|| anyhow!("Expected <identifier>:<quantity>, got: {}", s))?;
        let asset = asset.trim();
        if asset.is_empty() {
            return Err(anyhow!("Missing asset identifier in: {}", s));
        }
        let quantity = quantity
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Invalid quantity in: {s}"))?;

        Ok(HoldingConfig {
            asset: asset.to_string(),
            quantity,
            currency: None,
        })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoinGeckoProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub coingecko: Option<CoinGeckoProviderConfig>,
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            coingecko: Some(CoinGeckoProviderConfig {
                base_url: DEFAULT_COINGECKO_URL.to_string(),
            }),
            yahoo: Some(YahooProviderConfig {
                base_url: DEFAULT_YAHOO_URL.to_string(),
            }),
        }
    }
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub holdings: Vec<HoldingConfig>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            holdings: Vec::new(),
            providers: ProvidersConfig::default(),
            currency: default_currency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "cryptoval", "cryptoval")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// Applies command line overrides. Holdings given on the command line
    /// replace the configured ones.
    pub fn with_overrides(mut self, currency: Option<&str>, holdings: &[HoldingConfig]) -> Self {
        if let Some(currency) = currency {
            self.currency = currency.to_string();
        }
        if !holdings.is_empty() {
            self.holdings = holdings.to_vec();
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
holdings:
  - asset: "bitcoin"
    quantity: 1.5
  - asset: "ethereum"
    quantity: 2.0
    currency: "EUR"
currency: "GBP"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.holdings.len(), 2);
        assert_eq!(config.holdings[0].asset, "bitcoin");
        assert_eq!(config.holdings[0].quantity, 1.5);
        assert!(config.holdings[0].currency.is_none());
        assert_eq!(config.holdings[1].asset, "ethereum");
        assert_eq!(config.holdings[1].currency.as_deref(), Some("EUR"));
        assert_eq!(config.currency, "GBP");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(
            config.providers.coingecko.as_ref().unwrap().base_url,
            "https://api.coingecko.com/api/v3"
        );
        assert_eq!(
            config.providers.yahoo.as_ref().unwrap().base_url,
            "https://query1.finance.yahoo.com"
        );

        let yaml_str_with_providers = r#"
holdings:
  - asset: "ripple"
    quantity: 100
providers:
  coingecko:
    base_url: "http://example.com/coingecko"
  yahoo:
    base_url: "http://example.com/yahoo"
currency: "EUR"
timeout_secs: 3
        "#;
        let config_with_providers: AppConfig =
            serde_yaml::from_str(yaml_str_with_providers).unwrap();
        assert_eq!(
            config_with_providers.providers.coingecko.as_ref().unwrap().base_url,
            "http://example.com/coingecko"
        );
        assert_eq!(
            config_with_providers.providers.yahoo.as_ref().unwrap().base_url,
            "http://example.com/yahoo"
        );
        assert_eq!(config_with_providers.currency, "EUR");
        assert_eq!(config_with_providers.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_zero_timeout_is_rejected() -> Result<()> {
        let config_file = tempfile::NamedTempFile::new()?;
        fs::write(
            config_file.path(),
            "holdings: []\ncurrency: \"GBP\"\ntimeout_secs: 0\n",
        )?;

        let err = AppConfig::load_from_path(config_file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("timeout_secs must be at least 1"));

        fs::write(
            config_file.path(),
            "holdings: []\ncurrency: \"GBP\"\ntimeout_secs: 1\n",
        )?;
        let config = AppConfig::load_from_path(config_file.path())?;
        assert_eq!(config.timeout(), Duration::from_secs(1));
        Ok(())
    }

    #[test]
    fn test_holding_from_command_line() {
        let holding: HoldingConfig = "bitcoin:0.25".parse().unwrap();
        assert_eq!(holding.asset, "bitcoin");
        assert_eq!(holding.quantity, 0.25);
        assert!(holding.currency.is_none());

        let holding: HoldingConfig = "usd-coin:-3".parse().unwrap();
        assert_eq!(holding.asset, "usd-coin");
        assert_eq!(holding.quantity, -3.0);

        assert!("bitcoin".parse::<HoldingConfig>().is_err());
        assert!(":1".parse::<HoldingConfig>().is_err());
        assert!("bitcoin:lots".parse::<HoldingConfig>().is_err());
    }

    #[test]
    fn test_overrides_replace_holdings_and_currency() {
        let config = AppConfig {
            holdings: vec!["bitcoin:1".parse().unwrap()],
            ..AppConfig::default()
        };

        let unchanged = config.clone().with_overrides(None, &[]);
        assert_eq!(unchanged.currency, DEFAULT_CURRENCY);
        assert_eq!(unchanged.holdings, config.holdings);

        let cli_holdings: Vec<HoldingConfig> =
            vec!["ethereum:2".parse().unwrap(), "ripple:50".parse().unwrap()];
        let overridden = config.with_overrides(Some("EUR"), &cli_holdings);
        assert_eq!(overridden.currency, "EUR");
        assert_eq!(overridden.holdings, cli_holdings);
    }
}
