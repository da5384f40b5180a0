use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use super::util::build_client;
use crate::core::error::ValuationError;
use crate::core::price::QuoteProvider;

/// `{"bitcoin": {"usd": 50000.0}}`
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

/// Quote provider backed by the CoinGecko simple price endpoint. Assets are
/// identified by their CoinGecko id (`bitcoin`, `ethereum`, `ripple`).
pub struct CoinGeckoProvider {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(CoinGeckoProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_client(timeout)?,
        })
    }

    fn price_url(&self, asset: &str) -> Result<Url> {
        let url = Url::parse_with_params(
            &format!("{}/simple/price", self.base_url),
            &[("ids", asset), ("vs_currencies", "usd")],
        )?;
        Ok(url)
    }

    async fn fetch_usd_price(&self, asset: &str) -> Result<f64> {
        let url = self.price_url(asset)?;
        debug!("Requesting price data from {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for asset: {} URL: {}", e, asset, url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for asset: {}", response.status(), asset));
        }

        let text = response.text().await?;
        let data: SimplePriceResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", asset, e))?;

        let price = data
            .get(asset)
            .and_then(|quotes| quotes.get("usd"))
            .copied()
            .ok_or_else(|| anyhow!("No price data found for asset: {}", asset))?;

        if !price.is_finite() || price < 0.0 {
            return Err(anyhow!("Invalid price {} for asset: {}", price, asset));
        }
        Ok(price)
    }
}

#[async_trait]
impl QuoteProvider for CoinGeckoProvider {
    #[instrument(name = "CoinGeckoPriceFetch", skip(self), fields(asset = %asset))]
    async fn get_price(&self, asset: &str) -> Result<f64, ValuationError> {
        self.fetch_usd_price(asset)
            .await
            .map_err(|e| ValuationError::price_unavailable(asset, format!("{e:#}")))
    }
}
