use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use super::util::build_client;
use crate::core::currency::RateProvider;
use crate::core::error::ValuationError;
use crate::core::price::BASE_CURRENCY;

// YahooCurrencyProvider implementation for RateProvider
pub struct YahooCurrencyProvider {
    base_url: String,
    client: reqwest::Client,
}

impl YahooCurrencyProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(YahooCurrencyProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_client(timeout)?,
        })
    }

    async fn fetch_rate(&self, currency: &str) -> Result<f64> {
        let symbol = format!("{BASE_CURRENCY}{currency}=X");
        let url = format!("{}/v8/finance/chart/{symbol}", self.base_url);
        debug!("Requesting currency rate from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for currency pair: {}", e, symbol))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for currency pair: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;

        let data: YahooCurrencyResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        let item = data
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No rate data found for currency pair: {}", symbol))?;

        let rate = item.meta.regular_market_price;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(anyhow!("Invalid rate {} for currency pair: {}", rate, symbol));
        }
        Ok(rate)
    }
}

#[derive(Debug, Deserialize)]
struct YahooCurrencyResponse {
    chart: CurrencyChartResult,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartResult {
    result: Vec<CurrencyChartItem>,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartItem {
    meta: CurrencyChartMeta,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
}

#[async_trait]
impl RateProvider for YahooCurrencyProvider {
    #[instrument(name = "YahooRateFetch", skip(self), fields(currency = %currency))]
    async fn get_rate(&self, currency: &str) -> Result<f64, ValuationError> {
        let currency = currency.to_uppercase();
        if currency == BASE_CURRENCY {
            debug!("No currency conversion needed for {currency}");
            return Ok(1.0);
        }

        self.fetch_rate(&currency)
            .await
            .map_err(|e| ValuationError::rate_unavailable(&currency, format!("{e:#}")))
    }
}
