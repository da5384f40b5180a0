//! Prices holdings in a target currency and derives portfolio totals and
//! allocations.
use crate::core::config::HoldingConfig;
use crate::core::currency::RateProvider;
use crate::core::error::ValuationError;
use crate::core::price::QuoteProvider;
use std::sync::Arc;
use tracing::debug;

/// Decimal places kept on the target currency price.
pub const PRICE_DECIMALS: i32 = 3;

/// Rounds to [`PRICE_DECIMALS`] places, halves away from zero.
pub fn round_price(value: f64) -> f64 {
    let factor = 10f64.powi(PRICE_DECIMALS);
    (value * factor).round() / factor
}

/// A priced asset. Immutable once built by [`price_asset`].
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub identifier: String,
    pub currency: String,
    pub usd_price: f64,
    pub target_price: f64,
}

/// A quantity of one asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub asset: Arc<Asset>,
    pub quantity: f64,
}

impl Holding {
    pub fn market_value(&self) -> f64 {
        self.quantity * self.asset.target_price
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    pub holdings: Vec<Holding>,
}

impl Portfolio {
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

/// A holding with its market value and share of the portfolio total.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation<'a> {
    pub holding: &'a Holding,
    pub market_value: f64,
    pub percent: f64,
}

/// Fetches the USD quote and the USD to `currency` rate, then builds the
/// asset. Provider failures are returned as is.
pub async fn price_asset(
    identifier: &str,
    currency: &str,
    quote_provider: &(dyn QuoteProvider + Send + Sync),
    rate_provider: &(dyn RateProvider + Send + Sync),
) -> Result<Asset, ValuationError> {
    let currency = currency.to_uppercase();
    let usd_price = quote_provider.get_price(identifier).await?;
    let rate = rate_provider.get_rate(&currency).await?;
    let target_price = round_price(usd_price * rate);
    debug!("Priced {identifier}: {usd_price} USD at rate {rate} -> {target_price} {currency}");

    Ok(Asset {
        identifier: identifier.to_string(),
        currency,
        usd_price,
        target_price,
    })
}

fn check_quantity(asset: &str, quantity: f64) -> Result<(), ValuationError> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(ValuationError::InvalidQuantity {
            asset: asset.to_string(),
            quantity,
        });
    }
    Ok(())
}

/// Assembles holdings in input order, rejecting negative or non-finite
/// quantities.
pub fn build_portfolio(
    holdings: impl IntoIterator<Item = (Arc<Asset>, f64)>,
) -> Result<Portfolio, ValuationError> {
    let holdings = holdings
        .into_iter()
        .map(|(asset, quantity)| {
            check_quantity(&asset.identifier, quantity)?;
            Ok(Holding { asset, quantity })
        })
        .collect::<Result<Vec<_>, ValuationError>>()?;

    Ok(Portfolio { holdings })
}

/// Sum of the market values. Zero for an empty portfolio.
pub fn total_value(portfolio: &Portfolio) -> f64 {
    portfolio.holdings.iter().map(Holding::market_value).sum()
}

/// Market value and percentage of total for every holding, largest first.
///
/// Equal market values keep their input order. When the total is zero every
/// allocation is 0% instead of dividing by zero.
pub fn allocations(portfolio: &Portfolio) -> Vec<Allocation<'_>> {
    let total = total_value(portfolio);

    let mut rows: Vec<Allocation<'_>> = portfolio
        .holdings
        .iter()
        .map(|holding| {
            let market_value = holding.market_value();
            let percent = if total == 0.0 {
                0.0
            } else {
                market_value / total * 100.0
            };
            Allocation {
                holding,
                market_value,
                percent,
            }
        })
        .collect();

    // sort_by is stable
    rows.sort_by(|a, b| b.market_value.total_cmp(&a.market_value));
    rows
}

/// Prices every configured holding one at a time, in order, and builds the
/// portfolio. The first failure aborts the whole valuation.
///
/// Holdings without their own currency are valued in `default_currency`.
/// Progress updates can be reported via the `update_callback`.
pub async fn value_holdings(
    holdings: &[HoldingConfig],
    default_currency: &str,
    quote_provider: &(dyn QuoteProvider + Send + Sync),
    rate_provider: &(dyn RateProvider + Send + Sync),
    update_callback: &(dyn Fn() + Send + Sync),
) -> Result<Portfolio, ValuationError> {
    let mut priced = Vec::with_capacity(holdings.len());

    for holding in holdings {
        check_quantity(&holding.asset, holding.quantity)?;
        let currency = holding.currency.as_deref().unwrap_or(default_currency);
        let asset = price_asset(&holding.asset, currency, quote_provider, rate_provider).await?;
        priced.push((Arc::new(asset), holding.quantity));
        update_callback();
    }

    build_portfolio(priced)
}
