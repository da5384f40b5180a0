//! Error kinds raised while valuing a portfolio.

use thiserror::Error;

/// Failures surfaced by the providers, the valuation engine and the report.
///
/// A zero portfolio total is not an error: allocations fall back to 0%.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    #[error("Price unavailable for {asset}: {reason}")]
    PriceUnavailable { asset: String, reason: String },

    #[error("Exchange rate unavailable for USD to {currency}: {reason}")]
    RateUnavailable { currency: String, reason: String },

    #[error("Invalid quantity {quantity} for {asset}: quantity must be a finite, non-negative number")]
    InvalidQuantity { asset: String, quantity: f64 },

    #[error("Portfolio holds mixed currencies: {}", .0.join(", "))]
    MixedCurrency(Vec<String>),
}

impl ValuationError {
    pub fn price_unavailable(asset: &str, reason: impl ToString) -> Self {
        ValuationError::PriceUnavailable {
            asset: asset.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn rate_unavailable(currency: &str, reason: impl ToString) -> Self {
        ValuationError::RateUnavailable {
            currency: currency.to_string(),
            reason: reason.to_string(),
        }
    }
}
