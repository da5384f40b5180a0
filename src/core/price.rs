//! Pricing abstractions

use crate::core::error::ValuationError;
use async_trait::async_trait;

/// Currency every quote is expressed in.
pub const BASE_CURRENCY: &str = "USD";

/// Source of the current unit price of an asset in [`BASE_CURRENCY`].
///
/// Implementations fail with [`ValuationError::PriceUnavailable`] when the
/// identifier is unknown or the response cannot be read as a price.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn get_price(&self, asset: &str) -> Result<f64, ValuationError>;
}
