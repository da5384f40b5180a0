//! Currency conversion abstractions

use crate::core::error::ValuationError;
use async_trait::async_trait;

/// Source of the multiplier converting one unit of the base currency into
/// `currency`.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn get_rate(&self, currency: &str) -> Result<f64, ValuationError>;
}
