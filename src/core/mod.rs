//! Core business logic abstractions

pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod price;
pub mod valuation;

// Re-export main types for cleaner imports
pub use currency::RateProvider;
pub use error::ValuationError;
pub use price::{BASE_CURRENCY, QuoteProvider};
pub use valuation::{Allocation, Asset, Holding, Portfolio};
