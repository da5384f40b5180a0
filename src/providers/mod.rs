//! Concrete price and exchange rate providers

pub mod coingecko;
pub mod util;
pub mod yahoo_finance;
