//! Shared types for Market Data

use crate::error::PriceParseError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Instrument identifier (e.g., "BTC_USD")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    pub const BTC_USD: &'static str = "BTC_USD";

    /// Create a new Ticker
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the ticker as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(Self::BTC_USD)
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Ticker {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A single timestamped price sample emitted by a feed.
///
/// The price travels as decimal text and is only parsed where it is
/// consumed, so a malformed value surfaces as a data error in the round
/// that reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerPrice {
    pub ticker: Ticker,
    pub time: DateTime<Utc>,
    pub price: String,
}

impl TickerPrice {
    pub fn new(ticker: Ticker, time: DateTime<Utc>, price: impl Into<String>) -> Self {
        Self {
            ticker,
            time,
            price: price.into(),
        }
    }

    /// Parse the price text as a finite number
    pub fn parse_price(&self) -> Result<f64, PriceParseError> {
        parse_price(&self.price)
    }
}

/// Parse decimal price text, rejecting NaN and infinities
pub fn parse_price(text: &str) -> Result<f64, PriceParseError> {
    let value: f64 = text.trim().parse()?;
    if !value.is_finite() {
        return Err(PriceParseError::NotFinite);
    }
    Ok(value)
}

/// Index price computed for one target timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexPrice {
    pub ticker: Ticker,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
    /// Number of feeds whose price contributed to this value
    pub sources: usize,
}
