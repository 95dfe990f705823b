//! Market data error types

use std::num::ParseFloatError;
use thiserror::Error;

/// Errors that can occur while aggregating price feeds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketDataError {
    /// The feed announced it will emit no more prices
    #[error("Price stream closed: {0}")]
    StreamClosed(String),

    /// A price could not be interpreted as a number
    #[error("prices[{index}]='{value}' isn't a number: {source}")]
    MalformedPrice {
        index: usize,
        value: String,
        #[source]
        source: PriceParseError,
    },

    /// No feed contributed a price for the round
    #[error("No prices for calculation")]
    NoPrices,
}

impl MarketDataError {
    /// Create a stream closed error
    pub fn stream_closed(reason: impl Into<String>) -> Self {
        Self::StreamClosed(reason.into())
    }
}

/// Why a price text failed to parse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceParseError {
    #[error(transparent)]
    Invalid(#[from] ParseFloatError),

    #[error("value is not finite")]
    NotFinite,
}
