//! Streaming index price aggregation
//!
//! This crate turns several independent, asynchronously updating price
//! feeds into one periodic index price.
//!
//! # Core Components
//!
//! - [`stream`] - Non-blocking iterator over a feed's price and error channels
//! - [`relevance`] - Picks the price that best represents a feed at a timestamp
//! - [`index_price`] - Windowed aggregation of per-feed prices into an index
//! - [`reducer`] - Pluggable reduction strategies (mean, median)
//! - [`types`] - Ticker, price observations and index results
//!
//! # Key Invariants
//!
//! - Aggregation never waits on a feed; a slow feed just doesn't contribute
//! - A stream that delivered its terminal error stays closed
//! - Streams only move forward; rounds are computed in increasing time order
//! - Only prices within `[t - window, t]` take part in the index at `t`

pub mod error;
pub mod index_price;
pub mod reducer;
pub mod relevance;
pub mod stream;
pub mod types;

pub use error::{MarketDataError, PriceParseError};
pub use index_price::{calculate_index_price, relevant_prices, IndexPriceCalculator};
pub use reducer::{mean_price, median_price, IndexMethod, PriceReducer};
pub use relevance::most_relevant_ticker_price;
pub use stream::{price_channel, ChannelPriceStream, PriceSender, PriceStream, DEFAULT_CHANNEL_CAPACITY};
pub use types::{IndexPrice, Ticker, TickerPrice};

pub type Result<T> = std::result::Result<T, MarketDataError>;
