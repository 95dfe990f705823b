//! Mock price feeds
//!
//! Stand-ins for exchange clients: each feed runs as an independent task
//! and pushes prices into a [`market_data::ChannelPriceStream`] at its own
//! cadence.
//!
//! # Quick Start
//!
//! ```ignore
//! use feeds::{ConstantPrice, MockFeed};
//!
//! let token = CancellationToken::new();
//! let feed = MockFeed::new("constant-100", Ticker::default(), Duration::from_secs(1));
//! let (stream, handle) = feed.spawn(ConstantPrice(100.0), token.clone());
//! ```

pub mod generator;
pub mod mock;

pub use generator::{ConstantPrice, PriceGenerator, RandomPrice};
pub use mock::{format_price, MockFeed, STREAM_CLOSED};
