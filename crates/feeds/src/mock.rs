//! Mock feed producer
//!
//! A [`MockFeed`] runs as its own task and pushes one price right away and
//! then one per tick. When its cancellation token fires it emits a terminal
//! "stream was closed" error and stops.

use crate::generator::PriceGenerator;
use chrono::Utc;
use market_data::{
    price_channel, ChannelPriceStream, MarketDataError, PriceSender, Ticker, TickerPrice,
    DEFAULT_CHANNEL_CAPACITY,
};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Reason reported when a feed is cancelled
pub const STREAM_CLOSED: &str = "stream was closed";

/// Format a price the way feeds put it on the wire
pub fn format_price(price: f64) -> String {
    format!("{:.6}", price)
}

#[derive(Debug, Clone)]
pub struct MockFeed {
    name: String,
    ticker: Ticker,
    tick: Duration,
    capacity: usize,
}

impl MockFeed {
    pub fn new(name: impl Into<String>, ticker: Ticker, tick: Duration) -> Self {
        Self {
            name: name.into(),
            ticker,
            tick,
            capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start producing prices and return the consuming stream.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<G>(
        self,
        mut generator: G,
        token: CancellationToken,
    ) -> (ChannelPriceStream, JoinHandle<()>)
    where
        G: PriceGenerator + Send + 'static,
    {
        let (sender, stream) = price_channel(self.capacity);

        let first = self.observe(&mut generator);
        if let Err(e) = sender.try_send(first) {
            warn!(feed = %self.name, error = %e, "Failed to push initial price");
        }

        let handle = tokio::spawn(self.run(generator, sender, token));
        (stream, handle)
    }

    fn observe<G: PriceGenerator>(&self, generator: &mut G) -> TickerPrice {
        TickerPrice::new(
            self.ticker.clone(),
            Utc::now(),
            format_price(generator.next_price()),
        )
    }

    async fn run<G>(self, mut generator: G, sender: PriceSender, token: CancellationToken)
    where
        G: PriceGenerator + Send + 'static,
    {
        info!(feed = %self.name, ticker = %self.ticker, tick = ?self.tick, "Mock feed started");

        let mut ticks = interval_at(Instant::now() + self.tick, self.tick);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticks.tick() => {
                    let price = self.observe(&mut generator);
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => break,
                        sent = sender.send(price) => {
                            if sent.is_err() {
                                debug!(feed = %self.name, "Price stream dropped, stopping feed");
                                return;
                            }
                        }
                    }
                }
            }
        }

        info!(feed = %self.name, "Mock feed cancelled");
        sender.close(MarketDataError::stream_closed(STREAM_CLOSED));
    }
}
