use crate::reducer::PriceReducer;
use crate::relevance::most_relevant_ticker_price;
use crate::stream::PriceStream;
use crate::types::{IndexPrice, Ticker};
use crate::Result;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, trace};

/// Collect the price of every stream whose most relevant price lies in the
/// window `[t - relevance_window, t]`.
///
/// Streams with no price, a price after `t`, or a price older than the
/// window don't contribute and are not an error.
pub fn relevant_prices<S>(
    t: DateTime<Utc>,
    streams: &mut [S],
    relevance_window: TimeDelta,
) -> Vec<String>
where
    S: PriceStream,
{
    let mut prices = Vec::with_capacity(streams.len());

    for (idx, stream) in streams.iter_mut().enumerate() {
        let Some(tp) = most_relevant_ticker_price(t, stream) else {
            trace!(stream = idx, closed = stream.err().is_some(), "No price available");
            continue;
        };

        if tp.time > t {
            trace!(stream = idx, time = %tp.time, "Price is after target timestamp");
        } else if t - tp.time > relevance_window {
            trace!(stream = idx, time = %tp.time, "Price is outside relevance window");
        } else {
            prices.push(tp.price);
        }
    }

    prices
}

/// Calculate the index price at `t` from the open streams.
///
/// The reducer's result is returned as-is; with no qualifying price it is
/// up to the reducer to fail.
pub fn calculate_index_price<S, R>(
    t: DateTime<Utc>,
    streams: &mut [S],
    relevance_window: TimeDelta,
    reducer: &R,
) -> Result<f64>
where
    S: PriceStream,
    R: PriceReducer + ?Sized,
{
    let prices = relevant_prices(t, streams, relevance_window);
    reducer.reduce(&prices)
}

/// Owns a set of feeds and computes successive index prices from them.
///
/// Streams are kept between rounds, so each round only moves past prices
/// that weren't consumed yet. Rounds are expected in increasing time order.
#[derive(Debug)]
pub struct IndexPriceCalculator<S, R> {
    ticker: Ticker,
    streams: Vec<S>,
    relevance_window: TimeDelta,
    reducer: R,
}

impl<S, R> IndexPriceCalculator<S, R>
where
    S: PriceStream,
    R: PriceReducer,
{
    pub fn new(ticker: Ticker, relevance_window: TimeDelta, reducer: R) -> Self {
        Self {
            ticker,
            streams: Vec::new(),
            relevance_window,
            reducer,
        }
    }

    pub fn with_streams(mut self, streams: impl IntoIterator<Item = S>) -> Self {
        self.streams.extend(streams);
        self
    }

    pub fn add_stream(&mut self, stream: S) {
        self.streams.push(stream);
    }

    pub fn calculate(&mut self, t: DateTime<Utc>) -> Result<IndexPrice> {
        let prices = relevant_prices(t, &mut self.streams, self.relevance_window);
        let sources = prices.len();
        let price = self.reducer.reduce(&prices)?;

        debug!(
            ticker = %self.ticker,
            %t,
            price,
            sources,
            streams = self.streams.len(),
            "Index price calculated"
        );

        Ok(IndexPrice {
            ticker: self.ticker.clone(),
            price,
            timestamp: t,
            sources,
        })
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn relevance_window(&self) -> TimeDelta {
        self.relevance_window
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Number of streams that delivered their terminal error
    pub fn closed_stream_count(&self) -> usize {
        self.streams.iter().filter(|s| s.err().is_some()).count()
    }
}
