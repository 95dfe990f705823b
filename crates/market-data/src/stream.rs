//! Pull-based iteration over an asynchronous price feed
//!
//! A feed producer pushes [`TickerPrice`] values (and at most one terminal
//! error) into a pair of bounded channels. [`ChannelPriceStream`] wraps the
//! receiving ends and exposes a non-blocking iterator: [`PriceStream::advance`]
//! makes a single `try_recv` attempt and never waits on the producer.

use crate::error::MarketDataError;
use crate::types::TickerPrice;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::debug;

/// Buffer size used by feeds that don't configure one
pub const DEFAULT_CHANNEL_CAPACITY: usize = 120;

/// Iterator over a price feed.
pub trait PriceStream {
    /// Tries to take the next price from the feed without blocking.
    ///
    /// Returns `true` if a new price was retrieved. Returns `false` if the
    /// stream is closed, if nothing is available yet, or if the feed just
    /// delivered its terminal error (which is then kept in [`err`](Self::err)).
    fn advance(&mut self) -> bool;

    /// Most recently retrieved price, `None` before the first successful advance.
    fn ticker_price(&self) -> Option<&TickerPrice>;

    /// Terminal error, `None` while the stream is live.
    fn err(&self) -> Option<&MarketDataError>;
}

impl<S: PriceStream + ?Sized> PriceStream for Box<S> {
    fn advance(&mut self) -> bool {
        (**self).advance()
    }

    fn ticker_price(&self) -> Option<&TickerPrice> {
        (**self).ticker_price()
    }

    fn err(&self) -> Option<&MarketDataError> {
        (**self).err()
    }
}

#[derive(Debug)]
enum StreamState {
    Live,
    Closed(MarketDataError),
}

/// [`PriceStream`] backed by a pair of mpsc receivers.
#[derive(Debug)]
pub struct ChannelPriceStream {
    prices: mpsc::Receiver<TickerPrice>,
    errors: mpsc::Receiver<MarketDataError>,
    ticker_price: Option<TickerPrice>,
    state: StreamState,
}

impl ChannelPriceStream {
    pub fn new(
        prices: mpsc::Receiver<TickerPrice>,
        errors: mpsc::Receiver<MarketDataError>,
    ) -> Self {
        Self {
            prices,
            errors,
            ticker_price: None,
            state: StreamState::Live,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, StreamState::Closed(_))
    }

    fn close(&mut self, err: MarketDataError) {
        debug!(error = %err, "Price stream closed");
        self.state = StreamState::Closed(err);
    }
}

impl PriceStream for ChannelPriceStream {
    fn advance(&mut self) -> bool {
        if self.is_closed() {
            return false;
        }

        // Prices buffered ahead of the terminal error are still delivered.
        let disconnected = match self.prices.try_recv() {
            Ok(price) => {
                self.ticker_price = Some(price);
                return true;
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => true,
        };

        match self.errors.try_recv() {
            Ok(err) => self.close(err),
            Err(_) if disconnected => {
                self.close(MarketDataError::stream_closed("price channel disconnected"))
            }
            Err(_) => {}
        }
        false
    }

    fn ticker_price(&self) -> Option<&TickerPrice> {
        self.ticker_price.as_ref()
    }

    fn err(&self) -> Option<&MarketDataError> {
        match &self.state {
            StreamState::Live => None,
            StreamState::Closed(err) => Some(err),
        }
    }
}

/// Producer half of a price feed.
///
/// [`close`](Self::close) consumes the sender, so a feed can emit at most
/// one terminal error and nothing after it.
#[derive(Debug, Clone)]
pub struct PriceSender {
    prices: mpsc::Sender<TickerPrice>,
    errors: mpsc::Sender<MarketDataError>,
}

impl PriceSender {
    /// Push a price, waiting for buffer space if the consumer is behind.
    ///
    /// Fails only when the consuming stream has been dropped.
    pub async fn send(&self, price: TickerPrice) -> Result<(), TickerPrice> {
        self.prices.send(price).await.map_err(|e| e.0)
    }

    /// Push a price without waiting.
    pub fn try_send(&self, price: TickerPrice) -> Result<(), TrySendError<TickerPrice>> {
        self.prices.try_send(price)
    }

    /// Emit the terminal error and drop the sender.
    pub fn close(self, err: MarketDataError) {
        if self.errors.try_send(err).is_err() {
            debug!("Terminal error not delivered, stream already gone");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.prices.is_closed()
    }
}

/// Create a connected producer/stream pair with the given price buffer size.
pub fn price_channel(capacity: usize) -> (PriceSender, ChannelPriceStream) {
    let (prices_tx, prices_rx) = mpsc::channel(capacity.max(1));
    let (errors_tx, errors_rx) = mpsc::channel(1);

    (
        PriceSender {
            prices: prices_tx,
            errors: errors_tx,
        },
        ChannelPriceStream::new(prices_rx, errors_rx),
    )
}
