//! Selecting the price that best represents a feed at a point in time

use crate::stream::PriceStream;
use crate::types::TickerPrice;
use chrono::{DateTime, Utc};

/// Get from `stream` the price most relevant to `t`.
///
/// That is the latest price with `time <= t` the stream can deliver right
/// now, or, when the first held price is already after `t`, that price.
/// Returns `None` if the stream has never produced a price or has delivered
/// its terminal error.
///
/// The stream is advanced while its held price is not after `t`. The first
/// price found after `t` stops the scan and stays held by the stream, so
/// the next round (with a later `t`) starts from it.
pub fn most_relevant_ticker_price<S>(t: DateTime<Utc>, stream: &mut S) -> Option<TickerPrice>
where
    S: PriceStream + ?Sized,
{
    if stream.ticker_price().is_none() && !stream.advance() {
        return None;
    }

    let mut candidate = stream.ticker_price()?.clone();
    while candidate.time <= t && stream.advance() {
        match stream.ticker_price() {
            Some(next) if next.time <= t => candidate = next.clone(),
            _ => break,
        }
    }

    if stream.err().is_some() {
        return None;
    }

    Some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarketDataError;
    use crate::stream::price_channel;
    use crate::types::Ticker;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn price(secs: i64, value: &str) -> TickerPrice {
        TickerPrice::new(Ticker::default(), at(secs), value)
    }

    #[test]
    fn test_empty_stream_has_no_relevant_price() {
        let (_tx, mut stream) = price_channel(8);
        assert_eq!(most_relevant_ticker_price(at(100), &mut stream), None);
    }

    #[test]
    fn test_closed_stream_has_no_relevant_price() {
        let (tx, mut stream) = price_channel(8);
        tx.close(MarketDataError::stream_closed("stream was closed"));

        assert_eq!(most_relevant_ticker_price(at(100), &mut stream), None);
        assert!(stream.err().is_some());
    }

    #[test]
    fn test_buffered_price_dropped_once_stream_closes() {
        let (tx, mut stream) = price_channel(8);
        tx.try_send(price(10, "1")).unwrap();
        tx.close(MarketDataError::stream_closed("stream was closed"));

        assert_eq!(most_relevant_ticker_price(at(30), &mut stream), None);
        assert!(stream.err().is_some());
        // Stays exhausted on later rounds.
        assert_eq!(most_relevant_ticker_price(at(90), &mut stream), None);
    }

    #[test]
    fn test_latest_price_not_after_target() {
        let (tx, mut stream) = price_channel(8);
        for (secs, value) in [(10, "1"), (20, "2"), (30, "3")] {
            tx.try_send(price(secs, value)).unwrap();
        }

        assert_eq!(most_relevant_ticker_price(at(30), &mut stream), Some(price(30, "3")));
    }

    #[test]
    fn test_does_not_skip_last_price_before_target() {
        let (tx, mut stream) = price_channel(8);
        for (secs, value) in [(10, "1"), (20, "2"), (40, "4"), (50, "5")] {
            tx.try_send(price(secs, value)).unwrap();
        }

        assert_eq!(most_relevant_ticker_price(at(30), &mut stream), Some(price(20, "2")));
        // The first price after the target is held for the next round.
        assert_eq!(stream.ticker_price(), Some(&price(40, "4")));
        assert_eq!(most_relevant_ticker_price(at(60), &mut stream), Some(price(50, "5")));
    }

    #[test]
    fn test_only_prices_after_target() {
        let (tx, mut stream) = price_channel(8);
        tx.try_send(price(50, "5")).unwrap();
        tx.try_send(price(60, "6")).unwrap();

        assert_eq!(most_relevant_ticker_price(at(30), &mut stream), Some(price(50, "5")));
        // Nothing was consumed past the first later price.
        assert_eq!(stream.ticker_price(), Some(&price(50, "5")));
    }

    #[test]
    fn test_held_price_reused_when_nothing_new() {
        let (tx, mut stream) = price_channel(8);
        tx.try_send(price(10, "1")).unwrap();

        assert_eq!(most_relevant_ticker_price(at(30), &mut stream), Some(price(10, "1")));
        assert_eq!(most_relevant_ticker_price(at(90), &mut stream), Some(price(10, "1")));
    }

    #[test]
    fn test_picks_up_prices_arriving_between_rounds() {
        let (tx, mut stream) = price_channel(8);
        tx.try_send(price(10, "1")).unwrap();
        assert_eq!(most_relevant_ticker_price(at(30), &mut stream), Some(price(10, "1")));

        tx.try_send(price(70, "7")).unwrap();
        tx.try_send(price(80, "8")).unwrap();
        assert_eq!(most_relevant_ticker_price(at(90), &mut stream), Some(price(80, "8")));
    }
}
