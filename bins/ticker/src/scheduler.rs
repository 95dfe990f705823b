//! Periodic index computation
//!
//! Index timestamps are aligned to multiples of the interval. Each round
//! sleeps until its timestamp, computes the index and prints one line:
//! `<unix seconds> <price>` or `<unix seconds> err: <error>`.

use chrono::{DateTime, TimeDelta, Utc};
use market_data::{IndexPrice, IndexPriceCalculator, MarketDataError, PriceReducer, PriceStream};
use observability::IndexMetrics;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct IndexScheduler {
    interval: Duration,
    max_rounds: Option<u64>,
}

impl IndexScheduler {
    pub fn new(interval: Duration, max_rounds: Option<u64>) -> Self {
        Self {
            interval: interval.max(Duration::from_secs(1)),
            max_rounds,
        }
    }

    /// Compute rounds until cancelled or `max_rounds` is reached.
    ///
    /// Returns the number of rounds computed.
    pub async fn run<S, R>(
        &self,
        calculator: &mut IndexPriceCalculator<S, R>,
        metrics: &IndexMetrics,
        token: CancellationToken,
    ) -> u64
    where
        S: PriceStream,
        R: PriceReducer,
    {
        let step = TimeDelta::from_std(self.interval).unwrap_or(TimeDelta::seconds(60));
        let mut timestamp = next_boundary(Utc::now(), self.interval);
        let mut rounds = 0;

        info!(first = %timestamp, interval = ?self.interval, "Scheduler started");

        while self.max_rounds.map_or(true, |max| rounds < max) {
            let delay = (timestamp - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            debug!(?delay, %timestamp, "Waiting for next round");

            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!("Scheduler cancelled");
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            let result = calculator.calculate(timestamp);
            println!("{}", format_round(timestamp, &result));

            match &result {
                Ok(index) => metrics.record_price(index.price, index.sources),
                Err(e) => {
                    warn!(%timestamp, error = %e, "Index round failed");
                    metrics.record_error(error_kind(e));
                }
            }
            metrics.set_closed_streams(calculator.closed_stream_count());

            rounds += 1;
            timestamp += step;
        }

        rounds
    }
}

/// First multiple of `interval` strictly after `now`
pub fn next_boundary(now: DateTime<Utc>, interval: Duration) -> DateTime<Utc> {
    let step = interval.as_secs().max(1) as i64;
    let secs = now.timestamp();
    let next = secs + step - secs.rem_euclid(step);
    DateTime::from_timestamp(next, 0).unwrap_or(now)
}

pub fn format_round(timestamp: DateTime<Utc>, result: &market_data::Result<IndexPrice>) -> String {
    match result {
        Ok(index) => format!("{} {:.2}", timestamp.timestamp(), index.price),
        Err(e) => format!("{} err: {}", timestamp.timestamp(), e),
    }
}

fn error_kind(err: &MarketDataError) -> &'static str {
    match err {
        MarketDataError::NoPrices => "no_prices",
        MarketDataError::MalformedPrice { .. } => "malformed_price",
        MarketDataError::StreamClosed(_) => "stream_closed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use market_data::{price_channel, IndexMethod, Ticker, TickerPrice};

    #[test]
    fn test_next_boundary() {
        let minute = Duration::from_secs(60);
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 42).unwrap();
        assert_eq!(
            next_boundary(now, minute),
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 1, 0).unwrap()
        );

        // Exactly on a boundary moves to the next one.
        let on = Utc.with_ymd_and_hms(2024, 1, 1, 12, 1, 0).unwrap();
        assert_eq!(
            next_boundary(on, minute),
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 2, 0).unwrap()
        );

        assert_eq!(
            next_boundary(now, Duration::from_secs(15)),
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 45).unwrap()
        );
    }

    #[test]
    fn test_format_round() {
        let t = Utc.timestamp_opt(1_700_000_040, 0).unwrap();
        let ok = Ok(IndexPrice {
            ticker: Ticker::default(),
            price: 99.833_333,
            timestamp: t,
            sources: 3,
        });
        assert_eq!(format_round(t, &ok), "1700000040 99.83");
        assert_eq!(
            format_round(t, &Err(MarketDataError::NoPrices)),
            "1700000040 err: No prices for calculation"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_requested_rounds() {
        let (tx, stream) = price_channel(8);
        tx.try_send(TickerPrice::new(Ticker::default(), Utc::now(), "100.000000"))
            .unwrap();

        let mut calculator =
            IndexPriceCalculator::new(Ticker::default(), TimeDelta::seconds(60), IndexMethod::Mean)
                .with_streams([stream]);
        let metrics = IndexMetrics::new("BTC_USD");
        let scheduler = IndexScheduler::new(Duration::from_secs(1), Some(2));

        let rounds = scheduler
            .run(&mut calculator, &metrics, CancellationToken::new())
            .await;
        assert_eq!(rounds, 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_round() {
        let (_tx, stream) = price_channel(8);
        let mut calculator =
            IndexPriceCalculator::new(Ticker::default(), TimeDelta::seconds(60), IndexMethod::Mean)
                .with_streams([stream]);
        let token = CancellationToken::new();
        token.cancel();

        let rounds = IndexScheduler::new(Duration::from_secs(60), None)
            .run(&mut calculator, &IndexMetrics::new("BTC_USD"), token)
            .await;
        assert_eq!(rounds, 0);
    }
}
