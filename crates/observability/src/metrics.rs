//! Prometheus metrics infrastructure
//!
//! This module provides utilities for initializing Prometheus metrics
//! and the metric set recorded for every index round.

use metrics::{counter, gauge, Counter, Gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize the Prometheus metrics exporter
///
/// This starts an HTTP listener on the specified port that exposes metrics
/// at the `/metrics` endpoint. Must be called from within a Tokio runtime.
///
/// # Example
///
/// ```ignore
/// observability::metrics::init_metrics(9100)?;
/// // Metrics available at http://localhost:9100/metrics
/// ```
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// Metrics for index price rounds
///
/// # Metrics
///
/// * `index_rounds_total` - Rounds computed, successful or not
/// * `index_round_errors_total` - Rounds that produced an error, by kind
/// * `index_price` - Last computed index price
/// * `index_sources` - Feeds that contributed to the last successful round
/// * `index_closed_streams` - Feeds that delivered their terminal error
///
/// Without an installed recorder every call is a no-op.
#[derive(Clone)]
pub struct IndexMetrics {
    rounds_total: Counter,
    price: Gauge,
    sources: Gauge,
    closed_streams: Gauge,
    ticker: String,
}

impl IndexMetrics {
    /// Create metrics labelled with the ticker they describe
    pub fn new(ticker: &str) -> Self {
        let ticker = ticker.to_string();

        Self {
            rounds_total: counter!("index_rounds_total", "ticker" => ticker.clone()),
            price: gauge!("index_price", "ticker" => ticker.clone()),
            sources: gauge!("index_sources", "ticker" => ticker.clone()),
            closed_streams: gauge!("index_closed_streams", "ticker" => ticker.clone()),
            ticker,
        }
    }

    /// Record a successful round
    pub fn record_price(&self, price: f64, sources: usize) {
        self.rounds_total.increment(1);
        self.price.set(price);
        self.sources.set(sources as f64);
    }

    /// Record a failed round
    ///
    /// * `kind` - Short error class, e.g. "no_prices" or "malformed_price"
    pub fn record_error(&self, kind: &'static str) {
        self.rounds_total.increment(1);
        counter!(
            "index_round_errors_total",
            "ticker" => self.ticker.clone(),
            "kind" => kind
        )
        .increment(1);
        self.sources.set(0.0);
    }

    pub fn set_closed_streams(&self, count: usize) {
        self.closed_streams.set(count as f64);
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_metrics_without_recorder() {
        // Just verify recording doesn't panic
        let metrics = IndexMetrics::new("BTC_USD");
        metrics.record_price(100.5, 3);
        metrics.record_error("no_prices");
        metrics.set_closed_streams(1);
        assert_eq!(metrics.ticker(), "BTC_USD");
    }

    #[test]
    fn test_errors_counted_by_kind() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            let metrics = IndexMetrics::new("BTC_USD");
            metrics.record_error("no_prices");
            metrics.record_error("no_prices");
            metrics.record_error("malformed_price");
            metrics.record_price(100.0, 2);
        });

        let rendered = handle.render();
        let errors = |kind: &str| {
            rendered
                .lines()
                .find(|line| {
                    line.starts_with("index_round_errors_total{")
                        && line.contains(&format!("kind=\"{}\"", kind))
                })
                .map(str::to_string)
        };
        assert!(errors("no_prices").unwrap().ends_with(" 2"));
        assert!(errors("malformed_price").unwrap().ends_with(" 1"));
        assert!(rendered
            .lines()
            .any(|line| line.starts_with("index_rounds_total{") && line.ends_with(" 4")));
    }
}
