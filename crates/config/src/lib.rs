use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TickerConfig {
    #[serde(default = "default_ticker")]
    pub ticker: String,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
    /// Price buffer size of each feed channel
    #[serde(rename = "channel_capacity")]
    #[serde(default)]
    pub channel_capacity: Option<usize>,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl TickerConfig {
    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity.unwrap_or_else(default_channel_capacity)
    }

    pub fn enabled_feeds(&self) -> impl Iterator<Item = &FeedConfig> {
        self.feeds.iter().filter(|f| f.enabled)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Seconds between two index timestamps
    #[serde(rename = "interval_seconds")]
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    /// Maximum age of a feed price still taking part in the index
    #[serde(rename = "relevance_window_seconds")]
    #[serde(default = "default_relevance_window_seconds")]
    pub relevance_window_seconds: u64,
    /// Reduction applied to the collected prices (mean or median)
    #[serde(default = "default_method")]
    pub method: String,
}

impl IndexConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn relevance_window(&self) -> Duration {
        Duration::from_secs(self.relevance_window_seconds)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            relevance_window_seconds: default_relevance_window_seconds(),
            method: default_method(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedType {
    /// Emits a fixed price
    Constant,
    /// Emits prices drawn uniformly from [min, max)
    Random,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub feed_type: FeedType,
    /// Price of a constant feed
    #[serde(default)]
    pub price: Option<f64>,
    /// Lower bound of a random feed
    #[serde(default)]
    pub min: Option<f64>,
    /// Upper bound of a random feed
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(rename = "tick_ms")]
    #[serde(default)]
    pub tick_ms: Option<u64>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl FeedConfig {
    pub fn constant(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            feed_type: FeedType::Constant,
            price: Some(price),
            min: None,
            max: None,
            tick_ms: Some(default_tick_ms()),
            enabled: true,
        }
    }

    pub fn random(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            feed_type: FeedType::Random,
            price: None,
            min: Some(min),
            max: Some(max),
            tick_ms: Some(default_tick_ms()),
            enabled: true,
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.unwrap_or_else(default_tick_ms))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// pretty, json or compact
    #[serde(rename = "log_format")]
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Prometheus exporter port, metrics are disabled when unset
    #[serde(rename = "metrics_port")]
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            metrics_port: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
ticker: BTC_USD
index:
  interval_seconds: 60
  relevance_window_seconds: 30
  method: median
feeds:
  - name: constant-100
    type: constant
    price: 100.0
  - name: random-98-102
    type: random
    min: 98.0
    max: 102.0
    tick_ms: 250
    enabled: false
observability:
  log_format: json
  metrics_port: 9100
"#;

    #[test]
    fn test_parse_sample() {
        let config: TickerConfig = serde_yaml::from_str(SAMPLE).unwrap();

        assert_eq!(config.ticker, "BTC_USD");
        assert_eq!(config.index.relevance_window(), Duration::from_secs(30));
        assert_eq!(config.index.method, "median");
        assert_eq!(config.feeds.len(), 2);
        assert_eq!(config.feeds[0].feed_type, FeedType::Constant);
        assert_eq!(config.feeds[0].tick(), Duration::from_millis(1000));
        assert_eq!(config.feeds[1].tick(), Duration::from_millis(250));
        assert_eq!(config.enabled_feeds().count(), 1);
        assert_eq!(config.channel_capacity(), 120);
        assert_eq!(config.observability.metrics_port, Some(9100));
    }

    #[test]
    fn test_sections_default() {
        let config: TickerConfig = serde_yaml::from_str("feeds: []").unwrap();

        assert_eq!(config.ticker, "BTC_USD");
        assert_eq!(config.index.interval(), Duration::from_secs(60));
        assert_eq!(config.index.method, "mean");
        assert_eq!(config.observability.log_format, "pretty");
        assert!(config.observability.metrics_port.is_none());
    }

    #[test]
    fn test_unknown_feed_type_rejected() {
        let yaml = "feeds:\n  - name: x\n    type: websocket\n";
        assert!(serde_yaml::from_str::<TickerConfig>(yaml).is_err());
    }
}
