use crate::*;
use std::collections::HashSet;
use thiserror::Error;

const VALID_METHODS: [&str; 3] = ["mean", "average", "median"];
const VALID_LOG_FORMATS: [&str; 3] = ["pretty", "json", "compact"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Ticker is required")]
    MissingTicker,

    #[error("index.interval_seconds must be a positive integer")]
    InvalidInterval,

    #[error("Invalid index method: {0}. Must be one of: mean, median")]
    InvalidMethod(String),

    #[error("No feeds defined")]
    NoFeeds,

    #[error("At least one feed must be enabled")]
    NoEnabledFeeds,

    #[error("Duplicate feed name '{0}'")]
    DuplicateFeed(String),

    #[error("Feed '{name}': {message}")]
    InvalidFeed { name: String, message: String },

    #[error("channel_capacity must be a positive integer")]
    InvalidChannelCapacity,

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("Environment variable placeholder '{0}' was not resolved")]
    UnresolvedEnvVar(String),
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(config: &TickerConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    if config.ticker.trim().is_empty() {
        report.add_error(ValidationError::MissingTicker);
    } else if has_unresolved_env_vars(&config.ticker) {
        report.add_error(ValidationError::UnresolvedEnvVar(config.ticker.clone()));
    }

    validate_index(&config.index, &mut report);
    validate_feeds(&config.feeds, &mut report);

    match config.channel_capacity {
        Some(0) => report.add_error(ValidationError::InvalidChannelCapacity),
        Some(_) => {}
        None => report.add_default(
            "channel_capacity",
            &default_channel_capacity().to_string(),
        ),
    }

    validate_observability(&config.observability, &mut report);

    report
}

fn validate_index(index: &IndexConfig, report: &mut ValidationReport) {
    if index.interval_seconds == 0 {
        report.add_error(ValidationError::InvalidInterval);
    }

    if !VALID_METHODS.contains(&index.method.to_lowercase().as_str()) {
        report.add_error(ValidationError::InvalidMethod(index.method.clone()));
    }

    if index.relevance_window_seconds == 0 {
        report.add_warning(
            "index.relevance_window_seconds",
            "Only prices stamped exactly at the index timestamp will be used",
        );
    } else if index.interval_seconds > 0 && index.relevance_window_seconds > index.interval_seconds
    {
        report.add_warning(
            "index.relevance_window_seconds",
            "Relevance window is longer than the interval, a silent feed keeps contributing its last price to several rounds",
        );
    }
}

fn validate_feeds(feeds: &[FeedConfig], report: &mut ValidationReport) {
    if feeds.is_empty() {
        report.add_error(ValidationError::NoFeeds);
        return;
    }

    let mut names = HashSet::new();
    let mut enabled_count = 0;

    for feed in feeds {
        if !names.insert(feed.name.as_str()) {
            report.add_error(ValidationError::DuplicateFeed(feed.name.clone()));
        }

        if feed.enabled {
            enabled_count += 1;
        } else {
            report.add_warning(&format!("feeds.{}", feed.name), "Feed is disabled");
        }

        validate_feed(feed, report);
    }

    if enabled_count == 0 {
        report.add_error(ValidationError::NoEnabledFeeds);
    }
}

fn validate_feed(feed: &FeedConfig, report: &mut ValidationReport) {
    let invalid = |message: String| ValidationError::InvalidFeed {
        name: if feed.name.is_empty() {
            "unknown".to_string()
        } else {
            feed.name.clone()
        },
        message,
    };

    if feed.name.is_empty() {
        report.add_error(invalid("Name is required".to_string()));
    }

    match feed.tick_ms {
        Some(0) => report.add_error(invalid("tick_ms must be a positive integer".to_string())),
        Some(_) => {}
        None => report.add_default(
            &format!("feeds.{}.tick_ms", feed.name),
            &default_tick_ms().to_string(),
        ),
    }

    match feed.feed_type {
        FeedType::Constant => match feed.price {
            None => report.add_error(invalid("constant feed requires a price".to_string())),
            Some(price) if !price.is_finite() || price <= 0.0 => {
                report.add_error(invalid(format!("price must be positive, got: {}", price)))
            }
            Some(_) => {}
        },
        FeedType::Random => match (feed.min, feed.max) {
            (Some(min), Some(max)) => {
                if !min.is_finite() || !max.is_finite() || min <= 0.0 {
                    report.add_error(invalid(format!(
                        "bounds must be positive, got: [{}, {})",
                        min, max
                    )));
                } else if min >= max {
                    report.add_error(invalid(format!(
                        "min must be lower than max, got: [{}, {})",
                        min, max
                    )));
                }
            }
            _ => report.add_error(invalid("random feed requires min and max".to_string())),
        },
    }
}

fn validate_observability(observability: &ObservabilityConfig, report: &mut ValidationReport) {
    if !VALID_LOG_FORMATS.contains(&observability.log_format.to_lowercase().as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(
            observability.log_format.clone(),
        ));
    }

    if observability.metrics_port == Some(0) {
        report.add_warning(
            "observability.metrics_port",
            "Port 0 lets the OS pick a random port for the metrics exporter",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn config_with_feeds(feeds: Vec<FeedConfig>) -> TickerConfig {
        TickerConfig {
            feeds,
            ..generate_default_config()
        }
    }

    #[test]
    fn test_no_feeds() {
        let report = validate_config(&config_with_feeds(vec![]));
        assert!(!report.is_valid());
        assert_eq!(report.errors, vec![ValidationError::NoFeeds]);
    }

    #[test]
    fn test_all_feeds_disabled() {
        let mut feed = FeedConfig::constant("c", 100.0);
        feed.enabled = false;
        let report = validate_config(&config_with_feeds(vec![feed]));

        assert!(report.errors.contains(&ValidationError::NoEnabledFeeds));
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_duplicate_feed_names() {
        let report = validate_config(&config_with_feeds(vec![
            FeedConfig::constant("dup", 100.0),
            FeedConfig::constant("dup", 101.0),
        ]));
        assert_eq!(report.errors, vec![ValidationError::DuplicateFeed("dup".to_string())]);
    }

    #[test]
    fn test_invalid_feed_parameters() {
        let mut no_price = FeedConfig::constant("no-price", 1.0);
        no_price.price = None;
        let mut zero_tick = FeedConfig::constant("zero-tick", 1.0);
        zero_tick.tick_ms = Some(0);

        let report = validate_config(&config_with_feeds(vec![
            no_price,
            zero_tick,
            FeedConfig::random("inverted", 102.0, 98.0),
            FeedConfig::constant("negative", -5.0),
        ]));

        assert_eq!(report.errors.len(), 4);
        for err in &report.errors {
            assert_matches!(err, ValidationError::InvalidFeed { .. });
        }
    }

    #[test]
    fn test_defaults_recorded() {
        let mut feed = FeedConfig::random("r", 1.0, 2.0);
        feed.tick_ms = None;
        let mut config = config_with_feeds(vec![feed]);
        config.channel_capacity = None;

        let report = validate_config(&config);
        assert!(report.is_valid());
        let fields: Vec<_> = report.defaults_applied.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["feeds.r.tick_ms", "channel_capacity"]);
    }

    #[test]
    fn test_index_settings() {
        let mut config = generate_default_config();
        config.index.interval_seconds = 0;
        config.index.method = "vwap".to_string();
        config.observability.log_format = "xml".to_string();

        let report = validate_config(&config);
        assert_eq!(
            report.errors,
            vec![
                ValidationError::InvalidInterval,
                ValidationError::InvalidMethod("vwap".to_string()),
                ValidationError::InvalidLogFormat("xml".to_string()),
            ]
        );
    }

    #[test]
    fn test_window_warnings() {
        let mut config = generate_default_config();
        config.index.relevance_window_seconds = 300;
        let report = validate_config(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);

        config.index.relevance_window_seconds = 0;
        let report = validate_config(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].field, "index.relevance_window_seconds");
    }

    #[test]
    fn test_unresolved_ticker() {
        let mut config = generate_default_config();
        config.ticker = "${UNSET_TICKER}".to_string();
        let report = validate_config(&config);
        assert_matches!(report.errors.as_slice(), [ValidationError::UnresolvedEnvVar(_)]);
    }
}
