//! Index Price Ticker Binary
//!
//! Starts the configured price feeds and prints an index price for every
//! interval boundary until interrupted.

mod scheduler;

use anyhow::{Context, Result};
use chrono::TimeDelta;
use cli::{Cli, Commands};
use config::{
    generate_default_config, load_config, save_config, validate_config, FeedConfig, FeedType,
    TickerConfig, ValidationReport,
};
use feeds::{ConstantPrice, MockFeed, PriceGenerator, RandomPrice};
use market_data::{IndexMethod, IndexPriceCalculator, Ticker};
use observability::{init_logging, init_metrics, IndexMetrics, LogFormat};
use scheduler::IndexScheduler;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Run {
            config,
            interval,
            window,
            rounds,
        } => run_command(config, interval, window, rounds).await,
        Commands::Validate { config } => {
            init_logging("ticker", LogFormat::Pretty)?;
            validate_command(config)
        }
        Commands::Init { output } => {
            init_logging("ticker", LogFormat::Pretty)?;
            init_command(output)
        }
    }
}

async fn run_command(
    config_path: PathBuf,
    interval_override: Option<u64>,
    window_override: Option<u64>,
    rounds: Option<u64>,
) -> Result<()> {
    // Logging isn't up yet, load errors surface through the returned error.
    let mut config = load_config(&config_path)?;
    if let Some(interval) = interval_override {
        config.index.interval_seconds = interval;
    }
    if let Some(window) = window_override {
        config.index.relevance_window_seconds = window;
    }

    let format = LogFormat::parse(&config.observability.log_format).unwrap_or_default();
    init_logging("ticker", format)?;
    debug!(?config, "Configuration loaded");

    let report = validate_config(&config);
    log_report(&report);
    if !report.is_valid() {
        anyhow::bail!("Cannot start ticker due to configuration errors");
    }

    if let Some(port) = config.observability.metrics_port {
        init_metrics(port)?;
    }

    let method = IndexMethod::parse(&config.index.method)
        .with_context(|| format!("Unknown index method: {}", config.index.method))?;
    let window = TimeDelta::from_std(config.index.relevance_window())
        .context("Relevance window out of range")?;
    let ticker = Ticker::new(config.ticker.as_str());

    info!(
        ticker = %ticker,
        method = method.as_str(),
        interval_seconds = config.index.interval_seconds,
        relevance_window_seconds = config.index.relevance_window_seconds,
        "Starting ticker"
    );

    let token = shutdown_on_ctrl_c();
    let mut calculator = IndexPriceCalculator::new(ticker.clone(), window, method);
    let mut handles = Vec::new();

    for feed_config in config.enabled_feeds() {
        let generator = build_generator(feed_config)?;
        let feed = MockFeed::new(feed_config.name.as_str(), ticker.clone(), feed_config.tick())
            .with_capacity(config.channel_capacity());
        let (stream, handle) = feed.spawn(generator, token.child_token());
        calculator.add_stream(stream);
        handles.push(handle);
    }

    let metrics = IndexMetrics::new(ticker.as_str());
    let scheduler = IndexScheduler::new(config.index.interval(), rounds);
    let completed = scheduler.run(&mut calculator, &metrics, token.clone()).await;

    token.cancel();
    for handle in handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "Feed task failed");
        }
    }

    info!(rounds = completed, "Ticker stopped");
    Ok(())
}

fn build_generator(feed: &FeedConfig) -> Result<Box<dyn PriceGenerator + Send>> {
    let generator: Box<dyn PriceGenerator + Send> = match feed.feed_type {
        FeedType::Constant => {
            let price = feed
                .price
                .with_context(|| format!("Feed '{}' requires a price", feed.name))?;
            Box::new(ConstantPrice(price))
        }
        FeedType::Random => {
            let (min, max) = feed
                .min
                .zip(feed.max)
                .with_context(|| format!("Feed '{}' requires min and max", feed.name))?;
            Box::new(RandomPrice::new(min, max))
        }
    };
    Ok(generator)
}

/// Token cancelled on Ctrl+C
fn shutdown_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, initiating graceful shutdown...");
                trigger.cancel();
            }
            Err(e) => {
                warn!("Failed to listen for Ctrl+C: {}", e);
            }
        }
    });

    token
}

fn log_report(report: &ValidationReport) {
    for default in &report.defaults_applied {
        debug!(field = %default.field, value = %default.value, "Default applied");
    }
    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message);
    }
    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
    }
}

fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            return Err(e);
        }
    };

    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    print_summary(&config);
    Ok(())
}

fn print_summary(config: &TickerConfig) {
    println!("[ok] Configuration is valid!");
    println!();
    println!("Ticker: {}", config.ticker);
    println!(
        "Index: {} every {}s, relevance window {}s",
        config.index.method, config.index.interval_seconds, config.index.relevance_window_seconds
    );
    println!(
        "Feeds: {} ({} enabled)",
        config.feeds.len(),
        config.enabled_feeds().count()
    );
}

fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("This configuration includes:");
    println!("  - Ticker {} with a mean index every 60s", config.ticker);
    println!("  - 2 constant feeds (100, 101) and 1 random feed (98-102)");
    println!();
    println!("Next steps:");
    println!("  1. Edit the configuration file to customize feeds");
    println!(
        "  2. Run 'ticker validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  3. Run 'ticker run --config {:?}' to start printing index prices",
        output_path
    );

    Ok(())
}
