use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ticker")]
#[command(about = "Index price ticker - aggregates price feeds into a periodic index price")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the feeds and print an index price every interval
    Run {
        /// Path to the configuration file
        #[arg(short, long, default_value = "config/ticker.yaml", env = "TICKER_CONFIG")]
        config: PathBuf,

        /// Override the interval between index timestamps (seconds)
        #[arg(long)]
        interval: Option<u64>,

        /// Override the relevance window (seconds)
        #[arg(long)]
        window: Option<u64>,

        /// Stop after this many rounds
        #[arg(long)]
        rounds: Option<u64>,
    },

    /// Validate configuration without starting the ticker
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "config/ticker.yaml", env = "TICKER_CONFIG")]
        config: PathBuf,
    },

    /// Initialize a new configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "ticker.yaml")]
        output: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
