//! Command-line arguments for the market CLI.
//!
//! Subcommands and global options, parsed with `clap` derive.
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use market_common::config::{DEFAULT_ACCOUNTS_PATH, MAX_SEARCH_RESULTS};
use market_common::prediction::ChartRange;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Stock dashboard in the terminal", long_about = None)]
pub struct Args {
    /// JSON universe file to use instead of the built-in one.
    #[arg(long, global = true)]
    pub universe: Option<PathBuf>,

    /// Where accounts and the current session are kept.
    #[arg(long, global = true, default_value = DEFAULT_ACCOUNTS_PATH)]
    pub accounts: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search stocks by symbol, name or nickname. Without a query, lists all.
    Search {
        query: Vec<String>,
        /// Show the match score of every hit.
        #[arg(long)]
        scores: bool,
        /// Maximum number of hits.
        #[arg(long, default_value_t = MAX_SEARCH_RESULTS)]
        limit: usize,
    },
    /// Show the latest quote for a symbol.
    Quote { symbol: String },
    /// Show simulated daily history and period statistics.
    History {
        symbol: String,
        #[arg(long, value_enum, default_value_t = ChartRange::OneYear)]
        range: ChartRange,
        /// Number of most recent bars to print.
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Forecast a symbol's price.
    Predict {
        symbol: String,
        /// 1d, 1w, 1m, 3m or 6m.
        #[arg(long, default_value = "6m")]
        timeframe: String,
        /// linear, sma, ema or lstm.
        #[arg(long, default_value = "sma")]
        model: String,
        /// Number of forecast rows to print.
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Correlation of two symbols' simulated closes.
    Correlate {
        first: String,
        second: String,
        #[arg(long, value_enum, default_value_t = ChartRange::SixMonths)]
        range: ChartRange,
    },
    /// List the available forecasting models.
    Models,
    /// Create an account and sign in.
    Signup {
        name: String,
        email: String,
        password: String,
    },
    /// Sign in to an existing account.
    Login { email: String, password: String },
    /// Sign out.
    Logout,
    /// Add a symbol to the watchlist, or remove it if already watched.
    Watch { symbol: String },
    /// Show quotes for every watched symbol.
    Watchlist,
}
