//! Common types and data shared by the market engine, the feed and the CLI.
//!
//! This crate aggregates:
//! - `error`: unified error type `MarketError` used across the workspace.
//! - `result`: handy `Result<T, MarketError>` alias.
//! - `config`: refresh interval, rate limits, simulated latencies.
//! - `quote`: quotes, indices, daily bars, rounding and formatting helpers.
//! - `universe`: the static stock universe and market indices.
//! - `aliases`: nickname table used by fuzzy search.
//! - `prediction`: prediction requests, results and their lookup tables.
#![warn(missing_docs)]
pub mod aliases;
pub mod config;
pub mod error;
pub mod prediction;
pub mod quote;
pub mod result;
pub mod universe;

pub use error::MarketError;
pub use prediction::{ModelKind, PredictionRequest, PredictionResult, PricePrediction, Timeframe, Trend};
pub use quote::{HistoricalBar, MarketIndex, Quote};
pub use result::Result;
