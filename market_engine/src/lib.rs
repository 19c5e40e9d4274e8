//! Market engine: search, simulation, forecasting and data plumbing.
//!
//! - `search`: tiered symbol search over a universe.
//! - `simulator`: synthetic daily OHLCV histories.
//! - `forecast`: linear, SMA, EMA and pattern-match forecasters.
//! - `correlation`: Pearson correlation of two series.
//! - `predictor`: turns a quote and a request into a `PredictionResult`.
//! - `source`: quote sources, simulated fallback and its tagging.
//! - `rate_limiter`: per-minute / per-day request budget.
//! - `accounts`: mock users and watchlists.
//! - `refresher`: periodic refresh broadcast to subscribers.
#![warn(missing_docs)]
pub mod accounts;
pub mod correlation;
pub mod forecast;
pub mod predictor;
pub mod rate_limiter;
pub mod refresher;
pub mod search;
pub mod simulator;
pub mod source;

pub use predictor::Predictor;
pub use search::{SearchEngine, SearchHit};
pub use source::{QuoteSource, SimulatedSource};
