//! Prediction request/response types and the fixed lookup tables behind them.
//!
//! `Timeframe` decides how much history is simulated and how many steps are
//! forecast; `ModelKind` decides which forecaster runs and the confidence and
//! accuracy constants reported with it. Unknown request text never fails:
//! [`PredictionRequest::parse`] falls back to `6m` and `sma`.

use chrono::NaiveDate;
use clap::ValueEnum;
use log::warn;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Forecast window requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Timeframe {
    /// One day ahead.
    #[serde(rename = "1d")]
    #[strum(serialize = "1d")]
    OneDay,
    /// One week ahead.
    #[serde(rename = "1w")]
    #[strum(serialize = "1w")]
    OneWeek,
    /// One month ahead.
    #[serde(rename = "1m")]
    #[strum(serialize = "1m")]
    OneMonth,
    /// Three months ahead.
    #[serde(rename = "3m")]
    #[strum(serialize = "3m")]
    ThreeMonths,
    /// Six months ahead.
    #[serde(rename = "6m")]
    #[strum(serialize = "6m")]
    SixMonths,
}

impl Timeframe {
    /// Calendar days of simulated history fed to the model.
    pub fn history_days(self) -> u32 {
        match self {
            Timeframe::OneDay => 30,
            Timeframe::OneWeek => 90,
            Timeframe::OneMonth => 180,
            Timeframe::ThreeMonths => 365,
            Timeframe::SixMonths => 730,
        }
    }

    /// Number of forecast steps.
    pub fn horizon(self) -> usize {
        match self {
            Timeframe::OneDay => 1,
            Timeframe::OneWeek => 7,
            Timeframe::OneMonth => 30,
            Timeframe::ThreeMonths => 90,
            Timeframe::SixMonths => 180,
        }
    }
}

/// Forecasting model. `Lstm` is the pattern-similarity model; the name is kept
/// for compatibility with existing requests.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ModelKind {
    /// Least-squares trend line.
    Linear,
    /// Simple moving average with a trend term.
    Sma,
    /// Exponential moving average with a trend term.
    Ema,
    /// Pattern similarity over past windows.
    #[strum(to_string = "lstm", serialize = "pattern")]
    Lstm,
}

/// Human-facing description of a model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelInfo {
    /// Display name.
    pub name: &'static str,
    /// One-sentence summary.
    pub description: &'static str,
    /// Model-intrinsic accuracy, in `[0, 1]`.
    pub accuracy: f64,
    /// Market conditions the model suits.
    pub best_for: &'static str,
}

impl ModelKind {
    /// Every model in catalogue order.
    pub fn all() -> impl Iterator<Item = ModelKind> {
        ModelKind::iter()
    }

    /// Confidence of the first forecast step.
    pub fn base_confidence(self) -> f64 {
        match self {
            ModelKind::Linear => 0.65,
            ModelKind::Sma => 0.70,
            ModelKind::Ema => 0.75,
            ModelKind::Lstm => 0.80,
        }
    }

    /// Model-intrinsic accuracy constant reported with every result.
    pub fn accuracy(self) -> f64 {
        match self {
            ModelKind::Linear => 0.72,
            ModelKind::Sma => 0.68,
            ModelKind::Ema => 0.74,
            ModelKind::Lstm => 0.78,
        }
    }

    /// Catalogue entry shown to users.
    pub fn info(self) -> ModelInfo {
        let (name, description, best_for) = match self {
            ModelKind::Linear => (
                "Linear Regression",
                "Uses linear trend analysis to predict future prices",
                "Short-term trends",
            ),
            ModelKind::Sma => (
                "Simple Moving Average",
                "Based on average price over recent periods",
                "Stable markets",
            ),
            ModelKind::Ema => (
                "Exponential Moving Average",
                "Gives more weight to recent price movements",
                "Trending markets",
            ),
            ModelKind::Lstm => (
                "Pattern Recognition",
                "Identifies similar historical patterns",
                "Complex market patterns",
            ),
        };
        ModelInfo {
            name,
            description,
            accuracy: self.accuracy(),
            best_for,
        }
    }
}

/// Chart window of the detail view.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum ChartRange {
    /// 30 calendar days.
    #[value(name = "1M")]
    #[serde(rename = "1M")]
    #[strum(serialize = "1M")]
    OneMonth,
    /// 90 calendar days.
    #[value(name = "3M")]
    #[serde(rename = "3M")]
    #[strum(serialize = "3M")]
    ThreeMonths,
    /// 180 calendar days.
    #[value(name = "6M")]
    #[serde(rename = "6M")]
    #[strum(serialize = "6M")]
    SixMonths,
    /// 365 calendar days.
    #[value(name = "1Y")]
    #[serde(rename = "1Y")]
    #[strum(serialize = "1Y")]
    OneYear,
    /// 730 calendar days.
    #[value(name = "2Y")]
    #[serde(rename = "2Y")]
    #[strum(serialize = "2Y")]
    TwoYears,
}

impl ChartRange {
    /// Calendar days of history covered by the range.
    pub fn days(self) -> u32 {
        match self {
            ChartRange::OneMonth => 30,
            ChartRange::ThreeMonths => 90,
            ChartRange::SixMonths => 180,
            ChartRange::OneYear => 365,
            ChartRange::TwoYears => 730,
        }
    }
}

/// A forecast request for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Forecast window.
    pub timeframe: Timeframe,
    /// Forecaster to run.
    pub model: ModelKind,
}

impl PredictionRequest {
    /// Request for `model` over `timeframe`.
    pub fn new(timeframe: Timeframe, model: ModelKind) -> Self {
        PredictionRequest { timeframe, model }
    }

    /// Build a request from free text. Unrecognised values are logged and
    /// replaced by `6m` / `sma`.
    pub fn parse(timeframe: &str, model: &str) -> Self {
        let timeframe = timeframe.trim().parse().unwrap_or_else(|_| {
            warn!("Unknown timeframe '{}', using 6m", timeframe);
            Timeframe::SixMonths
        });
        let model = model.trim().parse().unwrap_or_else(|_| {
            warn!("Unknown model '{}', using sma", model);
            ModelKind::Sma
        });
        PredictionRequest { timeframe, model }
    }
}

/// Direction of the forecast relative to the live price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Trend {
    /// Forecast more than 2% above the live price.
    Bullish,
    /// Forecast more than 2% below the live price.
    Bearish,
    /// Within 2% of the live price.
    Neutral,
}

impl Trend {
    /// Relative move threshold separating a trend from noise.
    pub const THRESHOLD: f64 = 0.02;

    /// Classify the move from `current_price` to `forecast_price`.
    pub fn classify(current_price: f64, forecast_price: f64) -> Trend {
        if current_price == 0.0 {
            return Trend::Neutral;
        }
        let change = (forecast_price - current_price) / current_price;
        if change > Self::THRESHOLD {
            Trend::Bullish
        } else if change < -Self::THRESHOLD {
            Trend::Bearish
        } else {
            Trend::Neutral
        }
    }
}

/// One forecast step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePrediction {
    /// Day the step forecasts.
    pub date: NaiveDate,
    /// Point forecast.
    pub price: f64,
    /// Upper band.
    pub high: f64,
    /// Lower band.
    pub low: f64,
    /// Confidence in `[0.5, 1]`.
    pub confidence: f64,
}

/// Full response of the prediction orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    /// Forecast symbol.
    pub symbol: String,
    /// Live price at request time.
    pub current_price: f64,
    /// One entry per forecast step, in date order.
    pub predictions: Vec<PricePrediction>,
    /// Confidence of the first step.
    pub confidence: f64,
    /// Model-intrinsic accuracy.
    pub accuracy: f64,
    /// Direction of the last step against the live price.
    pub trend: Trend,
}
