//! Point forecasters over a close-price history.
//!
//! All models share one shape: they read a history of closes, produce
//! `periods` forecasts rounded to two decimals and never touch the input.
//! `periods == 0` or an empty history yields an empty forecast.

pub mod ema;
pub mod linear;
pub mod pattern;
pub mod sma;

use market_common::ModelKind;
use rand::Rng;

/// Run the forecaster selected by `model`.
pub fn forecast<R: Rng + ?Sized>(
    model: ModelKind,
    closes: &[f64],
    periods: usize,
    rng: &mut R,
) -> Vec<f64> {
    match model {
        ModelKind::Linear => linear::forecast(closes, periods, rng),
        ModelKind::Sma => sma::forecast(closes, periods, rng),
        ModelKind::Ema => ema::forecast(closes, periods, rng),
        ModelKind::Lstm => pattern::forecast(closes, periods, rng),
    }
}

/// Value `lag` positions before the end of `series` (`series[len - lag]`),
/// or the oldest value when the series is shorter than `lag`.
pub(crate) fn lagged(series: &[f64], lag: usize) -> f64 {
    let index = series.len().saturating_sub(lag);
    series.get(index).copied().unwrap_or_default()
}
