//! 12-period exponential moving average projected forward.

use market_common::quote::round2;
use rand::Rng;

use super::lagged;

const PERIOD: f64 = 12.0;
const TREND_LAG: usize = 5;
const NOISE: f64 = 0.0075;

/// Smoothing factor `2 / (PERIOD + 1)`.
pub fn alpha() -> f64 {
    2.0 / (PERIOD + 1.0)
}

/// EMA over the whole history, seeded at the first close.
pub fn seed(closes: &[f64]) -> Option<f64> {
    let (&first, rest) = closes.split_first()?;
    let alpha = alpha();
    Some(
        rest.iter()
            .fold(first, |ema, &price| alpha * price + (1.0 - alpha) * ema),
    )
}

/// Forecast `periods` closes by projecting the EMA with a five-day trend.
pub fn forecast<R: Rng + ?Sized>(closes: &[f64], periods: usize, rng: &mut R) -> Vec<f64> {
    if periods == 0 {
        return Vec::new();
    }
    let Some(mut ema) = seed(closes) else {
        return Vec::new();
    };
    let alpha = alpha();
    let last = closes[closes.len() - 1];
    let trend = (last - lagged(closes, TREND_LAG)) / TREND_LAG as f64;

    (0..periods)
        .map(|_| {
            let target = ema + trend + ema * rng.random_range(-NOISE..NOISE);
            ema = alpha * target + (1.0 - alpha) * ema;
            round2(ema)
        })
        .collect()
}
