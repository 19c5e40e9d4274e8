//! Ordinary least-squares trend line.

use market_common::quote::round2;
use rand::Rng;

/// Half-width of the multiplicative noise (±1%).
const NOISE: f64 = 0.01;

/// Fit `close = slope * index + intercept` over the whole history.
///
/// A degenerate fit (single point) is a flat line through the mean.
pub fn fit(closes: &[f64]) -> (f64, f64) {
    let n = closes.len() as f64;
    if closes.is_empty() {
        return (0.0, 0.0);
    }
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (i, &y) in closes.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }
    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return (0.0, sum_y / n);
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    (slope, intercept)
}

/// Extend the fitted line past the last index, with ±1% noise per step.
pub fn forecast<R: Rng + ?Sized>(closes: &[f64], periods: usize, rng: &mut R) -> Vec<f64> {
    if periods == 0 || closes.is_empty() {
        return Vec::new();
    }
    let (slope, intercept) = fit(closes);
    let n = closes.len();
    (0..periods)
        .map(|step| {
            let point = slope * (n + step) as f64 + intercept;
            let noise = rng.random_range(-NOISE..NOISE) * point;
            round2(point + noise)
        })
        .collect()
}
