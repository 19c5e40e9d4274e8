//! Rolling simple moving average with a short momentum term.
//!
//! Each forecast is appended to a private working series, so later windows
//! average over earlier forecasts.

use market_common::quote::round2;
use rand::Rng;

use super::lagged;

/// Maximum window length.
pub const WINDOW: usize = 20;
const TREND_LAG: usize = 10;
const NOISE: f64 = 0.005;

/// Forecast `periods` closes from the rolling mean plus momentum.
pub fn forecast<R: Rng + ?Sized>(closes: &[f64], periods: usize, rng: &mut R) -> Vec<f64> {
    if periods == 0 || closes.is_empty() {
        return Vec::new();
    }
    let mut series = closes.to_vec();
    let mut out = Vec::with_capacity(periods);

    for _ in 0..periods {
        let window = &series[series.len() - WINDOW.min(series.len())..];
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        let last = series[series.len() - 1];
        let trend = (last - lagged(&series, TREND_LAG)) / TREND_LAG as f64;
        let next = mean + trend + mean * rng.random_range(-NOISE..NOISE);

        out.push(round2(next));
        series.push(next);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn flat_history_stays_near_level() {
        let closes = vec![250.0; 40];
        let mut rng = StdRng::seed_from_u64(4);
        let out = forecast(&closes, 5, &mut rng);
        // trend starts at zero; noise is bounded by half a percent per step
        assert!((out[0] - 250.0).abs() <= 250.0 * NOISE + 0.01);
        assert!(out.iter().all(|p| (p - 250.0).abs() < 10.0));
    }

    #[test]
    fn short_history_uses_whole_series() {
        let closes = [10.0, 11.0, 12.0];
        let mut rng = StdRng::seed_from_u64(8);
        let out = forecast(&closes, 3, &mut rng);
        assert_eq!(out.len(), 3);
        // mean 11 + trend (12 - 10) / 10 = 11.2, ± 0.5%
        assert!((out[0] - 11.2).abs() <= 11.0 * NOISE + 0.01);
    }
}
