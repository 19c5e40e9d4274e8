//! Pattern-similarity forecaster.
//!
//! The last `WINDOW` closes form a query. Every earlier window of the same
//! length whose Pearson correlation with the query exceeds
//! `SIMILARITY_THRESHOLD` is an analogue, and the close that followed it is
//! collected. Forecasts average those follow-up closes; without analogues the
//! query's own slope is extrapolated. Histories shorter than `WINDOW` go to the
//! SMA model.

use std::collections::VecDeque;

use log::debug;
use market_common::quote::round2;
use rand::Rng;

use super::sma;
use crate::correlation::correlation;

/// Length of the compared windows.
pub const WINDOW: usize = 10;
/// Minimum correlation for a window to count as analogous.
pub const SIMILARITY_THRESHOLD: f64 = 0.7;
const NOISE: f64 = 0.01;

/// Closes that followed windows analogous to the last `WINDOW` closes.
pub fn analogue_successors(closes: &[f64]) -> Vec<f64> {
    if closes.len() < WINDOW {
        return Vec::new();
    }
    let query = &closes[closes.len() - WINDOW..];
    closes
        .windows(WINDOW + 1)
        .filter(|candidate| correlation(query, &candidate[..WINDOW]) > SIMILARITY_THRESHOLD)
        .map(|candidate| candidate[WINDOW])
        .collect()
}

/// Forecast `periods` closes from historical analogues; short histories use SMA.
pub fn forecast<R: Rng + ?Sized>(closes: &[f64], periods: usize, rng: &mut R) -> Vec<f64> {
    if closes.len() < WINDOW {
        return sma::forecast(closes, periods, rng);
    }
    if periods == 0 {
        return Vec::new();
    }

    let successors = analogue_successors(closes);
    debug!("Pattern model found {} analogues", successors.len());
    let average =
        (!successors.is_empty()).then(|| successors.iter().sum::<f64>() / successors.len() as f64);

    let mut query: VecDeque<f64> = closes[closes.len() - WINDOW..].iter().copied().collect();
    let mut out = Vec::with_capacity(periods);

    for _ in 0..periods {
        let first = query.front().copied().unwrap_or_default();
        let last = query.back().copied().unwrap_or_default();
        let trend = (last - first) / WINDOW as f64;
        let next = match average {
            Some(avg) => avg + trend + rng.random_range(-0.5..0.5) * avg * NOISE,
            None => last + trend,
        };
        out.push(round2(next));
        query.pop_front();
        query.push_back(next);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn short_history_matches_sma_exactly() {
        let closes = [101.0, 102.5, 99.8, 100.4, 103.3, 104.0];
        let expected = sma::forecast(&closes, 12, &mut StdRng::seed_from_u64(77));
        let actual = forecast(&closes, 12, &mut StdRng::seed_from_u64(77));
        assert_eq!(actual, expected);
    }

    #[test]
    fn anti_correlated_history_extrapolates_query_slope() {
        let closes: Vec<f64> = (0..11).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect();
        assert!(analogue_successors(&closes).is_empty());
        let out = forecast(&closes, 2, &mut StdRng::seed_from_u64(0));
        assert_eq!(out, vec![99.9, 99.89]);
    }

    #[test]
    fn repeating_pattern_finds_analogues() {
        let cycle = [100.0, 102.0, 104.0, 103.0, 101.0, 99.0, 98.0, 97.0, 99.0, 100.5];
        let closes: Vec<f64> = cycle.iter().cycle().take(60).copied().collect();
        let successors = analogue_successors(&closes);
        assert!(!successors.is_empty());
        // every full repetition of the query is followed by the cycle's first value
        assert!(successors.iter().filter(|v| **v == 100.0).count() >= 4);
    }

    #[test]
    fn forecasts_hover_around_analogue_average() {
        let cycle = [100.0, 102.0, 104.0, 103.0, 101.0, 99.0, 98.0, 97.0, 99.0, 100.5];
        let closes: Vec<f64> = cycle.iter().cycle().take(60).copied().collect();
        let successors = analogue_successors(&closes);
        let avg = successors.iter().sum::<f64>() / successors.len() as f64;
        let out = forecast(&closes, 5, &mut StdRng::seed_from_u64(3));
        assert!(out.iter().all(|p| (p - avg).abs() < 5.0));
    }
}
