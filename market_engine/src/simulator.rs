//! Synthetic daily price history.
//!
//! The simulator walks a price forward one calendar day at a time starting
//! `days` before `today`, skipping weekends. Each trading day's return is the
//! sum of two slow cyclic terms, a uniform random term and, for the detail
//! profile, an occasional news shock. The walk is seeded at the quote's
//! previous close and floored at a fraction of its live price.
//!
//! Randomness comes exclusively from the caller's generator, so a seeded
//! `StdRng` reproduces the exact same series.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use log::debug;
use market_common::quote::round2;
use market_common::{HistoricalBar, Quote};
use rand::Rng;

/// Shape parameters of a simulated walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationProfile {
    /// Half-width of the uniform daily return.
    pub volatility: f64,
    /// Period of the slow cyclic term, in days.
    pub slow_period: f64,
    /// Amplitude of the slow cyclic term.
    pub slow_weight: f64,
    /// Period of the fast cyclic term, in days.
    pub fast_period: f64,
    /// Amplitude of the fast cyclic term.
    pub fast_weight: f64,
    /// Maximum intraday excursion above/below the close, as a fraction.
    pub band: f64,
    /// Daily probability of a news shock.
    pub shock_probability: f64,
    /// Half-width of the uniform shock return.
    pub shock_magnitude: f64,
    /// Lowest daily volume.
    pub min_volume: u64,
    /// Highest daily volume.
    pub max_volume: u64,
    /// Lowest allowed price as a fraction of the quote's live price.
    pub floor_ratio: f64,
}

impl SimulationProfile {
    /// Plain random walk used as forecasting input.
    pub const PLAIN: SimulationProfile = SimulationProfile {
        volatility: 0.02,
        slow_period: 10.0,
        slow_weight: 0.001,
        fast_period: 5.0,
        fast_weight: 0.0,
        band: 0.01,
        shock_probability: 0.0,
        shock_magnitude: 0.0,
        min_volume: 500_000,
        max_volume: 1_500_000,
        floor_ratio: 0.1,
    };

    /// Trend + cycle + news-shock walk used by the chart view.
    pub const DETAIL: SimulationProfile = SimulationProfile {
        volatility: 0.02,
        slow_period: 30.0,
        slow_weight: 0.001,
        fast_period: 5.0,
        fast_weight: 0.005,
        band: 0.02,
        shock_probability: 0.05,
        shock_magnitude: 0.05,
        min_volume: 500_000,
        max_volume: 2_500_000,
        floor_ratio: 0.1,
    };

    fn daily_return<R: Rng + ?Sized>(&self, rng: &mut R, day: usize) -> f64 {
        let i = day as f64;
        let mut change = (i / self.slow_period).sin() * self.slow_weight
            + (i / self.fast_period).sin() * self.fast_weight
            + rng.random_range(-self.volatility..=self.volatility);
        if self.shock_probability > 0.0 && rng.random_bool(self.shock_probability) {
            change += rng.random_range(-self.shock_magnitude..=self.shock_magnitude);
        }
        change
    }
}

/// Generates synthetic OHLCV histories for a quote.
#[derive(Debug, Clone, Copy)]
pub struct HistorySimulator {
    profile: SimulationProfile,
}

impl HistorySimulator {
    /// Simulator walking with `profile`.
    pub fn new(profile: SimulationProfile) -> Self {
        HistorySimulator { profile }
    }

    /// Simulator with the [`SimulationProfile::PLAIN`] profile.
    pub fn plain() -> Self {
        Self::new(SimulationProfile::PLAIN)
    }

    /// Simulator with the [`SimulationProfile::DETAIL`] profile.
    pub fn detail() -> Self {
        Self::new(SimulationProfile::DETAIL)
    }

    /// Simulate the trading days of the `days` calendar days preceding `today`.
    ///
    /// Bars are ascending by date, weekends never appear, every bar after the
    /// first opens at the previous close and `low <= open, close <= high`.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        quote: &Quote,
        days: u32,
        today: NaiveDate,
    ) -> Vec<HistoricalBar> {
        let Some(start) = today.checked_sub_days(Days::new(u64::from(days))) else {
            debug!("History start before {} is out of range", today);
            return Vec::new();
        };

        let profile = &self.profile;
        let floor = (quote.price * profile.floor_ratio).max(0.01);
        let mut price = quote.previous_close;
        let mut bars: Vec<HistoricalBar> = Vec::with_capacity(days as usize);

        for (day, date) in start.iter_days().take(days as usize).enumerate() {
            if is_weekend(date) {
                continue;
            }

            price *= 1.0 + profile.daily_return(rng, day);
            price = price.max(floor);

            let high = price * (1.0 + rng.random_range(0.0..=profile.band));
            let low = price * (1.0 - rng.random_range(0.0..=profile.band));
            let close = round2(price);
            let open = bars.last().map_or(close, |prev| prev.close);

            bars.push(HistoricalBar {
                date,
                open,
                high: round2(high).max(open).max(close),
                low: round2(low).min(open).min(close),
                close,
                volume: rng.random_range(profile.min_volume..=profile.max_volume),
            });
        }

        debug!(
            "Simulated {} bars for {} over {} days",
            bars.len(),
            quote.symbol,
            days
        );
        bars
    }
}

/// Saturday and Sunday are not trading days.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Close prices of `bars` in order.
pub fn closes(bars: &[HistoricalBar]) -> Vec<f64> {
    bars.iter().map(|bar| bar.close).collect()
}
