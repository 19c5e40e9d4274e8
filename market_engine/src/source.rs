//! Quote sources.
//!
//! [`QuoteSource`] is the narrow contract the dashboard consumes. The
//! [`SimulatedSource`] serves the static universe with small random ticks and
//! synthetic histories. [`FallbackSource`] guards a primary (external) source
//! with a [`RateLimiter`] and degrades to the simulator whenever the primary is
//! throttled or fails, tagging every answer with the path it took.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use chrono::Local;
use log::{debug, warn};
use market_common::config::QUOTE_LATENCY;
use market_common::quote::{percent_change, round2};
use market_common::universe::{Universe, default_universe};
use market_common::{HistoricalBar, MarketError, MarketIndex, Quote, Result};
use rand::Rng;

use crate::rate_limiter::RateLimiter;
use crate::simulator::HistorySimulator;

/// Market data consumed by the dashboard.
pub trait QuoteSource: Send + Sync {
    /// Latest quote for `symbol`; `Ok(None)` when the symbol is unknown.
    fn quote(&self, symbol: &str) -> Result<Option<Quote>>;

    /// Default dashboard list.
    fn popular(&self) -> Result<Vec<Quote>>;

    /// Headline indices.
    fn indices(&self) -> Result<Vec<MarketIndex>>;

    /// Daily bars covering the last `days` calendar days, oldest first.
    fn historical(&self, symbol: &str, days: u32) -> Result<Vec<HistoricalBar>>;
}

/// Random price jiggle of up to ±1 around the last price.
pub fn simulate_tick<R: Rng + ?Sized>(rng: &mut R, quote: &Quote) -> Quote {
    quote.with_price(quote.price + rng.random_range(-1.0..1.0))
}

/// Random index move of up to ±5 points with a drifting change.
pub fn simulate_index_tick<R: Rng + ?Sized>(rng: &mut R, index: &MarketIndex) -> MarketIndex {
    let price = round2((index.price + rng.random_range(-5.0..5.0)).max(0.01));
    let change = index.change + rng.random_range(-1.0..1.0);
    MarketIndex {
        price,
        change: round2(change),
        change_percent: round2(percent_change(price, price + change)),
        ..index.clone()
    }
}

/// Mock market backed by a static universe.
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    universe: Arc<Universe>,
    simulator: HistorySimulator,
    latency: Duration,
}

impl Default for SimulatedSource {
    fn default() -> Self {
        SimulatedSource::new(Arc::new(default_universe().clone()))
    }
}

impl SimulatedSource {
    /// Simulated source over `universe` with the default quote latency.
    pub fn new(universe: Arc<Universe>) -> Self {
        SimulatedSource {
            universe,
            simulator: HistorySimulator::detail(),
            latency: QUOTE_LATENCY,
        }
    }

    /// Override the simulated network delay.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Universe the source serves.
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    fn delay(&self) {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
    }
}

impl QuoteSource for SimulatedSource {
    fn quote(&self, symbol: &str) -> Result<Option<Quote>> {
        self.delay();
        let mut rng = rand::rng();
        Ok(self
            .universe
            .find(symbol)
            .map(|quote| simulate_tick(&mut rng, quote)))
    }

    fn popular(&self) -> Result<Vec<Quote>> {
        self.delay();
        let mut rng = rand::rng();
        Ok(self
            .universe
            .popular()
            .iter()
            .map(|quote| simulate_tick(&mut rng, quote))
            .collect())
    }

    fn indices(&self) -> Result<Vec<MarketIndex>> {
        self.delay();
        let mut rng = rand::rng();
        Ok(self
            .universe
            .indices()
            .iter()
            .map(|index| simulate_index_tick(&mut rng, index))
            .collect())
    }

    fn historical(&self, symbol: &str, days: u32) -> Result<Vec<HistoricalBar>> {
        let quote = self
            .universe
            .find(symbol)
            .ok_or_else(|| MarketError::NotFound(symbol.to_string()))?;
        let today = Local::now().date_naive();
        Ok(self
            .simulator
            .generate(&mut rand::rng(), quote, days, today))
    }
}

/// Data tagged with the path that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Sourced<T> {
    /// Served by the primary source.
    Live(T),
    /// Served by the simulator because the primary was throttled or failed.
    Simulated {
        /// Fallback data.
        data: T,
        /// Why the primary was skipped.
        reason: String,
    },
}

impl<T> Sourced<T> {
    /// Whether the primary source produced the data.
    pub fn is_live(&self) -> bool {
        matches!(self, Sourced::Live(_))
    }

    /// The data, whichever path produced it.
    pub fn data(&self) -> &T {
        match self {
            Sourced::Live(data) | Sourced::Simulated { data, .. } => data,
        }
    }

    /// Unwrap the data, dropping the tag.
    pub fn into_inner(self) -> T {
        match self {
            Sourced::Live(data) | Sourced::Simulated { data, .. } => data,
        }
    }
}

/// Rate-limited primary source with simulated fallback.
pub struct FallbackSource<P> {
    primary: P,
    fallback: SimulatedSource,
    limiter: Mutex<RateLimiter>,
}

impl<P: QuoteSource> FallbackSource<P> {
    /// Guard `primary` with `limiter`, degrading to `fallback`.
    pub fn new(primary: P, fallback: SimulatedSource, limiter: RateLimiter) -> Self {
        FallbackSource {
            primary,
            fallback,
            limiter: Mutex::new(limiter),
        }
    }

    /// Reserve one request from the budget; `false` when throttled.
    ///
    /// The limiter only holds timestamps, so a poisoned lock is still usable.
    fn acquire(&self) -> bool {
        let mut limiter = self.limiter.lock().unwrap_or_else(PoisonError::into_inner);
        if limiter.can_proceed() {
            limiter.record_use();
            true
        } else {
            false
        }
    }

    fn call<T>(
        &self,
        what: &str,
        live: impl FnOnce(&P) -> Result<T>,
        simulated: impl FnOnce(&SimulatedSource) -> Result<T>,
    ) -> Result<Sourced<T>> {
        let failure = if self.acquire() {
            match live(&self.primary) {
                Ok(data) => {
                    debug!("{} served by primary source", what);
                    return Ok(Sourced::Live(data));
                }
                Err(e) => e,
            }
        } else {
            MarketError::RateLimited(format!("{} request budget exhausted", what))
        };

        warn!("{} falling back to simulated data: {}", what, failure);
        simulated(&self.fallback).map(|data| Sourced::Simulated {
            data,
            reason: failure.to_string(),
        })
    }

    /// Quote for `symbol`.
    pub fn quote(&self, symbol: &str) -> Result<Sourced<Option<Quote>>> {
        self.call("quote", |p| p.quote(symbol), |s| s.quote(symbol))
    }

    /// Default dashboard list.
    pub fn popular(&self) -> Result<Sourced<Vec<Quote>>> {
        self.call("popular", |p| p.popular(), |s| s.popular())
    }

    /// Headline indices.
    pub fn indices(&self) -> Result<Sourced<Vec<MarketIndex>>> {
        self.call("indices", |p| p.indices(), |s| s.indices())
    }

    /// Daily bars for the last `days` calendar days.
    pub fn historical(&self, symbol: &str, days: u32) -> Result<Sourced<Vec<HistoricalBar>>> {
        self.call(
            "historical",
            |p| p.historical(symbol, days),
            |s| s.historical(symbol, days),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Primary that always fails with a transient error.
    struct BrokenSource;

    impl QuoteSource for BrokenSource {
        fn quote(&self, _symbol: &str) -> Result<Option<Quote>> {
            Err(MarketError::Transient("503".to_string()))
        }
        fn popular(&self) -> Result<Vec<Quote>> {
            Err(MarketError::Transient("503".to_string()))
        }
        fn indices(&self) -> Result<Vec<MarketIndex>> {
            Err(MarketError::Transient("503".to_string()))
        }
        fn historical(&self, _symbol: &str, _days: u32) -> Result<Vec<HistoricalBar>> {
            Err(MarketError::Transient("503".to_string()))
        }
    }

    fn simulated() -> SimulatedSource {
        SimulatedSource::default().with_latency(Duration::ZERO)
    }

    #[test]
    fn tick_keeps_change_consistent() {
        let mut rng = StdRng::seed_from_u64(6);
        let base = default_universe().find("AAPL").unwrap();
        for _ in 0..50 {
            let q = simulate_tick(&mut rng, base);
            assert!((q.price - base.price).abs() <= 1.01);
            assert!((q.change - (q.price - q.previous_close)).abs() < 0.011);
            assert_eq!(round2(q.change_percent), q.change_percent);
        }
    }

    #[test]
    fn index_tick_stays_positive_and_rounded() {
        let mut rng = StdRng::seed_from_u64(6);
        let index = MarketIndex {
            symbol: "X".to_string(),
            name: "Tiny".to_string(),
            price: 0.5,
            change: 0.0,
            change_percent: 0.0,
        };
        for _ in 0..20 {
            let next = simulate_index_tick(&mut rng, &index);
            assert!(next.price >= 0.01);
            assert!(next.change_percent.is_finite());
        }
    }

    #[test]
    fn simulated_source_serves_universe() {
        let source = simulated();
        assert_eq!(source.popular().unwrap().len(), 20);
        assert_eq!(source.indices().unwrap().len(), 7);
        assert!(source.quote("nosuchsymbol").unwrap().is_none());
        let quote = source.quote("infy").unwrap().unwrap();
        assert_eq!(quote.symbol, "INFY.NS");
    }

    #[test]
    fn unknown_history_is_not_found() {
        let err = simulated().historical("nosuchsymbol", 30).unwrap_err();
        assert!(matches!(err, MarketError::NotFound(_)));
    }

    #[test]
    fn healthy_primary_is_live() {
        let source = FallbackSource::new(simulated(), simulated(), RateLimiter::default());
        let popular = source.popular().unwrap();
        assert!(popular.is_live());
        assert_eq!(popular.data().len(), 20);
    }

    #[test]
    fn failing_primary_falls_back() {
        let source = FallbackSource::new(BrokenSource, simulated(), RateLimiter::default());
        let quote = source.quote("AAPL").unwrap();
        match quote {
            Sourced::Simulated { data, reason } => {
                assert_eq!(data.map(|q| q.symbol), Some("AAPL".to_string()));
                assert!(reason.contains("503"));
            }
            Sourced::Live(_) => panic!("expected simulated fallback"),
        }
    }

    /// Primary that fails with errors other than throttling or timeouts.
    struct MisconfiguredSource;

    impl QuoteSource for MisconfiguredSource {
        fn quote(&self, _symbol: &str) -> Result<Option<Quote>> {
            Err(MarketError::Auth("bad api key".to_string()))
        }
        fn popular(&self) -> Result<Vec<Quote>> {
            Err(MarketError::Validation("bad request".to_string()))
        }
        fn indices(&self) -> Result<Vec<MarketIndex>> {
            Err(MarketError::Io(std::io::Error::other("connection reset")))
        }
        fn historical(&self, _symbol: &str, _days: u32) -> Result<Vec<HistoricalBar>> {
            Err(MarketError::Auth("bad api key".to_string()))
        }
    }

    #[test]
    fn every_primary_error_degrades() {
        let source = FallbackSource::new(MisconfiguredSource, simulated(), RateLimiter::default());

        let quote = source.quote("TCS").unwrap();
        assert!(!quote.is_live());
        assert!(quote.into_inner().is_some());

        let popular = source.popular().unwrap();
        assert!(matches!(&popular, Sourced::Simulated { reason, .. } if reason.contains("bad request")));
        assert_eq!(popular.data().len(), 20);

        let indices = source.indices().unwrap();
        assert!(matches!(&indices, Sourced::Simulated { reason, .. } if reason.contains("connection reset")));

        let history = source.historical("AAPL", 30).unwrap();
        assert!(!history.is_live());
        assert!(!history.data().is_empty());
    }

    #[test]
    fn poisoned_limiter_keeps_serving() {
        let source = Arc::new(FallbackSource::new(
            simulated(),
            simulated(),
            RateLimiter::new(1, 25),
        ));
        let holder = Arc::clone(&source);
        let _ = std::thread::spawn(move || {
            let _guard = holder.limiter.lock().unwrap();
            panic!("worker died holding the limiter");
        })
        .join();
        assert!(source.limiter.is_poisoned());

        assert!(source.indices().unwrap().is_live());
        // The budget recorded through the poisoned lock still applies.
        assert!(!source.indices().unwrap().is_live());
    }

    #[test]
    fn throttled_primary_falls_back() {
        let source = FallbackSource::new(simulated(), simulated(), RateLimiter::new(1, 25));
        assert!(source.indices().unwrap().is_live());
        let second = source.indices().unwrap();
        assert!(!second.is_live());
        assert_eq!(second.into_inner().len(), 7);
    }
}
