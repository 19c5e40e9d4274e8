//! Request budget for the external quote source.
//!
//! The limiter keeps the instants of recorded requests and answers whether one
//! more request fits both the per-minute and the per-day budget:
//!
//! - `RateLimiter::can_proceed()`: prune entries older than a day, then check
//!   both windows.
//! - `RateLimiter::record_use()`: remember a request made now.
//!
//! Time is measured with `std::time::Instant`, which is monotonic. The limiter
//! is not synchronized; share it behind a `Mutex`.

use std::time::{Duration, Instant};

use log::debug;
use market_common::config::{REQUESTS_PER_DAY, REQUESTS_PER_MINUTE};

const MINUTE: Duration = Duration::from_secs(60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Sliding-window request budget.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Instants of requests still inside the daily window, oldest first.
    requests: Vec<Instant>,
    per_minute: usize,
    per_day: usize,
}

impl Default for RateLimiter {
    fn default() -> Self {
        RateLimiter::new(REQUESTS_PER_MINUTE, REQUESTS_PER_DAY)
    }
}

impl RateLimiter {
    /// Budget of `per_minute` requests per rolling minute and `per_day` per rolling day.
    pub fn new(per_minute: usize, per_day: usize) -> Self {
        Self {
            requests: Vec::new(),
            per_minute,
            per_day,
        }
    }

    /// Whether another request may be sent now.
    pub fn can_proceed(&mut self) -> bool {
        self.can_proceed_at(Instant::now())
    }

    /// Whether another request may be sent at `now`.
    pub fn can_proceed_at(&mut self, now: Instant) -> bool {
        self.requests
            .retain(|&at| now.saturating_duration_since(at) < DAY);

        let last_minute = self
            .requests
            .iter()
            .filter(|&&at| now.saturating_duration_since(at) < MINUTE)
            .count();
        let allowed = last_minute < self.per_minute && self.requests.len() < self.per_day;
        if !allowed {
            debug!(
                "Rate limit reached: {} in the last minute, {} today",
                last_minute,
                self.requests.len()
            );
        }
        allowed
    }

    /// Record a request made now.
    pub fn record_use(&mut self) {
        self.record_use_at(Instant::now());
    }

    /// Record a request made at `at`.
    pub fn record_use_at(&mut self, at: Instant) {
        self.requests.push(at);
    }

    /// Requests currently tracked (after the last prune).
    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.requests.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_per_minute_budget() {
        let mut limiter = RateLimiter::new(2, 10);
        let start = Instant::now();
        assert!(limiter.can_proceed_at(start));
        limiter.record_use_at(start);
        assert!(limiter.can_proceed_at(start));
        limiter.record_use_at(start);
        assert!(!limiter.can_proceed_at(start + Duration::from_secs(30)));
        assert!(limiter.can_proceed_at(start + Duration::from_secs(61)));
    }

    #[test]
    fn daily_budget_caps_requests() {
        let mut limiter = RateLimiter::new(5, 3);
        let start = Instant::now();
        for minute in 0..3 {
            let at = start + MINUTE * minute * 2;
            assert!(limiter.can_proceed_at(at));
            limiter.record_use_at(at);
        }
        assert!(!limiter.can_proceed_at(start + Duration::from_secs(3600)));
    }

    #[test]
    fn prunes_entries_older_than_a_day() {
        let mut limiter = RateLimiter::new(5, 1);
        let start = Instant::now();
        limiter.record_use_at(start);
        assert!(!limiter.can_proceed_at(start + Duration::from_secs(10)));
        assert!(limiter.can_proceed_at(start + DAY + Duration::from_secs(1)));
        assert_eq!(limiter.tracked(), 0);
    }
}
