//! Market data model: quotes, indices and daily bars.
//!
//! Every monetary value that leaves the engine is rounded to two decimals with
//! [`round2`]. Percent math goes through [`percent_change`], which maps a zero
//! base to `0.0` instead of producing `NaN`/`inf`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Round a monetary value to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Relative change `(current - base) / base * 100`, or `0.0` when `base` is zero.
pub fn percent_change(base: f64, current: f64) -> f64 {
    if base == 0.0 {
        return 0.0;
    }
    (current - base) / base * 100.0
}

/// Trading currency derived from the exchange suffix of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    /// NSE (`.NS`) and BSE (`.BO`) listings.
    Inr,
    /// US listings.
    Usd,
}

impl Currency {
    /// Resolve the currency of `symbol` from its market suffix.
    pub fn of_symbol(symbol: &str) -> Self {
        let upper = symbol.to_ascii_uppercase();
        if upper.contains(".NS") || upper.contains(".BO") {
            Currency::Inr
        } else {
            Currency::Usd
        }
    }

    /// Display sign used in front of amounts.
    pub fn sign(self) -> &'static str {
        match self {
            Currency::Inr => "₹",
            Currency::Usd => "$",
        }
    }
}

/// Point-in-time price/volume snapshot for a tradeable symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Symbol with optional market suffix (`TCS.NS`, `AAPL`).
    pub symbol: String,
    /// Company name.
    pub name: String,
    /// Last traded price.
    pub price: f64,
    /// `price - previous_close`.
    pub change: f64,
    /// `change / previous_close * 100`.
    pub change_percent: f64,
    /// Shares traded today.
    pub volume: u64,
    /// Market capitalisation in the listing currency.
    pub market_cap: f64,
    /// Day high.
    pub high: f64,
    /// Day low.
    pub low: f64,
    /// Day open.
    pub open: f64,
    /// Close of the previous session.
    pub previous_close: f64,
}

impl Quote {
    /// Currency the quote is denominated in.
    pub fn currency(&self) -> Currency {
        Currency::of_symbol(&self.symbol)
    }

    /// Move the quote to `new_price`, recomputing change and percent change
    /// against the unchanged previous close.
    pub fn with_price(&self, new_price: f64) -> Quote {
        let price = round2(new_price.max(0.01));
        let change = price - self.previous_close;
        Quote {
            price,
            change: round2(change),
            change_percent: round2(percent_change(self.previous_close, price)),
            ..self.clone()
        }
    }
}

/// Headline market index (NIFTY 50, S&P 500...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketIndex {
    /// Index symbol (`NIFTY`, `SPY`).
    pub symbol: String,
    /// Display name.
    pub name: String,
    /// Index level.
    pub price: f64,
    /// Points moved.
    pub change: f64,
    /// Points moved as a percentage of the level.
    pub change_percent: f64,
}

/// One trading day of OHLCV data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalBar {
    /// Trading day.
    pub date: NaiveDate,
    /// Opening price (the previous close after the first bar).
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Shares traded.
    pub volume: u64,
}

/// Close-price range statistics over a history window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodStats {
    /// Lowest close in the window.
    pub min_close: f64,
    /// Highest close in the window.
    pub max_close: f64,
    /// `(max - min) / min * 100`, `0.0` for a zero minimum.
    pub range_percent: f64,
}

impl PeriodStats {
    /// Compute statistics for `bars`; `None` for an empty history.
    pub fn of(bars: &[HistoricalBar]) -> Option<PeriodStats> {
        let first = bars.first()?;
        let (min_close, max_close) = bars
            .iter()
            .fold((first.close, first.close), |(lo, hi), bar| {
                (lo.min(bar.close), hi.max(bar.close))
            });
        Some(PeriodStats {
            min_close,
            max_close,
            range_percent: round2(percent_change(min_close, max_close)),
        })
    }
}

/// Format a price with the currency sign of `symbol`.
pub fn format_price(price: f64, symbol: &str) -> String {
    format!("{}{:.2}", Currency::of_symbol(symbol).sign(), price)
}

/// Format a signed price change, e.g. `+₹45.20` or `-$1.45`.
pub fn format_change(change: f64, symbol: &str) -> String {
    let sign = Currency::of_symbol(symbol).sign();
    if change >= 0.0 {
        format!("+{}{:.2}", sign, change)
    } else {
        format!("-{}{:.2}", sign, change.abs())
    }
}

/// Compact volume notation (`1.2K`, `45.2M`, `3.0B`).
pub fn format_volume(volume: u64) -> String {
    let v = volume as f64;
    if v >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if v >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if v >= 1e3 {
        format!("{:.1}K", v / 1e3)
    } else {
        volume.to_string()
    }
}

/// Compact market-cap notation with the lakh step used for Indian listings.
pub fn format_market_cap(market_cap: f64, symbol: &str) -> String {
    let sign = Currency::of_symbol(symbol).sign();
    if market_cap >= 1e12 {
        format!("{}{:.1}T", sign, market_cap / 1e12)
    } else if market_cap >= 1e9 {
        format!("{}{:.1}B", sign, market_cap / 1e9)
    } else if market_cap >= 1e6 {
        format!("{}{:.1}M", sign, market_cap / 1e6)
    } else if market_cap >= 1e5 {
        format!("{}{:.1}L", sign, market_cap / 1e5)
    } else {
        format!("{}{:.0}", sign, market_cap)
    }
}
