//! Static stock universe and market indices.
//!
//! The universe is configuration data: an embedded JSON document parsed once on
//! first use, or a user-supplied file with the same layout:
//!
//! ```json
//! { "indian": [Quote...], "us": [Quote...], "indices": [MarketIndex...] }
//! ```
use std::io::Read;
use std::sync::LazyLock;

use serde::Deserialize;

use crate::config::POPULAR_INDIAN_STOCKS;
use crate::error::MarketError;
use crate::quote::{MarketIndex, Quote};

const EMBEDDED_UNIVERSE: &str = include_str!("../data/universe.json");

static DEFAULT_UNIVERSE: LazyLock<Universe> = LazyLock::new(|| {
    Universe::from_json(EMBEDDED_UNIVERSE).expect("embedded universe.json is valid")
});

/// Universe shipped with the crate.
pub fn default_universe() -> &'static Universe {
    &DEFAULT_UNIVERSE
}

#[derive(Deserialize)]
struct UniverseFile {
    #[serde(default)]
    indian: Vec<Quote>,
    #[serde(default)]
    us: Vec<Quote>,
    #[serde(default)]
    indices: Vec<MarketIndex>,
}

/// Immutable set of tradeable stocks and headline indices.
#[derive(Debug, Clone)]
pub struct Universe {
    stocks: Vec<Quote>,
    indian_count: usize,
    indices: Vec<MarketIndex>,
}

impl Universe {
    /// Build a universe from explicit lists; Indian listings come first.
    pub fn new(indian: Vec<Quote>, us: Vec<Quote>, indices: Vec<MarketIndex>) -> Self {
        let indian_count = indian.len();
        let mut stocks = indian;
        stocks.extend(us);
        Universe {
            stocks,
            indian_count,
            indices,
        }
    }

    /// Parse a universe document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, MarketError> {
        let file: UniverseFile = serde_json::from_str(json)?;
        Self::validated(file)
    }

    /// Parse a universe document from any reader (usually a file).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MarketError> {
        let file: UniverseFile = serde_json::from_reader(reader)?;
        Self::validated(file)
    }

    fn validated(file: UniverseFile) -> Result<Self, MarketError> {
        if let Some(bad) = file
            .indian
            .iter()
            .chain(file.us.iter())
            .find(|q| q.symbol.trim().is_empty() || q.high < q.low)
        {
            return Err(MarketError::Validation(format!(
                "invalid universe entry '{}' ({})",
                bad.symbol, bad.name
            )));
        }
        Ok(Self::new(file.indian, file.us, file.indices))
    }

    /// Every stock, Indian listings first.
    pub fn stocks(&self) -> &[Quote] {
        &self.stocks
    }

    /// NSE/BSE listings.
    pub fn indian(&self) -> &[Quote] {
        &self.stocks[..self.indian_count]
    }

    /// US listings.
    pub fn us(&self) -> &[Quote] {
        &self.stocks[self.indian_count..]
    }

    /// Headline indices in display order.
    pub fn indices(&self) -> &[MarketIndex] {
        &self.indices
    }

    /// Default dashboard list: the leading Indian stocks followed by all US stocks.
    pub fn popular(&self) -> Vec<Quote> {
        let indian = self.indian();
        indian[..indian.len().min(POPULAR_INDIAN_STOCKS)]
            .iter()
            .chain(self.us())
            .cloned()
            .collect()
    }

    /// Resolve `symbol`: case-insensitive equality first, then the first symbol
    /// containing it.
    pub fn find(&self, symbol: &str) -> Option<&Quote> {
        let needle = symbol.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.stocks
            .iter()
            .find(|q| q.symbol.to_lowercase() == needle)
            .or_else(|| {
                self.stocks
                    .iter()
                    .find(|q| q.symbol.to_lowercase().contains(&needle))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_universe_loads() {
        let universe = default_universe();
        assert_eq!(universe.indian().len(), 43);
        assert_eq!(universe.us().len(), 5);
        assert_eq!(universe.indices().len(), 7);
        assert_eq!(universe.stocks()[0].symbol, "TCS.NS");
    }

    #[test]
    fn popular_is_first_indian_then_us() {
        let popular = default_universe().popular();
        assert_eq!(popular.len(), POPULAR_INDIAN_STOCKS + 5);
        assert_eq!(popular.last().map(|q| q.symbol.as_str()), Some("NVDA"));
    }

    #[test]
    fn find_prefers_exact_symbol() {
        let universe = default_universe();
        assert_eq!(universe.find("aapl").map(|q| q.name.as_str()), Some("Apple Inc."));
        assert_eq!(universe.find("infy").map(|q| q.symbol.as_str()), Some("INFY.NS"));
        assert!(universe.find("zzzz").is_none());
        assert!(universe.find("  ").is_none());
    }

    #[test]
    fn rejects_inverted_high_low() {
        let json = r#"{"us":[{"symbol":"X","name":"X","price":1,"change":0,"changePercent":0,
            "volume":1,"marketCap":1,"high":1,"low":2,"open":1,"previousClose":1}]}"#;
        assert!(matches!(Universe::from_json(json), Err(MarketError::Validation(_))));
    }

    #[test]
    fn reads_from_reader() {
        let json = br#"{"indices":[{"symbol":"SPY","name":"S&P 500","price":1,"change":0,"changePercent":0}]}"#;
        let universe = Universe::from_reader(&json[..]).unwrap();
        assert!(universe.stocks().is_empty());
        assert_eq!(universe.indices()[0].symbol, "SPY");
    }
}
