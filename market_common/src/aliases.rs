//! Curated nickname table used by fuzzy symbol search.
//!
//! Each entry maps a short market nickname (`tcs`, `hul`, `l&t`) to one or more
//! lowercase company-name fragments. Entry order is significant: reverse
//! lookups stop at the first entry whose fragments contain the query.
use std::sync::LazyLock;

use serde::Deserialize;

use crate::error::MarketError;

const EMBEDDED_ALIASES: &str = include_str!("../data/aliases.json");

static DEFAULT_ALIASES: LazyLock<AliasTable> = LazyLock::new(|| {
    AliasTable::from_json(EMBEDDED_ALIASES).expect("embedded aliases.json is valid")
});

/// Alias table shipped with the crate.
pub fn default_aliases() -> &'static AliasTable {
    &DEFAULT_ALIASES
}

/// A nickname and the name fragments it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AliasEntry {
    /// Lowercase nickname as typed by users.
    pub alias: String,
    /// Lowercase company-name fragments it stands for.
    pub fragments: Vec<String>,
}

/// Ordered nickname table.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

impl AliasTable {
    /// Table with `entries` in lookup order.
    pub fn new(entries: Vec<AliasEntry>) -> Self {
        AliasTable { entries }
    }

    /// Parse a JSON array of `{ "alias": ..., "fragments": [...] }` objects.
    pub fn from_json(json: &str) -> Result<Self, MarketError> {
        let entries: Vec<AliasEntry> = serde_json::from_str(json)?;
        Ok(AliasTable::new(entries))
    }

    /// Fragments registered for exactly `alias`.
    pub fn fragments(&self, alias: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|entry| entry.alias == alias)
            .map(|entry| entry.fragments.as_slice())
    }

    /// Every entry in lookup order.
    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }
}
