//! Symbol search and ranking.
//!
//! Every candidate gets a single tier score; the first matching rule wins:
//!
//! | score | rule                                          |
//! |-------|-----------------------------------------------|
//! | 100   | symbol equals the query                        |
//! | 90    | symbol starts with the query                   |
//! | 80    | symbol contains the query                      |
//! | 70    | name starts with the query                     |
//! | 60    | name contains the query                        |
//! | 50    | nickname table or whole-word fuzzy match       |
//! | 40    | some name word starts with the query           |
//!
//! Comparisons are case-insensitive. Zero-score candidates are dropped, the
//! rest are stably sorted by score and cut to the first 20.

use log::debug;
use market_common::Quote;
use market_common::aliases::{AliasTable, default_aliases};
use market_common::config::MAX_SEARCH_RESULTS;

/// Symbol equals the query.
pub const EXACT_SYMBOL: u8 = 100;
/// Symbol starts with the query.
pub const SYMBOL_PREFIX: u8 = 90;
/// Symbol contains the query.
pub const SYMBOL_CONTAINS: u8 = 80;
/// Name starts with the query.
pub const NAME_PREFIX: u8 = 70;
/// Name contains the query.
pub const NAME_CONTAINS: u8 = 60;
/// Nickname or whole-word match.
pub const FUZZY: u8 = 50;
/// A name word starts with the query.
pub const WORD_PREFIX: u8 = 40;

/// A ranked search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Matched quote.
    pub quote: Quote,
    /// Tier score, see the module table.
    pub score: u8,
}

/// Ranks quotes against free-text queries.
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine<'a> {
    aliases: &'a AliasTable,
    limit: usize,
}

impl Default for SearchEngine<'static> {
    fn default() -> Self {
        SearchEngine::new(default_aliases())
    }
}

impl<'a> SearchEngine<'a> {
    /// Engine over `aliases`, capped at the default result count.
    pub fn new(aliases: &'a AliasTable) -> Self {
        SearchEngine {
            aliases,
            limit: MAX_SEARCH_RESULTS,
        }
    }

    /// Cap results at `limit` instead.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Rank `universe` against `query`. A blank query matches nothing; use
    /// [`Self::filter`] for the dashboard behaviour.
    pub fn search(&self, query: &str, universe: &[Quote]) -> Vec<SearchHit> {
        let term = query.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = universe
            .iter()
            .filter_map(|quote| {
                let score = self.score(&term, quote);
                (score > 0).then(|| SearchHit {
                    quote: quote.clone(),
                    score,
                })
            })
            .collect();
        // sort_by is stable: equal scores keep universe order
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.truncate(self.limit);

        debug!("Search '{}' matched {} quotes", term, hits.len());
        hits
    }

    /// Dashboard search: the whole universe, unranked, for a blank query;
    /// the ranked quotes otherwise.
    pub fn filter(&self, query: &str, universe: &[Quote]) -> Vec<Quote> {
        if query.trim().is_empty() {
            return universe.to_vec();
        }
        self.search(query, universe)
            .into_iter()
            .map(|hit| hit.quote)
            .collect()
    }

    /// Tier score of `quote` for an already lowercased, trimmed `term`.
    pub fn score(&self, term: &str, quote: &Quote) -> u8 {
        let symbol = quote.symbol.to_lowercase();
        let name = quote.name.to_lowercase();

        if symbol == term {
            EXACT_SYMBOL
        } else if symbol.starts_with(term) {
            SYMBOL_PREFIX
        } else if symbol.contains(term) {
            SYMBOL_CONTAINS
        } else if name.starts_with(term) {
            NAME_PREFIX
        } else if name.contains(term) {
            NAME_CONTAINS
        } else if self.fuzzy_match(term, &symbol, &name) {
            FUZZY
        } else if word_prefix_match(term, &name) {
            WORD_PREFIX
        } else {
            0
        }
    }

    fn fuzzy_match(&self, term: &str, symbol: &str, name: &str) -> bool {
        if let Some(fragments) = self.aliases.fragments(term) {
            return fragments.iter().any(|fragment| {
                let squashed: String = fragment.split_whitespace().collect();
                name.contains(fragment.as_str()) || symbol.contains(&squashed)
            });
        }

        // Reverse lookup: the first nickname whose fragments mention the term decides.
        if let Some(entry) = self
            .aliases
            .entries()
            .iter()
            .find(|entry| entry.fragments.iter().any(|f| f.contains(term)))
        {
            return symbol.contains(&entry.alias) || name.contains(&entry.alias);
        }

        let name_words: Vec<&str> = name.split(' ').collect();
        term.split(' ').all(|term_word| {
            name_words
                .iter()
                .any(|name_word| name_word.contains(term_word) || term_word.contains(name_word))
        })
    }
}

fn word_prefix_match(term: &str, name: &str) -> bool {
    name.split_whitespace().any(|word| word.starts_with(term))
}
