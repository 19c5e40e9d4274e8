//! Tunables shared by the engine and the binaries.

use std::time::Duration;

/// Interval between two quote + index refreshes of the feed.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// External source budget: requests per rolling minute.
pub const REQUESTS_PER_MINUTE: usize = 5;
/// External source budget: requests per rolling day.
pub const REQUESTS_PER_DAY: usize = 25;

/// Simulated latency of a quote/index fetch.
pub const QUOTE_LATENCY: Duration = Duration::from_millis(100);
/// Simulated latency of a symbol search.
pub const SEARCH_LATENCY: Duration = Duration::from_millis(200);
/// Simulated latency of a prediction request.
pub const PREDICTION_LATENCY: Duration = Duration::from_millis(1000);

/// Maximum number of hits returned by the search engine.
pub const MAX_SEARCH_RESULTS: usize = 20;

/// Number of Indian stocks included in the popular list (all US stocks follow).
pub const POPULAR_INDIAN_STOCKS: usize = 15;

/// Default location of the mock account store used by the CLI.
pub const DEFAULT_ACCOUNTS_PATH: &str = "accounts.json";
