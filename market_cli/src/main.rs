//! Market CLI. Searches the stock universe, shows quotes and simulated
//! histories, runs price forecasts and manages a mock account with a
//! watchlist.
//!
//! Usage example:
//! ```bash
//! market_cli search tcs
//! market_cli predict AAPL --timeframe 1w --model ema
//! market_cli --accounts ./accounts.json watch INFY.NS
//! ```
//!
//! Data comes from the simulated source; accounts persist in a JSON file
//! (`accounts.json` by default) so sessions survive between runs.
mod args;
mod render;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use clap::Parser;
use log::{debug, info, warn};
use market_common::config::SEARCH_LATENCY;
use market_common::prediction::ChartRange;
use market_common::quote::PeriodStats;
use market_common::universe::{Universe, default_universe};
use market_common::{MarketError, ModelKind, PredictionRequest, Quote, Result};
use market_engine::accounts::AccountStore;
use market_engine::correlation::correlation;
use market_engine::simulator::closes;
use market_engine::{Predictor, QuoteSource, SearchEngine, SimulatedSource};

use crate::args::{Args, Command};

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();
    let source = SimulatedSource::new(load_universe(args.universe.as_deref())?);

    match args.command {
        Command::Search {
            query,
            scores,
            limit,
        } => search(&source, &query.join(" "), scores, limit),
        Command::Quote { symbol } => show_quote(&source, &symbol, &args.accounts),
        Command::History {
            symbol,
            range,
            rows,
        } => history(&source, &symbol, range, rows),
        Command::Predict {
            symbol,
            timeframe,
            model,
            rows,
        } => predict(&source, &symbol, &timeframe, &model, rows),
        Command::Correlate {
            first,
            second,
            range,
        } => correlate(&source, &first, &second, range),
        Command::Models => {
            for kind in ModelKind::all() {
                println!("{}", render::model_line(kind));
            }
            Ok(())
        }
        Command::Signup {
            name,
            email,
            password,
        } => {
            let mut store = AccountStore::open(&args.accounts)?;
            let user = store.signup(&name, &email, &password)?;
            println!("Welcome, {}! You are signed in as {}.", user.name, user.email);
            Ok(())
        }
        Command::Login { email, password } => {
            let mut store = AccountStore::open(&args.accounts)?;
            let user = store.login(&email, &password)?;
            println!("Signed in as {} ({} watched).", user.email, user.watchlist.len());
            Ok(())
        }
        Command::Logout => {
            AccountStore::open(&args.accounts)?.logout()?;
            println!("Signed out.");
            Ok(())
        }
        Command::Watch { symbol } => watch(&source, &symbol, &args.accounts),
        Command::Watchlist => watchlist(&source, &args.accounts),
    }
}

fn load_universe(path: Option<&Path>) -> Result<Arc<Universe>> {
    match path {
        Some(path) => {
            let file = File::open(path)?;
            let universe = Universe::from_reader(BufReader::new(file))?;
            info!(
                "Loaded {} stocks from {}",
                universe.stocks().len(),
                path.display()
            );
            Ok(Arc::new(universe))
        }
        None => Ok(Arc::new(default_universe().clone())),
    }
}

/// Resolve `symbol` to a live quote or fail with `NotFound`.
fn require_quote(source: &SimulatedSource, symbol: &str) -> Result<Quote> {
    source
        .quote(symbol)?
        .ok_or_else(|| MarketError::NotFound(symbol.to_string()))
}

fn search(source: &SimulatedSource, query: &str, scores: bool, limit: usize) -> Result<()> {
    thread::sleep(SEARCH_LATENCY);
    let engine = SearchEngine::default().with_limit(limit);
    let stocks = source.universe().stocks();

    if query.trim().is_empty() {
        for quote in engine.filter(query, stocks) {
            println!("{}", render::quote_line(&quote, false));
        }
        return Ok(());
    }

    let hits = engine.search(query, stocks);
    if hits.is_empty() {
        println!("No stocks match '{}'.", query.trim());
    }
    for hit in hits {
        let line = render::quote_line(&hit.quote, false);
        if scores {
            println!("{:>3} {}", hit.score, line);
        } else {
            println!("{}", line);
        }
    }
    Ok(())
}

fn show_quote(source: &SimulatedSource, symbol: &str, accounts: &Path) -> Result<()> {
    let quote = require_quote(source, symbol)?;
    for line in render::quote_detail(&quote) {
        println!("{}", line);
    }
    let store = AccountStore::open(accounts)?;
    if store.is_watched(&quote.symbol) {
        println!("On your watchlist.");
    }
    Ok(())
}

fn history(source: &SimulatedSource, symbol: &str, range: ChartRange, rows: usize) -> Result<()> {
    let quote = require_quote(source, symbol)?;
    let bars = source.historical(&quote.symbol, range.days())?;
    println!("{} over {} ({} trading days)", quote.symbol, range, bars.len());
    match PeriodStats::of(&bars) {
        Some(stats) => println!("{}", render::stats_line(&stats, &quote.symbol)),
        None => println!("No trading days in range."),
    }
    for bar in &bars[bars.len().saturating_sub(rows)..] {
        println!("{}", render::bar_line(bar, &quote.symbol));
    }
    Ok(())
}

fn predict(
    source: &SimulatedSource,
    symbol: &str,
    timeframe: &str,
    model: &str,
    rows: usize,
) -> Result<()> {
    let quote = require_quote(source, symbol)?;
    let request = PredictionRequest::parse(timeframe, model);
    let rx = Predictor::default().spawn(quote, request);
    let result = rx
        .recv()
        .map_err(|e| MarketError::ChannelRecv(e.to_string()))?;

    println!("{}", render::prediction_header(&result, request.model));
    for step in result.predictions.iter().take(rows) {
        println!(
            "{}",
            render::prediction_line(step, result.current_price, &result.symbol)
        );
    }
    if result.predictions.len() > rows {
        println!("... {} more", result.predictions.len() - rows);
    }
    Ok(())
}

fn correlate(source: &SimulatedSource, first: &str, second: &str, range: ChartRange) -> Result<()> {
    let a = require_quote(source, first)?;
    let b = require_quote(source, second)?;
    let xs = closes(&source.historical(&a.symbol, range.days())?);
    let ys = closes(&source.historical(&b.symbol, range.days())?);
    debug!("Correlating {} and {} closes", xs.len(), ys.len());
    println!(
        "{} vs {} over {}: {:+.3}",
        a.symbol,
        b.symbol,
        range,
        correlation(&xs, &ys)
    );
    Ok(())
}

fn watch(source: &SimulatedSource, symbol: &str, accounts: &Path) -> Result<()> {
    let quote = require_quote(source, symbol)?;
    let mut store = AccountStore::open(accounts)?;
    if store.toggle_watchlist(&quote.symbol)? {
        println!("Added {} to your watchlist.", quote.symbol);
    } else {
        println!("Removed {} from your watchlist.", quote.symbol);
    }
    Ok(())
}

fn watchlist(source: &SimulatedSource, accounts: &Path) -> Result<()> {
    let store = AccountStore::open(accounts)?;
    let user = store
        .current_user()
        .ok_or_else(|| MarketError::Auth("Not signed in".to_string()))?;
    if user.watchlist.is_empty() {
        println!("Your watchlist is empty.");
    }
    for symbol in &user.watchlist {
        match source.quote(symbol)? {
            Some(quote) => println!("{}", render::quote_line(&quote, true)),
            None => warn!("Watched symbol {} is no longer listed", symbol),
        }
    }
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
