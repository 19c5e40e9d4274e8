//! Market feed.
//!
//! Runs the refresher against the simulated market and logs every snapshot
//! until Ctrl+C:
//!
//! - `Refresher`: fetches popular quotes and indices on a fixed interval and
//!   broadcasts each completed fetch to subscribers.
//! - Main loop: a single subscriber that prints the snapshot. Crossbeam
//!   `select!` multiplexes snapshots with the Ctrl+C signal.
//!
//! Usage:
//! ```bash
//! market_feed --interval-secs 5 --universe ./universe.json
//! ```
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::{select, unbounded};
use log::{info, warn};
use market_common::config::REFRESH_INTERVAL;
use market_common::quote::{format_change, format_price};
use market_common::universe::{Universe, default_universe};
use market_common::{MarketError, Result};
use market_engine::refresher::{MarketEvent, Refresher, Snapshot};
use market_engine::source::SimulatedSource;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Streams simulated market snapshots", long_about = None)]
struct Args {
    /// Seconds between refreshes.
    #[arg(long, default_value_t = REFRESH_INTERVAL.as_secs())]
    interval_secs: u64,

    /// JSON universe file to use instead of the built-in one.
    #[arg(long)]
    universe: Option<PathBuf>,

    /// Print only this many stocks per snapshot.
    #[arg(long, default_value_t = 5)]
    top: usize,
}

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    let (shutdown_tx, shutdown_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Shutting down feed...");
        let _ = shutdown_tx.send(());
    })
    .map_err(|e| MarketError::Signal(e.to_string()))?;

    let universe = load_universe(args.universe.as_ref())?;
    let interval = Duration::from_secs(args.interval_secs.max(1));
    let refresher = Refresher::start(Arc::new(SimulatedSource::new(universe)), interval);
    let events = refresher.subscribe()?;

    info!("Feed is running. Press Ctrl+C to exit.");
    loop {
        select! {
            recv(events) -> msg => match msg {
                Ok(MarketEvent::Snapshot(snapshot)) => log_snapshot(&snapshot, args.top),
                Ok(MarketEvent::Shutdown) => break,
                Err(e) => {
                    warn!("Refresher channel closed: {}", e);
                    break;
                }
            },
            recv(shutdown_rx) -> _ => break,
        }
    }

    refresher.stop();
    Ok(())
}

fn load_universe(path: Option<&PathBuf>) -> Result<Arc<Universe>> {
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

fn log_snapshot(snapshot: &Snapshot, top: usize) {
    info!("Snapshot at {}", snapshot.fetched_at.format("%H:%M:%S"));
    for index in &snapshot.indices {
        info!(
            "  {:<14} {:>12.2} {:>+8.2} ({:+.2}%)",
            index.name, index.price, index.change, index.change_percent
        );
    }
    for quote in snapshot.stocks.iter().take(top) {
        info!(
            "  {:<14} {:>12} {} ({:+.2}%)",
            quote.symbol,
            format_price(quote.price, &quote.symbol),
            format_change(quote.change, &quote.symbol),
            quote.change_percent
        );
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
