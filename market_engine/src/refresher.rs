//! Periodic market refresh and snapshot broadcasting.
//!
//! `Refresher::start` runs a coordinator thread that ticks on a fixed
//! interval. Every tick (plus one immediately at start) spawns a fetch of the
//! popular quotes and the indices from the shared [`QuoteSource`]. Completed
//! fetches come back to the coordinator, which broadcasts them to every
//! subscriber.
//!
//! Event model:
//! - `MarketEvent::Snapshot`: the result of one completed fetch.
//! - `MarketEvent::Shutdown`: the refresher is stopping.
//!
//! Fetches are not deduplicated: a slow fetch may overlap the next tick, and
//! whichever completes last is the latest snapshot. Broadcast is best-effort;
//! a subscriber whose receiver is gone is dropped from the list.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver, Sender, select, tick, unbounded};
use log::{debug, error, info};
use market_common::{MarketError, MarketIndex, Quote, Result};

use crate::source::QuoteSource;

/// Dashboard data from one completed fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Popular quotes.
    pub stocks: Vec<Quote>,
    /// Headline indices.
    pub indices: Vec<MarketIndex>,
    /// When the fetch completed.
    pub fetched_at: DateTime<Local>,
}

/// Message sent by the refresher to its subscribers.
#[derive(Debug, Clone)]
pub enum MarketEvent {
    /// A completed fetch.
    Snapshot(Arc<Snapshot>),
    /// The refresher is stopping; no more events follow.
    Shutdown,
}

/// Handle to a running refresher.
pub struct Refresher {
    subscribe_tx: Sender<Sender<MarketEvent>>,
    stop_tx: Sender<()>,
    worker: JoinHandle<()>,
}

impl Refresher {
    /// Start refreshing from `source` every `interval`.
    pub fn start(source: Arc<dyn QuoteSource>, interval: Duration) -> Refresher {
        let (subscribe_tx, subscribe_rx) = unbounded::<Sender<MarketEvent>>();
        let (stop_tx, stop_rx) = unbounded::<()>();

        let worker = thread::spawn(move || {
            info!(
                "Market refresher started (every {:?}, thread {:?})",
                interval,
                thread::current().id()
            );
            run(source, interval, subscribe_rx, stop_rx);
        });

        Refresher {
            subscribe_tx,
            stop_tx,
            worker,
        }
    }

    /// Register a new subscriber. The latest snapshot, if any, is delivered
    /// first.
    pub fn subscribe(&self) -> Result<Receiver<MarketEvent>> {
        let (tx, rx) = unbounded();
        self.subscribe_tx
            .send(tx)
            .map_err(|e| MarketError::ChannelSend(e.to_string()))?;
        Ok(rx)
    }

    /// Broadcast `Shutdown` and wait for the coordinator to exit.
    pub fn stop(self) {
        // A closed channel means the coordinator is already gone.
        let _ = self.stop_tx.send(());
        if self.worker.join().is_err() {
            error!("Market refresher thread panicked");
        }
    }
}

fn run(
    source: Arc<dyn QuoteSource>,
    interval: Duration,
    subscribe_rx: Receiver<Sender<MarketEvent>>,
    stop_rx: Receiver<()>,
) {
    let (done_tx, done_rx) = unbounded::<Snapshot>();
    let ticker = tick(interval);
    let mut clients: Vec<Sender<MarketEvent>> = Vec::new();
    let mut latest: Option<Arc<Snapshot>> = None;

    spawn_fetch(Arc::clone(&source), done_tx.clone());

    loop {
        select! {
            recv(ticker) -> _ => spawn_fetch(Arc::clone(&source), done_tx.clone()),
            recv(done_rx) -> msg => if let Ok(snapshot) = msg {
                let snapshot = Arc::new(snapshot);
                let event = MarketEvent::Snapshot(Arc::clone(&snapshot));
                clients.retain(|client_tx| client_tx.send(event.clone()).is_ok());
                debug!(
                    "Broadcast {} quotes / {} indices to {} subscribers",
                    snapshot.stocks.len(),
                    snapshot.indices.len(),
                    clients.len()
                );
                latest = Some(snapshot);
            },
            recv(subscribe_rx) -> msg => if let Ok(client_tx) = msg {
                let delivered = latest
                    .as_ref()
                    .is_none_or(|s| client_tx.send(MarketEvent::Snapshot(Arc::clone(s))).is_ok());
                if delivered {
                    clients.push(client_tx);
                    info!("Refresher: new subscriber. Total: {}", clients.len());
                }
            },
            recv(stop_rx) -> _ => break,
        }
    }

    clients.extend(subscribe_rx.try_iter());
    for client_tx in &clients {
        let _ = client_tx.send(MarketEvent::Shutdown);
    }
    info!("Market refresher stopped");
}

fn spawn_fetch(source: Arc<dyn QuoteSource>, done_tx: Sender<Snapshot>) {
    thread::spawn(move || match fetch(source.as_ref()) {
        Ok(snapshot) => {
            // The coordinator may have stopped while we were fetching.
            let _ = done_tx.send(snapshot);
        }
        Err(e) => error!("Market refresh failed: {}", e),
    });
}

fn fetch(source: &dyn QuoteSource) -> Result<Snapshot> {
    Ok(Snapshot {
        stocks: source.popular()?,
        indices: source.indices()?,
        fetched_at: Local::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SimulatedSource;
    use market_common::HistoricalBar;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn simulated() -> Arc<dyn QuoteSource> {
        Arc::new(SimulatedSource::default().with_latency(Duration::ZERO))
    }

    fn next_snapshot(rx: &Receiver<MarketEvent>) -> Arc<Snapshot> {
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            MarketEvent::Snapshot(s) => s,
            MarketEvent::Shutdown => panic!("unexpected shutdown"),
        }
    }

    #[test]
    fn subscribers_receive_snapshots() {
        let refresher = Refresher::start(simulated(), Duration::from_millis(20));
        let rx = refresher.subscribe().unwrap();
        let first = next_snapshot(&rx);
        assert_eq!(first.stocks.len(), 20);
        assert_eq!(first.indices.len(), 7);
        let second = next_snapshot(&rx);
        assert_eq!(second.stocks.len(), 20);
        refresher.stop();
    }

    #[test]
    fn stop_broadcasts_shutdown() {
        let refresher = Refresher::start(simulated(), Duration::from_secs(60));
        let rx = refresher.subscribe().unwrap();
        refresher.stop();
        let shut_down = rx
            .iter()
            .any(|event| matches!(event, MarketEvent::Shutdown));
        assert!(shut_down);
    }

    #[test]
    fn overlapping_fetches_still_deliver_whole_snapshots() {
        // Each fetch outlives several ticks, so fetch threads run concurrently.
        let slow: Arc<dyn QuoteSource> =
            Arc::new(SimulatedSource::default().with_latency(Duration::from_millis(60)));
        let refresher = Refresher::start(slow, Duration::from_millis(10));
        let rx = refresher.subscribe().unwrap();
        for _ in 0..5 {
            let snapshot = next_snapshot(&rx);
            assert_eq!(snapshot.stocks.len(), 20);
            assert_eq!(snapshot.indices.len(), 7);
        }
        refresher.stop();
        let shut_down = rx
            .iter()
            .any(|event| matches!(event, MarketEvent::Shutdown));
        assert!(shut_down);
    }

    struct FlakySource {
        calls: AtomicUsize,
    }

    impl QuoteSource for FlakySource {
        fn quote(&self, _symbol: &str) -> Result<Option<Quote>> {
            Ok(None)
        }
        fn popular(&self) -> Result<Vec<Quote>> {
            // Every other fetch fails.
            if self.calls.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                Err(MarketError::Transient("timeout".to_string()))
            } else {
                Ok(Vec::new())
            }
        }
        fn indices(&self) -> Result<Vec<MarketIndex>> {
            Ok(Vec::new())
        }
        fn historical(&self, _symbol: &str, _days: u32) -> Result<Vec<HistoricalBar>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn failed_fetch_does_not_stop_refreshing() {
        let source = Arc::new(FlakySource {
            calls: AtomicUsize::new(0),
        });
        let refresher = Refresher::start(source, Duration::from_millis(10));
        let rx = refresher.subscribe().unwrap();
        let snapshot = next_snapshot(&rx);
        assert!(snapshot.stocks.is_empty());
        refresher.stop();
    }
}
