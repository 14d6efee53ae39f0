//! Ingestion task
//!
//! One tokio task per session: reads raw feed messages, lets the local book
//! apply them, dispatches to the ledger and recomputes depth on a fixed
//! cadence. Input problems are logged and skipped; the loop only ends on
//! shutdown or when the feed closes.

use crate::book::LocalOrderBook;
use crate::ledger::OrderLedger;
use hermes_gateway::{FeedMessage, Subscriber, TransportError};
use log::{info, warn};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Ingestion configuration
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Depth recompute cadence
    pub depth_interval: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            depth_interval: Duration::from_millis(500),
        }
    }
}

/// Counters reported when the loop exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerStats {
    pub applied: u64,
    /// Messages that failed to decode
    pub malformed: u64,
    /// Messages the book refused (stale or other instrument)
    pub skipped: u64,
}

pub struct LedgerService<S> {
    ledger: OrderLedger,
    book: LocalOrderBook,
    subscriber: S,
    config: LedgerConfig,
    stats: LedgerStats,
}

impl<S> LedgerService<S>
where
    S: Subscriber<FeedMessage>,
{
    pub fn new(ledger: OrderLedger, subscriber: S, config: LedgerConfig) -> Self {
        let book = LocalOrderBook::new(ledger.state().instrument_id());
        Self {
            ledger,
            book,
            subscriber,
            config,
            stats: LedgerStats::default(),
        }
    }

    /// Run until shutdown is signalled or the feed closes
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> LedgerStats {
        info!(
            "[LEDGER] Ingestion started for {}",
            self.book.instrument_id()
        );

        let mut ticker = tokio::time::interval(self.config.depth_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.ledger.recompute_depth(&self.book);
                }
                result = self.subscriber.next() => {
                    match result {
                        Ok(msg) => self.handle(msg),
                        Err(TransportError::ChannelClosed) => {
                            info!("[LEDGER] Feed closed");
                            break;
                        }
                    }
                }
            }
        }

        self.ledger.recompute_depth(&self.book);
        info!(
            "[LEDGER] Ingestion stopped at sequence {}: {:?}",
            self.book.sequence(),
            self.stats
        );
        self.stats
    }

    fn handle(&mut self, msg: FeedMessage) {
        let event = match msg.decode() {
            Ok(event) => event,
            Err(e) => {
                self.stats.malformed += 1;
                warn!("[LEDGER] Skipping malformed message: {}", e);
                return;
            }
        };

        if !self.book.apply(&event) {
            self.stats.skipped += 1;
            return;
        }

        self.ledger.on_event(&event, &self.book);
        self.stats.applied += 1;
    }
}
