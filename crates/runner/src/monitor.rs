//! Periodic log of the shared state
//!
//! Stands in for the terminal display: reads only the store, never writes
//! ledger or depth state. It also keeps the trade log to a rolling window.

use chrono::Utc;
use hermes_state::{MarketSnapshot, SharedState};
use log::{debug, info};
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub struct Monitor {
    state: Arc<SharedState>,
    interval: Duration,
    trade_window: Duration,
}

impl Monitor {
    pub fn new(state: Arc<SharedState>, interval: Duration, trade_window: Duration) -> Self {
        Self {
            state,
            interval,
            trade_window,
        }
    }

    /// Drop trades older than the rolling window
    pub fn prune_trades(&self) -> usize {
        let window = chrono::Duration::from_std(self.trade_window)
            .unwrap_or_else(|_| chrono::Duration::seconds(10));
        self.state.prune_trades_before(Utc::now() - window)
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let pruned = self.prune_trades();
                    if pruned > 0 {
                        debug!("[MONITOR] Pruned {} trades", pruned);
                    }
                    info!("[MONITOR] {}", render(&self.state.snapshot()));
                }
            }
        }
    }
}

/// One-line summary of a snapshot
pub fn render(snapshot: &MarketSnapshot) -> String {
    let mut line = snapshot.instrument_id.clone();

    let _ = match snapshot.best_bid {
        Some(bid) => write!(line, " bid {}", bid),
        None => write!(line, " bid -"),
    };
    let _ = match snapshot.best_ask() {
        Some(ask) => write!(line, " ask {}", ask),
        None => write!(line, " ask -"),
    };
    if let Some(spread) = snapshot.spread() {
        let _ = write!(line, " spread {}", spread);
    }
    if let Some(last) = snapshot.last_match_price {
        let _ = write!(line, " last {}", last);
    }
    let _ = write!(
        line,
        " | {} open orders | {} trades",
        snapshot.open_orders, snapshot.trades
    );
    if !snapshot.status.is_empty() {
        let _ = write!(line, " | {}", snapshot.status);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{DepthLevel, Side};
    use hermes_state::StoreConfig;
    use rust_decimal_macros::dec;

    #[test]
    fn test_render_empty_store() {
        let (state, _receivers) = SharedState::new(StoreConfig::default());
        let line = render(&state.snapshot());
        assert!(line.starts_with("BTC-USD bid - ask -"));
        assert!(line.contains("0 open orders"));
    }

    #[test]
    fn test_render_quotes_and_status() {
        let (state, _receivers) = SharedState::new(StoreConfig::default());
        state.set_best_bid(Some(dec!(100)));
        state.set_depth(Side::Sell, vec![DepthLevel::new(dec!(101), dec!(2))]);
        state.set_last_match_price(dec!(100.5));
        state.set_status("Order Canceled.");

        let line = render(&state.snapshot());
        assert!(line.contains("bid 100"));
        assert!(line.contains("ask 101"));
        assert!(line.contains("last 100.5"));
        assert!(line.ends_with("| Order Canceled."));
    }
}
