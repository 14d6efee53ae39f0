//! Order ledger
//!
//! Derives market state and the operator's order lifecycle from the decoded
//! feed. The feed is not filtered for ownership: every event is checked
//! against the owned-order directory and ignored unless its id is there.

use hermes_core::{DepthLevel, OrderStatus, Side, TradeEvent};
use hermes_gateway::{DoneReason, MatchEvent, StreamEvent};
use hermes_ports::PriceLevelBook;
use hermes_state::SharedState;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Writes ledger and depth state into the shared store
#[derive(Clone)]
pub struct OrderLedger {
    state: Arc<SharedState>,
}

impl OrderLedger {
    pub fn new(state: Arc<SharedState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Dispatch one event the book has just applied
    pub fn on_event(&self, event: &StreamEvent, book: &dyn PriceLevelBook) {
        if let StreamEvent::Match(m) = event {
            self.on_trade(m);
        }
        self.on_owned_order_event(event);
        self.state.set_best_bid(book.best_bid());
    }

    /// Record a match in the trade log and update the last match price.
    ///
    /// Matches with a non-positive price or size are dropped.
    pub fn on_trade(&self, event: &MatchEvent) {
        if event.price <= Decimal::ZERO || event.size <= Decimal::ZERO {
            warn!(
                "[LEDGER] Dropping malformed match #{}: {} @ {}",
                event.header.sequence, event.size, event.price
            );
            return;
        }

        self.state.append_trade(TradeEvent {
            sequence: event.header.sequence,
            timestamp: event.header.time,
            instrument_id: event.header.instrument_id.clone(),
            side: event.side,
            price: event.price,
            size: event.size,
            maker_order_id: event.maker_order_id.clone(),
            taker_order_id: event.taker_order_id.clone(),
            trade_id: event.trade_id,
        });
        self.state.set_last_match_price(event.price);

        debug!(
            "[LEDGER] Trade #{} {} {} @ {}",
            event.header.sequence, event.side, event.size, event.price
        );
    }

    /// Apply an event to the owned order it refers to, if any
    pub fn on_owned_order_event(&self, event: &StreamEvent) {
        let Some(order_id) = event.order_id() else {
            return;
        };
        if !self.state.contains_order(order_id) {
            return;
        }

        match event {
            StreamEvent::Open(open) => {
                self.state.update_owned_order(order_id, |order| {
                    order.status = OrderStatus::Open;
                    order.remaining_size = open.remaining_size;
                    order.price = Some(open.price);
                });
                info!("[LEDGER] Order {} open, {} remaining", order_id, open.remaining_size);
            }
            StreamEvent::Done(done) => {
                let status = match &done.reason {
                    DoneReason::Filled => OrderStatus::Filled,
                    DoneReason::Canceled => OrderStatus::Canceled,
                    DoneReason::Other(reason) => {
                        info!(
                            "[LEDGER] Order {} done with reason '{}', status unchanged",
                            order_id, reason
                        );
                        return;
                    }
                };
                self.state
                    .update_owned_order(order_id, |order| order.status = status);
                info!("[LEDGER] Order {} {}", order_id, status);
            }
            StreamEvent::Match(m) => {
                let mut remaining = None;
                self.state.update_owned_order(order_id, |order| {
                    order.apply_fill(m.size);
                    remaining = Some((order.remaining_size, order.status));
                });
                if let Some((remaining, status)) = remaining {
                    info!(
                        "[LEDGER] Order {} matched {} @ {}, {} remaining ({})",
                        order_id, m.size, m.price, remaining, status
                    );
                }
            }
            StreamEvent::Change(change) => {
                debug!(
                    "[LEDGER] Ignoring change for order {} (new size {:?})",
                    order_id, change.new_size
                );
            }
            StreamEvent::Unsupported { .. } => {}
        }
    }

    /// Write the top levels of `book` into the depth tables.
    ///
    /// Each side always ends up with exactly `depth_levels` rows, best price
    /// first, padded with empty rows.
    pub fn recompute_depth(&self, book: &dyn PriceLevelBook) {
        let levels = self.state.depth_levels();
        let to_rows = |pairs: Vec<(Decimal, Decimal)>| -> Vec<DepthLevel> {
            pairs
                .into_iter()
                .map(|(price, size)| DepthLevel::new(price, size))
                .collect()
        };

        self.state.set_depth(Side::Buy, to_rows(book.top_bids(levels)));
        self.state.set_depth(Side::Sell, to_rows(book.top_asks(levels)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{OrderType, OwnedOrder};
    use hermes_gateway::FeedMessage;
    use hermes_state::StoreConfig;
    use rust_decimal_macros::dec;

    fn ledger() -> OrderLedger {
        let (state, _receivers) = SharedState::new(StoreConfig::default());
        OrderLedger::new(Arc::new(state))
    }

    fn event(json: &str) -> StreamEvent {
        FeedMessage::from_json(json).unwrap().decode().unwrap()
    }

    fn owned(id: &str, size: Decimal) -> OwnedOrder {
        OwnedOrder::new(
            id,
            "BTC-USD",
            Side::Sell,
            OrderType::Limit,
            Some(dec!(100)),
            size,
        )
    }

    #[test]
    fn test_match_appends_trade_and_sets_last_price() {
        let ledger = ledger();
        let StreamEvent::Match(m) = event(
            r#"{"type":"match","sequence":3,"time":"2024-03-01T12:00:00Z","product_id":"BTC-USD","maker_order_id":"m","taker_order_id":"t","side":"buy","price":"101.5","size":"0.2","trade_id":1}"#,
        ) else {
            panic!("expected match");
        };

        ledger.on_trade(&m);

        let state = ledger.state();
        assert_eq!(state.last_match_price(), Some(dec!(101.5)));
        let trades = state.recent_trades();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].maker_order_id, "m");
        assert_eq!(trades[0].notional(), dec!(20.3));
    }

    #[test]
    fn test_done_reasons() {
        let ledger = ledger();
        ledger.state().insert_owned_order(owned("f", dec!(1)));
        ledger.state().insert_owned_order(owned("c", dec!(1)));
        ledger.state().insert_owned_order(owned("x", dec!(1)));

        for (id, reason) in [("f", "filled"), ("c", "canceled"), ("x", "expired")] {
            ledger.on_owned_order_event(&event(&format!(
                r#"{{"type":"done","sequence":1,"time":"2024-03-01T12:00:00Z","product_id":"BTC-USD","order_id":"{id}","side":"sell","reason":"{reason}"}}"#
            )));
        }

        let state = ledger.state();
        assert_eq!(state.owned_order("f").unwrap().status, OrderStatus::Filled);
        assert_eq!(state.owned_order("c").unwrap().status, OrderStatus::Canceled);
        assert_eq!(state.owned_order("x").unwrap().status, OrderStatus::Open);
    }

    #[test]
    fn test_open_overwrites_remaining() {
        let ledger = ledger();
        ledger.state().insert_owned_order(owned("o", dec!(2)));

        ledger.on_owned_order_event(&event(
            r#"{"type":"open","sequence":1,"time":"2024-03-01T12:00:00Z","product_id":"BTC-USD","order_id":"o","side":"sell","price":"100.5","remaining_size":"1.5"}"#,
        ));

        let order = ledger.state().owned_order("o").unwrap();
        assert_eq!(order.remaining_size, dec!(1.5));
        assert_eq!(order.price, Some(dec!(100.5)));
        assert_eq!(order.status, OrderStatus::Open);
    }

    #[test]
    fn test_taker_match_does_not_touch_owned_order() {
        let ledger = ledger();
        ledger.state().insert_owned_order(owned("mine", dec!(1)));

        ledger.on_owned_order_event(&event(
            r#"{"type":"match","sequence":2,"time":"2024-03-01T12:00:00Z","product_id":"BTC-USD","maker_order_id":"other","taker_order_id":"mine","side":"buy","price":"100","size":"0.5"}"#,
        ));

        assert_eq!(ledger.state().owned_order("mine").unwrap().remaining_size, dec!(1));
    }

    #[test]
    fn test_change_is_ignored() {
        let ledger = ledger();
        ledger.state().insert_owned_order(owned("o", dec!(2)));

        ledger.on_owned_order_event(&event(
            r#"{"type":"change","sequence":4,"time":"2024-03-01T12:00:00Z","product_id":"BTC-USD","order_id":"o","side":"sell","price":"100","new_size":"1","old_size":"2"}"#,
        ));

        assert_eq!(ledger.state().owned_order("o").unwrap().remaining_size, dec!(2));
    }
}
