//! Local Order Book Replica
//!
//! Rebuilt from the full channel: every resting order is tracked by id so
//! `done`, `match` and `change` events can adjust the right price level.
//! Levels are aggregated per price for depth queries.
//!
//! Sequence handling is minimal: stale messages are dropped and gaps are
//! counted and logged. There is no resync from a snapshot.

use hermes_core::Side;
use hermes_gateway::StreamEvent;
use hermes_ports::PriceLevelBook;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
struct BookOrder {
    side: Side,
    price: Decimal,
    size: Decimal,
}

/// Local order book replica for a single instrument
///
/// Bid and ask levels map price -> total resting size.
#[derive(Debug, Clone)]
pub struct LocalOrderBook {
    instrument_id: String,
    orders: HashMap<String, BookOrder>,
    bids: BTreeMap<Decimal, Decimal>,
    asks: BTreeMap<Decimal, Decimal>,
    /// Last sequence number applied
    sequence: u64,
    gaps: u64,
}

impl LocalOrderBook {
    /// Create a new empty order book
    pub fn new(instrument_id: impl Into<String>) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            orders: HashMap::new(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            sequence: 0,
            gaps: 0,
        }
    }

    /// Apply one decoded event.
    ///
    /// Returns false when the event was not applied: it belongs to another
    /// instrument or its sequence is not newer than the last one applied.
    pub fn apply(&mut self, event: &StreamEvent) -> bool {
        if let Some(header) = event.header() {
            if header.instrument_id != self.instrument_id {
                return false;
            }
        }

        if let Some(sequence) = event.sequence() {
            if self.sequence > 0 && sequence <= self.sequence {
                debug!(
                    "[BOOK] Dropping stale {} #{} (last {})",
                    event.kind(),
                    sequence,
                    self.sequence
                );
                return false;
            }
            if self.sequence > 0 && sequence > self.sequence + 1 {
                self.gaps += 1;
                warn!(
                    "[BOOK] Sequence gap on {}: {} -> {}",
                    self.instrument_id, self.sequence, sequence
                );
            }
            self.sequence = sequence;
        }

        match event {
            StreamEvent::Open(open) => {
                if let Some(previous) = self.orders.remove(&open.order_id) {
                    self.adjust_level(previous.side, previous.price, -previous.size);
                }
                self.orders.insert(
                    open.order_id.clone(),
                    BookOrder {
                        side: open.side,
                        price: open.price,
                        size: open.remaining_size,
                    },
                );
                self.adjust_level(open.side, open.price, open.remaining_size);
            }
            StreamEvent::Done(done) => {
                if let Some(order) = self.orders.remove(&done.order_id) {
                    self.adjust_level(order.side, order.price, -order.size);
                }
            }
            StreamEvent::Match(m) => {
                if let Some(order) = self.orders.get_mut(&m.maker_order_id) {
                    let executed = m.size.min(order.size);
                    order.size -= executed;
                    let (side, price, exhausted) = (order.side, order.price, order.size.is_zero());
                    if exhausted {
                        self.orders.remove(&m.maker_order_id);
                    }
                    self.adjust_level(side, price, -executed);
                }
            }
            StreamEvent::Change(change) => {
                if let (Some(order), Some(new_size)) =
                    (self.orders.get_mut(&change.order_id), change.new_size)
                {
                    let delta = new_size - order.size;
                    order.size = new_size;
                    let (side, price) = (order.side, order.price);
                    self.adjust_level(side, price, delta);
                }
            }
            StreamEvent::Unsupported { .. } => {}
        }

        true
    }

    fn adjust_level(&mut self, side: Side, price: Decimal, delta: Decimal) {
        let levels = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let total = levels.entry(price).or_insert(Decimal::ZERO);
        *total += delta;
        if *total <= Decimal::ZERO {
            levels.remove(&price);
        }
    }

    /// Get the instrument ID
    pub fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    /// Get current sequence number
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Number of sequence gaps seen
    pub fn gap_count(&self) -> u64 {
        self.gaps
    }

    /// Number of resting orders tracked
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Get mid price (average of best bid and ask)
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => None,
        }
    }

    /// Get spread (ask - bid)
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Check if book is empty
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

impl PriceLevelBook for LocalOrderBook {
    fn best_bid(&self) -> Option<Decimal> {
        self.bids.keys().next_back().copied()
    }

    fn best_ask(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    fn top_bids(&self, n: usize) -> Vec<(Decimal, Decimal)> {
        self.bids
            .iter()
            .rev()
            .take(n)
            .map(|(p, q)| (*p, *q))
            .collect()
    }

    fn top_asks(&self, n: usize) -> Vec<(Decimal, Decimal)> {
        self.asks.iter().take(n).map(|(p, q)| (*p, *q)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_gateway::FeedMessage;
    use rust_decimal_macros::dec;

    fn event(json: &str) -> StreamEvent {
        FeedMessage::from_json(json).unwrap().decode().unwrap()
    }

    fn open(seq: u64, id: &str, side: &str, price: &str, size: &str) -> StreamEvent {
        event(&format!(
            r#"{{"type":"open","sequence":{seq},"time":"2024-03-01T12:00:00.000000Z","product_id":"BTC-USD","order_id":"{id}","side":"{side}","price":"{price}","remaining_size":"{size}"}}"#
        ))
    }

    fn sample_book() -> LocalOrderBook {
        let mut book = LocalOrderBook::new("BTC-USD");
        book.apply(&open(1, "b1", "buy", "50000", "1.0"));
        book.apply(&open(2, "b2", "buy", "49900", "2.0"));
        book.apply(&open(3, "b3", "buy", "50000", "0.5"));
        book.apply(&open(4, "a1", "sell", "50100", "1.5"));
        book.apply(&open(5, "a2", "sell", "50200", "2.5"));
        book
    }

    #[test]
    fn test_open_aggregates_levels() {
        let book = sample_book();

        assert_eq!(book.best_bid(), Some(dec!(50000)));
        assert_eq!(book.best_ask(), Some(dec!(50100)));
        assert_eq!(book.top_bids(5), vec![(dec!(50000), dec!(1.5)), (dec!(49900), dec!(2.0))]);
        assert_eq!(book.sequence(), 5);
        assert_eq!(book.spread(), Some(dec!(100)));
        assert_eq!(book.mid_price(), Some(dec!(50050)));
    }

    #[test]
    fn test_match_and_done_reduce_levels() {
        let mut book = sample_book();

        book.apply(&event(
            r#"{"type":"match","sequence":6,"time":"2024-03-01T12:00:01Z","product_id":"BTC-USD","maker_order_id":"a1","taker_order_id":"t","side":"sell","price":"50100","size":"1.5","trade_id":9}"#,
        ));
        assert_eq!(book.best_ask(), Some(dec!(50200)));

        book.apply(&event(
            r#"{"type":"done","sequence":7,"time":"2024-03-01T12:00:01Z","product_id":"BTC-USD","order_id":"b1","side":"buy","price":"50000","remaining_size":"1.0","reason":"canceled"}"#,
        ));
        assert_eq!(book.top_bids(1), vec![(dec!(50000), dec!(0.5))]);
        assert_eq!(book.order_count(), 3);
    }

    #[test]
    fn test_change_resizes_order() {
        let mut book = sample_book();
        book.apply(&event(
            r#"{"type":"change","sequence":6,"time":"2024-03-01T12:00:01Z","product_id":"BTC-USD","order_id":"b2","side":"buy","price":"49900","new_size":"0.5","old_size":"2.0"}"#,
        ));
        assert_eq!(book.top_bids(2)[1], (dec!(49900), dec!(0.5)));
    }

    #[test]
    fn test_stale_sequence_dropped_and_gap_counted() {
        let mut book = sample_book();

        assert!(!book.apply(&open(5, "late", "buy", "50050", "1")));
        assert_eq!(book.best_bid(), Some(dec!(50000)));

        assert!(book.apply(&open(9, "b4", "buy", "49000", "1")));
        assert_eq!(book.gap_count(), 1);
        assert_eq!(book.sequence(), 9);
    }

    #[test]
    fn test_other_instrument_ignored() {
        let mut book = LocalOrderBook::new("ETH-USD");
        assert!(!book.apply(&open(1, "b1", "buy", "50000", "1.0")));
        assert!(book.is_empty());
    }
}
