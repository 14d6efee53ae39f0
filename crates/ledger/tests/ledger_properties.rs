//! Integration tests: feed -> LedgerService -> SharedState

use hermes_core::{OrderStatus, OrderType, OwnedOrder, Side};
use hermes_gateway::{ChannelPublisher, FeedMessage, Publisher, StreamEvent};
use hermes_ledger::{LedgerConfig, LedgerService, LocalOrderBook, OrderLedger};
use hermes_state::{SharedState, StoreConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const TIME: &str = "2024-03-01T12:00:00.000000Z";

fn state(depth_levels: usize) -> Arc<SharedState> {
    let (state, _receivers) = SharedState::new(StoreConfig {
        depth_levels,
        ..Default::default()
    });
    Arc::new(state)
}

fn open(seq: u64, id: &str, side: &str, price: &str, size: &str) -> FeedMessage {
    FeedMessage::from_json(&format!(
        r#"{{"type":"open","sequence":{seq},"time":"{TIME}","product_id":"BTC-USD","order_id":"{id}","side":"{side}","price":"{price}","remaining_size":"{size}"}}"#
    ))
    .unwrap()
}

fn matched(seq: u64, maker: &str, price: &str, size: &str) -> FeedMessage {
    FeedMessage::from_json(&format!(
        r#"{{"type":"match","sequence":{seq},"time":"{TIME}","product_id":"BTC-USD","maker_order_id":"{maker}","taker_order_id":"taker","side":"sell","price":"{price}","size":"{size}"}}"#
    ))
    .unwrap()
}

fn apply(ledger: &OrderLedger, book: &mut LocalOrderBook, msg: FeedMessage) {
    let event: StreamEvent = msg.decode().unwrap();
    if book.apply(&event) {
        ledger.on_event(&event, &*book);
    }
}

#[test]
fn test_exact_decimal_fill_reaches_done() {
    let state = state(5);
    let ledger = OrderLedger::new(state.clone());
    let mut book = LocalOrderBook::new("BTC-USD");

    state.insert_owned_order(OwnedOrder::new(
        "mine",
        "BTC-USD",
        Side::Sell,
        OrderType::Limit,
        Some(dec!(100)),
        dec!(1.000000000),
    ));

    apply(&ledger, &mut book, open(1, "mine", "sell", "100", "1.000000000"));
    apply(&ledger, &mut book, matched(2, "mine", "100", "0.400000000"));

    let order = state.owned_order("mine").unwrap();
    assert_eq!(order.remaining_size, dec!(0.600000000));
    assert_eq!(order.status, OrderStatus::Open);

    apply(&ledger, &mut book, matched(3, "mine", "100", "0.600000000"));

    let order = state.owned_order("mine").unwrap();
    assert_eq!(order.remaining_size, Decimal::ZERO);
    assert_eq!(order.status, OrderStatus::Done);
    assert_eq!(state.trade_count(), 2);
    assert_eq!(state.last_match_price(), Some(dec!(100)));
}

#[test]
fn test_remaining_never_increases_across_matches() {
    let state = state(5);
    let ledger = OrderLedger::new(state.clone());
    let mut book = LocalOrderBook::new("BTC-USD");

    state.insert_owned_order(OwnedOrder::new(
        "mine",
        "BTC-USD",
        Side::Sell,
        OrderType::Limit,
        Some(dec!(100)),
        dec!(1),
    ));
    apply(&ledger, &mut book, open(1, "mine", "sell", "100", "1"));

    let mut last = dec!(1);
    for (seq, size) in [(2, "0.3"), (3, "0.3"), (4, "0.3"), (5, "0.3")] {
        apply(&ledger, &mut book, matched(seq, "mine", "100", size));
        let remaining = state.owned_order("mine").unwrap().remaining_size;
        assert!(remaining <= last);
        assert!(remaining >= Decimal::ZERO);
        last = remaining;
    }

    let order = state.owned_order("mine").unwrap();
    assert_eq!(order.remaining_size, Decimal::ZERO);
    assert_eq!(order.status, OrderStatus::Done);
}

#[test]
fn test_unknown_order_events_leave_directory_untouched() {
    let state = state(5);
    let ledger = OrderLedger::new(state.clone());
    let mut book = LocalOrderBook::new("BTC-USD");

    state.insert_owned_order(OwnedOrder::new(
        "mine",
        "BTC-USD",
        Side::Buy,
        OrderType::Limit,
        Some(dec!(99)),
        dec!(2),
    ));
    let before = state.owned_orders();

    apply(&ledger, &mut book, open(1, "someone", "sell", "100", "1"));
    apply(&ledger, &mut book, matched(2, "someone", "100", "0.5"));

    assert_eq!(state.owned_orders(), before);
    assert_eq!(state.trade_count(), 1);
}

#[test]
fn test_depth_table_shape() {
    let state = state(3);
    let ledger = OrderLedger::new(state.clone());
    let mut book = LocalOrderBook::new("BTC-USD");

    apply(&ledger, &mut book, open(1, "b1", "buy", "99", "1"));
    apply(&ledger, &mut book, open(2, "b2", "buy", "98", "2"));
    apply(&ledger, &mut book, open(3, "b3", "buy", "99", "0.5"));
    apply(&ledger, &mut book, open(4, "b4", "buy", "97", "1"));
    apply(&ledger, &mut book, open(5, "b5", "buy", "96", "1"));
    apply(&ledger, &mut book, open(6, "a1", "sell", "101", "4"));

    ledger.recompute_depth(&book);

    let bids = state.depth(Side::Buy);
    assert_eq!(bids.len(), 3);
    assert_eq!(bids[0].price, dec!(99));
    assert_eq!(bids[0].size, dec!(1.5));
    assert_eq!(bids[1].price, dec!(98));
    assert_eq!(bids[2].price, dec!(97));

    let asks = state.depth(Side::Sell);
    assert_eq!(asks.len(), 3);
    assert_eq!(asks[0].price, dec!(101));
    assert!(asks[1].is_empty());
    assert!(asks[2].is_empty());
    assert_eq!(state.best_bid(), Some(dec!(99)));
}

#[tokio::test]
async fn test_service_ingests_feed_and_skips_bad_input() {
    let _ = env_logger::try_init();

    let state = state(5);
    let ledger = OrderLedger::new(state.clone());
    let (publisher, subscriber) = ChannelPublisher::<FeedMessage>::pair(64);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let service = LedgerService::new(
        ledger,
        subscriber,
        LedgerConfig {
            depth_interval: Duration::from_millis(10),
        },
    );
    let handle = tokio::spawn(service.run(shutdown_rx));

    publisher.publish(&open(1, "b1", "buy", "99", "1")).await.unwrap();
    publisher
        .publish(&FeedMessage {
            kind: "open".to_string(),
            sequence: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    publisher.publish(&open(1, "stale", "buy", "100", "1")).await.unwrap();
    publisher.publish(&matched(3, "b1", "99", "0.25")).await.unwrap();
    drop(publisher);

    let stats = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap();
    drop(shutdown_tx);

    assert_eq!(stats.applied, 2);
    assert_eq!(stats.malformed, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(state.best_bid(), Some(dec!(99)));
    assert_eq!(state.depth(Side::Buy)[0].size, dec!(0.75));
    assert_eq!(state.last_match_price(), Some(dec!(99)));
}
