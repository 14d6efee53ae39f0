//! Shared state store

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use hermes_core::{DepthLevel, OrderId, OwnedOrder, Side, TradeEvent};
use log::info;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::queue::{RequestQueues, RequestReceivers};

/// Store sizing, fixed for the session
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Instrument traded in this session
    pub instrument_id: String,
    /// Rows per depth table (N)
    pub depth_levels: usize,
    /// Trades kept in the rolling log before the oldest are evicted
    pub trade_log_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            instrument_id: "BTC-USD".to_string(),
            depth_levels: 5,
            trade_log_capacity: 10_000,
        }
    }
}

/// Human-readable outcome of the latest operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub updated_at: DateTime<Utc>,
}

/// Point-in-time copy of the display fields
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub instrument_id: String,
    pub best_bid: Option<Decimal>,
    pub last_match_price: Option<Decimal>,
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
    pub open_orders: usize,
    pub trades: usize,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Best ask from the ask depth table, if populated
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().filter(|l| !l.is_empty()).map(|l| l.price)
    }

    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid, self.best_ask()) {
            (Some(b), Some(a)) => Some(a - b),
            _ => None,
        }
    }
}

/// Process-shared store
pub struct SharedState {
    config: StoreConfig,
    best_bid: RwLock<Option<Decimal>>,
    last_match_price: RwLock<Option<Decimal>>,
    bid_depth: RwLock<Vec<DepthLevel>>,
    ask_depth: RwLock<Vec<DepthLevel>>,
    owned_orders: DashMap<OrderId, OwnedOrder>,
    trade_log: Mutex<VecDeque<TradeEvent>>,
    status: RwLock<StatusMessage>,
    queues: RequestQueues,
}

impl SharedState {
    /// Create the store and the queue receivers for the execution subsystem
    pub fn new(config: StoreConfig) -> (Self, RequestReceivers) {
        let (queues, receivers) = RequestQueues::new();
        let empty = vec![DepthLevel::empty(); config.depth_levels];

        let state = Self {
            best_bid: RwLock::new(None),
            last_match_price: RwLock::new(None),
            bid_depth: RwLock::new(empty.clone()),
            ask_depth: RwLock::new(empty),
            owned_orders: DashMap::new(),
            trade_log: Mutex::new(VecDeque::new()),
            status: RwLock::new(StatusMessage {
                text: String::new(),
                updated_at: Utc::now(),
            }),
            queues,
            config,
        };

        (state, receivers)
    }

    pub fn instrument_id(&self) -> &str {
        &self.config.instrument_id
    }

    pub fn depth_levels(&self) -> usize {
        self.config.depth_levels
    }

    // === Market state ===

    pub fn best_bid(&self) -> Option<Decimal> {
        *self.best_bid.read()
    }

    pub fn set_best_bid(&self, price: Option<Decimal>) {
        *self.best_bid.write() = price;
    }

    pub fn last_match_price(&self) -> Option<Decimal> {
        *self.last_match_price.read()
    }

    pub fn set_last_match_price(&self, price: Decimal) {
        *self.last_match_price.write() = Some(price);
    }

    /// Depth table for one side, always `depth_levels` rows
    pub fn depth(&self, side: Side) -> Vec<DepthLevel> {
        match side {
            Side::Buy => self.bid_depth.read().clone(),
            Side::Sell => self.ask_depth.read().clone(),
        }
    }

    /// Replace one side's depth table.
    ///
    /// The table is padded with empty rows or truncated to `depth_levels`.
    pub fn set_depth(&self, side: Side, mut levels: Vec<DepthLevel>) {
        levels.resize(self.config.depth_levels, DepthLevel::empty());
        match side {
            Side::Buy => *self.bid_depth.write() = levels,
            Side::Sell => *self.ask_depth.write() = levels,
        }
    }

    // === Owned orders ===

    pub fn contains_order(&self, order_id: &str) -> bool {
        self.owned_orders.contains_key(order_id)
    }

    pub fn owned_order(&self, order_id: &str) -> Option<OwnedOrder> {
        self.owned_orders.get(order_id).map(|o| o.clone())
    }

    /// Insert or overwrite one entry
    pub fn insert_owned_order(&self, order: OwnedOrder) {
        self.owned_orders.insert(order.id.clone(), order);
    }

    /// Mutate an entry in place under its slot lock.
    ///
    /// Returns false (and does nothing) when the id is not in the directory.
    pub fn update_owned_order<F>(&self, order_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut OwnedOrder),
    {
        match self.owned_orders.get_mut(order_id) {
            Some(mut entry) => {
                f(entry.value_mut());
                true
            }
            None => false,
        }
    }

    /// Replace the directory with the exchange's authoritative list.
    ///
    /// Each slot changes atomically; a reader may see a mix of old and new
    /// slots while the replacement is in progress.
    pub fn replace_owned_orders(&self, orders: Vec<OwnedOrder>) {
        let incoming: HashMap<OrderId, OwnedOrder> =
            orders.into_iter().map(|o| (o.id.clone(), o)).collect();

        self.owned_orders.retain(|id, _| incoming.contains_key(id));
        for (id, order) in incoming {
            self.owned_orders.insert(id, order);
        }
    }

    /// Ordered copy of the directory
    pub fn owned_orders(&self) -> BTreeMap<OrderId, OwnedOrder> {
        self.owned_orders
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn open_orders(&self) -> Vec<OwnedOrder> {
        let mut open: Vec<OwnedOrder> = self
            .owned_orders
            .iter()
            .filter(|entry| entry.value().is_open())
            .map(|entry| entry.value().clone())
            .collect();
        open.sort_by(|a, b| a.id.cmp(&b.id));
        open
    }

    pub fn owned_order_count(&self) -> usize {
        self.owned_orders.len()
    }

    // === Trade log ===

    /// Append a trade, evicting the oldest entry at capacity
    pub fn append_trade(&self, trade: TradeEvent) {
        let mut log = self.trade_log.lock();
        if log.len() >= self.config.trade_log_capacity {
            log.pop_front();
        }
        log.push_back(trade);
    }

    /// Drop trades older than `cutoff`; returns how many were removed.
    ///
    /// Holds the log lock for the whole prune, so appends wait for it.
    pub fn prune_trades_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut log = self.trade_log.lock();
        let before = log.len();
        while log.front().is_some_and(|t| t.timestamp < cutoff) {
            log.pop_front();
        }
        before - log.len()
    }

    /// Copy of the rolling log, oldest first
    pub fn recent_trades(&self) -> Vec<TradeEvent> {
        self.trade_log.lock().iter().cloned().collect()
    }

    pub fn trade_count(&self) -> usize {
        self.trade_log.lock().len()
    }

    // === Status ===

    pub fn status_message(&self) -> String {
        self.status.read().text.clone()
    }

    pub fn status(&self) -> StatusMessage {
        self.status.read().clone()
    }

    pub fn set_status(&self, text: impl Into<String>) {
        let text = text.into();
        info!("[STATUS] {}", text);
        *self.status.write() = StatusMessage {
            text,
            updated_at: Utc::now(),
        };
    }

    // === Queues ===

    /// Producer handles for the buy, sell and cancel queues
    pub fn queues(&self) -> &RequestQueues {
        &self.queues
    }

    /// Copy of the display fields
    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            instrument_id: self.config.instrument_id.clone(),
            best_bid: self.best_bid(),
            last_match_price: self.last_match_price(),
            bids: self.depth(Side::Buy),
            asks: self.depth(Side::Sell),
            open_orders: self.open_orders().len(),
            trades: self.trade_count(),
            status: self.status_message(),
            timestamp: Utc::now(),
        }
    }
}
