//! Simulated exchange - Gateway Out for the simulator
//!
//! A price-time priority book with two kinds of resting liquidity: the
//! operator's own orders, placed through the `ExchangeClient` port, and
//! background liquidity added by the market activity generator. Every book
//! change is reported on the feed while the book lock is held, so feed
//! sequence order always matches book order.

use super::feed::SimulatorFeed;
use crate::error::GatewayError;
use async_trait::async_trait;
use hermes_core::{OrderId, OrderType, PlaceOrder, Side};
use hermes_ports::{
    AccountBalance, ExchangeClient, ExchangeError, ExchangeResult, OrderRecord, PlacementReply,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, VecDeque};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Simulated exchange configuration
#[derive(Debug, Clone)]
pub struct SimulatedExchangeConfig {
    pub instrument_id: String,
    /// Probability in [0, 1] that a placement is answered without an order id
    pub reject_rate: f64,
    pub seed: u64,
    pub balances: Vec<AccountBalance>,
}

impl Default for SimulatedExchangeConfig {
    fn default() -> Self {
        Self {
            instrument_id: "BTC-USD".to_string(),
            reject_rate: 0.0,
            seed: 42,
            balances: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct RestingOrder {
    side: Side,
    price: Decimal,
    remaining: Decimal,
}

/// One execution against a resting order
#[derive(Debug, Clone)]
struct Fill {
    trade_id: u64,
    maker_order_id: OrderId,
    maker_side: Side,
    price: Decimal,
    size: Decimal,
    maker_done: bool,
}

struct Book {
    bids: BTreeMap<Decimal, VecDeque<OrderId>>,
    asks: BTreeMap<Decimal, VecDeque<OrderId>>,
    resting: HashMap<OrderId, RestingOrder>,
    /// Every order the operator placed, keyed by exchange id
    operator_orders: HashMap<OrderId, OrderRecord>,
    rng: StdRng,
    next_trade_id: u64,
}

impl Book {
    fn new(seed: u64) -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            resting: HashMap::new(),
            operator_orders: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
            next_trade_id: 1,
        }
    }

    fn best_bid(&self) -> Option<Decimal> {
        self.bids.keys().next_back().copied()
    }

    fn best_ask(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    /// Would a resting order at `price` execute immediately?
    fn crosses(&self, side: Side, price: Decimal) -> bool {
        match side {
            Side::Buy => self.best_ask().is_some_and(|ask| price >= ask),
            Side::Sell => self.best_bid().is_some_and(|bid| price <= bid),
        }
    }

    fn rest(&mut self, id: OrderId, side: Side, price: Decimal, size: Decimal) {
        let levels = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        levels.entry(price).or_default().push_back(id.clone());
        self.resting.insert(
            id,
            RestingOrder {
                side,
                price,
                remaining: size,
            },
        );
    }

    fn remove(&mut self, id: &str) -> Option<RestingOrder> {
        let order = self.resting.remove(id)?;
        let levels = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(queue) = levels.get_mut(&order.price) {
            queue.retain(|queued| queued != id);
            if queue.is_empty() {
                levels.remove(&order.price);
            }
        }
        Some(order)
    }

    /// Execute a taker of `size` against the opposite side
    fn take(&mut self, taker_side: Side, mut size: Decimal) -> Vec<Fill> {
        let mut fills = Vec::new();

        while size > Decimal::ZERO {
            let best = match taker_side {
                Side::Buy => self.best_ask(),
                Side::Sell => self.best_bid(),
            };
            let Some(price) = best else { break };

            let levels = match taker_side {
                Side::Buy => &mut self.asks,
                Side::Sell => &mut self.bids,
            };
            let Some(maker_id) = levels.get(&price).and_then(|q| q.front().cloned()) else {
                levels.remove(&price);
                continue;
            };
            let Some(maker) = self.resting.get_mut(&maker_id) else {
                if let Some(queue) = levels.get_mut(&price) {
                    queue.pop_front();
                }
                continue;
            };

            let executed = size.min(maker.remaining);
            maker.remaining -= executed;
            size -= executed;
            let maker_side = maker.side;
            let maker_done = maker.remaining.is_zero();

            let trade_id = self.next_trade_id;
            self.next_trade_id += 1;

            if let Some(record) = self.operator_orders.get_mut(&maker_id) {
                record.filled_size += executed;
                if maker_done {
                    record.status = "done".to_string();
                    record.done_reason = Some("filled".to_string());
                }
            }
            if maker_done {
                self.remove(&maker_id);
            }

            fills.push(Fill {
                trade_id,
                maker_order_id: maker_id,
                maker_side,
                price,
                size: executed,
                maker_done,
            });
        }

        fills
    }

    fn random_resting(&mut self, operator: bool) -> Option<OrderId> {
        let candidates: Vec<&OrderId> = self
            .resting
            .keys()
            .filter(|id| self.operator_orders.contains_key(*id) == operator)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let pick = self.rng.gen_range(0..candidates.len());
        Some(candidates[pick].clone())
    }
}

/// Gateway Out for the simulator
///
/// Implements `ExchangeClient` on top of an in-memory book and reports all
/// book activity through the `SimulatorFeed`.
pub struct SimulatedExchange {
    config: SimulatedExchangeConfig,
    feed: SimulatorFeed,
    book: Mutex<Book>,
}

impl SimulatedExchange {
    pub fn new(config: SimulatedExchangeConfig, feed: SimulatorFeed) -> Self {
        let book = Book::new(config.seed);
        Self {
            config: SimulatedExchangeConfig {
                reject_rate: config.reject_rate.clamp(0.0, 1.0),
                ..config
            },
            feed,
            book: Mutex::new(book),
        }
    }

    pub fn instrument_id(&self) -> &str {
        &self.config.instrument_id
    }

    /// Best bid and best ask
    pub async fn quote(&self) -> (Option<Decimal>, Option<Decimal>) {
        let book = self.book.lock().await;
        (book.best_bid(), book.best_ask())
    }

    /// Number of resting orders (operator and background)
    pub async fn resting_count(&self) -> usize {
        self.book.lock().await.resting.len()
    }

    /// Rest background liquidity on the book.
    ///
    /// Returns `None` without touching the book if the order would cross.
    pub async fn add_liquidity(
        &self,
        side: Side,
        price: Decimal,
        size: Decimal,
    ) -> Result<Option<OrderId>, GatewayError> {
        let mut book = self.book.lock().await;
        if size <= Decimal::ZERO || book.crosses(side, price) {
            return Ok(None);
        }

        let id = Uuid::new_v4().to_string();
        book.rest(id.clone(), side, price, size);
        self.feed.publish_open(&id, side, price, size).await?;
        Ok(Some(id))
    }

    /// Send a background market order; returns the executed size
    pub async fn take_liquidity(&self, side: Side, size: Decimal) -> Result<Decimal, GatewayError> {
        let mut book = self.book.lock().await;
        let taker_id = Uuid::new_v4().to_string();
        let fills = book.take(side, size);
        let executed = self.report_fills(&taker_id, side, &fills).await?;
        if !fills.is_empty() {
            self.feed
                .publish_done(
                    &taker_id,
                    side,
                    None,
                    Some(size - executed),
                    "filled",
                )
                .await?;
        }
        Ok(executed)
    }

    /// Cancel one randomly chosen background order
    pub async fn cancel_random_liquidity(&self) -> Result<Option<OrderId>, GatewayError> {
        let mut book = self.book.lock().await;
        let Some(id) = book.random_resting(false) else {
            return Ok(None);
        };
        if let Some(order) = book.remove(&id) {
            self.feed
                .publish_done(
                    &id,
                    order.side,
                    Some(order.price),
                    Some(order.remaining),
                    "canceled",
                )
                .await?;
        }
        Ok(Some(id))
    }

    /// Publish matches for `fills` and `done` for every exhausted maker
    async fn report_fills(
        &self,
        taker_id: &str,
        taker_side: Side,
        fills: &[Fill],
    ) -> Result<Decimal, GatewayError> {
        let mut executed = Decimal::ZERO;
        for fill in fills {
            executed += fill.size;
            self.feed
                .publish_match(
                    fill.trade_id,
                    &fill.maker_order_id,
                    taker_id,
                    fill.maker_side,
                    fill.price,
                    fill.size,
                )
                .await?;
            if fill.maker_done {
                self.feed
                    .publish_done(
                        &fill.maker_order_id,
                        fill.maker_side,
                        Some(fill.price),
                        Some(Decimal::ZERO),
                        "filled",
                    )
                    .await?;
            }
        }
        debug!(
            "[SIM] {} taker {} executed {} in {} fills",
            taker_side,
            taker_id,
            executed,
            fills.len()
        );
        Ok(executed)
    }
}

fn transport_failure(err: GatewayError) -> ExchangeError {
    ExchangeError::Transport(err.to_string())
}

#[async_trait]
impl ExchangeClient for SimulatedExchange {
    async fn place_order(&self, order: &PlaceOrder) -> ExchangeResult<PlacementReply> {
        if order.instrument_id != self.config.instrument_id {
            return Err(ExchangeError::Rejected(format!(
                "Unknown product {}",
                order.instrument_id
            )));
        }

        let mut book = self.book.lock().await;

        if book.rng.gen_bool(self.config.reject_rate) {
            warn!("[SIM] Rejecting {} order", order.side);
            return Ok(PlacementReply::rejected("Rate limit exceeded"));
        }
        if order.size <= Decimal::ZERO {
            return Ok(PlacementReply::rejected("size is too small"));
        }

        let id = Uuid::new_v4().to_string();
        let mut record = OrderRecord {
            id: id.clone(),
            instrument_id: order.instrument_id.clone(),
            side: order.side,
            order_type: order.order_type,
            price: order.price,
            size: order.size,
            filled_size: Decimal::ZERO,
            status: "open".to_string(),
            done_reason: None,
        };

        match order.order_type {
            OrderType::Limit => {
                let Some(price) = order.price else {
                    return Ok(PlacementReply::rejected("price is required"));
                };
                // Limit orders are post-only
                if book.crosses(order.side, price) {
                    return Ok(PlacementReply::rejected("Post only mode"));
                }
                book.rest(id.clone(), order.side, price, order.size);
                book.operator_orders.insert(id.clone(), record);
                self.feed
                    .publish_open(&id, order.side, price, order.size)
                    .await
                    .map_err(transport_failure)?;
            }
            OrderType::Market => {
                let fills = book.take(order.side, order.size);
                let executed = self
                    .report_fills(&id, order.side, &fills)
                    .await
                    .map_err(transport_failure)?;
                let reason = if executed == order.size {
                    "filled"
                } else {
                    "canceled"
                };
                record.filled_size = executed;
                record.status = "done".to_string();
                record.done_reason = Some(reason.to_string());
                book.operator_orders.insert(id.clone(), record);
                self.feed
                    .publish_done(&id, order.side, None, Some(order.size - executed), reason)
                    .await
                    .map_err(transport_failure)?;
            }
        }

        info!(
            "[SIM] Accepted {} {} {} @ {:?} as {}",
            order.order_type, order.side, order.size, order.price, id
        );
        Ok(PlacementReply::accepted(id, "pending"))
    }

    async fn cancel_order(&self, order_id: &str) -> ExchangeResult<Vec<OrderId>> {
        let mut book = self.book.lock().await;

        if !book.operator_orders.contains_key(order_id) {
            return Err(ExchangeError::OrderNotFound(order_id.to_string()));
        }
        let Some(order) = book.remove(order_id) else {
            return Err(ExchangeError::Rejected(format!(
                "Order {} is already done",
                order_id
            )));
        };

        if let Some(record) = book.operator_orders.get_mut(order_id) {
            record.status = "done".to_string();
            record.done_reason = Some("canceled".to_string());
        }
        self.feed
            .publish_done(
                order_id,
                order.side,
                Some(order.price),
                Some(order.remaining),
                "canceled",
            )
            .await
            .map_err(transport_failure)?;

        Ok(vec![order_id.to_string()])
    }

    async fn list_orders(
        &self,
        instrument_id: &str,
        statuses: &[&str],
    ) -> ExchangeResult<Vec<OrderRecord>> {
        let book = self.book.lock().await;
        let mut orders: Vec<OrderRecord> = book
            .operator_orders
            .values()
            .filter(|r| r.instrument_id == instrument_id)
            .filter(|r| statuses.is_empty() || statuses.contains(&r.status.as_str()))
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(orders)
    }

    async fn list_account_balances(&self) -> ExchangeResult<Vec<AccountBalance>> {
        Ok(self.config.balances.clone())
    }

    fn name(&self) -> &str {
        "SimulatedExchange"
    }
}
