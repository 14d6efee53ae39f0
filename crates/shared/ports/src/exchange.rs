use async_trait::async_trait;
use hermes_core::{OrderId, OrderStatus, OrderType, OwnedOrder, PlaceOrder, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ExchangeResult;

/// Status filter for orders that are still live on the exchange
pub const OPEN_STATUSES: [&str; 3] = ["open", "pending", "active"];

/// Reply to a placement call.
///
/// The exchange answers rejections and rate limits with a body that carries
/// no order id; callers treat a missing id as "not placed".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementReply {
    pub order_id: Option<OrderId>,
    pub status: Option<String>,
    pub message: Option<String>,
}

impl PlacementReply {
    pub fn accepted(order_id: impl Into<OrderId>, status: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
            status: Some(status.into()),
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            order_id: None,
            status: None,
            message: Some(message.into()),
        }
    }

    /// Status to show the operator, defaulting to `pending`
    pub fn status_or_pending(&self) -> &str {
        self.status.as_deref().unwrap_or("pending")
    }
}

/// One order from the exchange's authoritative order list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub instrument_id: String,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Option<Decimal>,
    pub size: Decimal,
    pub filled_size: Decimal,
    pub status: String,
    pub done_reason: Option<String>,
}

impl OrderRecord {
    /// Convert into a ledger entry
    pub fn to_owned_order(&self) -> OwnedOrder {
        OwnedOrder {
            id: self.id.clone(),
            instrument_id: self.instrument_id.clone(),
            side: self.side,
            order_type: self.order_type,
            price: self.price,
            size: self.size,
            remaining_size: (self.size - self.filled_size).max(Decimal::ZERO),
            status: OrderStatus::from_exchange(&self.status, self.done_reason.as_deref()),
        }
    }
}

/// Balance of one currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub currency: String,
    pub balance: Decimal,
    pub available: Decimal,
}

/// Port for the exchange's authenticated REST surface
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Place an order. Limit orders are submitted post-only.
    async fn place_order(&self, order: &PlaceOrder) -> ExchangeResult<PlacementReply>;

    /// Cancel an order; returns the ids the exchange reports as canceled
    async fn cancel_order(&self, order_id: &str) -> ExchangeResult<Vec<OrderId>>;

    /// List the operator's orders for an instrument filtered by status
    async fn list_orders(
        &self,
        instrument_id: &str,
        statuses: &[&str],
    ) -> ExchangeResult<Vec<OrderRecord>>;

    /// Account balances, consumed by the display only
    async fn list_account_balances(&self) -> ExchangeResult<Vec<AccountBalance>>;

    /// Client name for logging
    fn name(&self) -> &str {
        "ExchangeClient"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_record_to_owned_order() {
        let record = OrderRecord {
            id: "o-1".to_string(),
            instrument_id: "BTC-USD".to_string(),
            side: Side::Sell,
            order_type: OrderType::Limit,
            price: Some(dec!(51000)),
            size: dec!(1.5),
            filled_size: dec!(0.5),
            status: "open".to_string(),
            done_reason: None,
        };

        let order = record.to_owned_order();
        assert_eq!(order.remaining_size, dec!(1.0));
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.size, dec!(1.5));
    }

    #[test]
    fn test_placement_reply() {
        let ok = PlacementReply::accepted("abc", "pending");
        assert_eq!(ok.order_id.as_deref(), Some("abc"));

        let rejected = PlacementReply::rejected("Insufficient funds");
        assert!(rejected.order_id.is_none());
        assert_eq!(rejected.status_or_pending(), "pending");
    }

    // Ensure traits are object-safe
    fn _assert_exchange_object_safe(_: &dyn ExchangeClient) {}
    fn _assert_book_object_safe(_: &dyn crate::PriceLevelBook) {}
}
