use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OrderType, Side};
use crate::values::{InstrumentId, OrderId};

/// Placement request for the buy or sell queue.
///
/// Carries no identity; the exchange-assigned id is the only link to the
/// resulting owned order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub side: Side,
    pub order_type: OrderType,
    pub instrument_id: InstrumentId,
    pub size: Decimal,
    /// Required for limit orders, ignored for market orders
    pub price: Option<Decimal>,
}

impl PlaceOrder {
    /// Create a market order request
    pub fn market(side: Side, instrument_id: impl Into<InstrumentId>, size: Decimal) -> Self {
        Self {
            side,
            order_type: OrderType::Market,
            instrument_id: instrument_id.into(),
            size,
            price: None,
        }
    }

    /// Create a limit order request
    pub fn limit(
        side: Side,
        instrument_id: impl Into<InstrumentId>,
        size: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            side,
            order_type: OrderType::Limit,
            instrument_id: instrument_id.into(),
            size,
            price: Some(price),
        }
    }
}

/// Cancellation request for the cancel queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrder {
    pub order_id: OrderId,
}

impl CancelOrder {
    pub fn new(order_id: impl Into<OrderId>) -> Self {
        Self {
            order_id: order_id.into(),
        }
    }
}

/// Any request an operator can issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderRequest {
    Place(PlaceOrder),
    Cancel(CancelOrder),
}

impl OrderRequest {
    /// Queue name used in status messages and logs
    pub fn queue_name(&self) -> &'static str {
        match self {
            OrderRequest::Place(p) => match p.side {
                Side::Buy => "buy",
                Side::Sell => "sell",
            },
            OrderRequest::Cancel(_) => "cancel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_market_request() {
        let req = PlaceOrder::market(Side::Sell, "ETH-USD", dec!(2));
        assert_eq!(req.order_type, OrderType::Market);
        assert!(req.price.is_none());
        assert_eq!(OrderRequest::Place(req).queue_name(), "sell");
    }

    #[test]
    fn test_limit_request() {
        let req = PlaceOrder::limit(Side::Buy, "BTC-USD", dec!(0.01), dec!(50000));
        assert_eq!(req.order_type, OrderType::Limit);
        assert_eq!(req.price, Some(dec!(50000)));
    }
}
