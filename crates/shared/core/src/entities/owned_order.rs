use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OrderStatus, OrderType, Side};
use crate::values::{InstrumentId, OrderId};

/// An order known to belong to the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedOrder {
    pub id: OrderId,
    pub instrument_id: InstrumentId,
    pub side: Side,
    pub order_type: OrderType,
    /// None for market orders
    pub price: Option<Decimal>,
    /// Size at placement (or as reported by the exchange record)
    pub size: Decimal,
    /// Size still resting; never increases between reconciliations
    pub remaining_size: Decimal,
    pub status: OrderStatus,
}

impl OwnedOrder {
    /// Create an open order with nothing filled yet
    pub fn new(
        id: impl Into<OrderId>,
        instrument_id: impl Into<InstrumentId>,
        side: Side,
        order_type: OrderType,
        price: Option<Decimal>,
        size: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            instrument_id: instrument_id.into(),
            side,
            order_type,
            price,
            size,
            remaining_size: size,
            status: OrderStatus::Open,
        }
    }

    /// Record a match against this order.
    ///
    /// Remaining size only moves down. A matched size larger than what is
    /// left clamps at zero. Only an open order moves to `Done`; terminal
    /// statuses are kept. Returns the new remaining size.
    pub fn apply_fill(&mut self, matched: Decimal) -> Decimal {
        if matched.is_sign_negative() {
            return self.remaining_size;
        }

        self.remaining_size = (self.remaining_size - matched).max(Decimal::ZERO);
        if self.remaining_size.is_zero() && self.status == OrderStatus::Open {
            self.status = OrderStatus::Done;
        }
        self.remaining_size
    }

    /// Size matched so far
    pub fn filled_size(&self) -> Decimal {
        self.size - self.remaining_size
    }

    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }
}
