use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Side;
use crate::values::{InstrumentId, OrderId};

/// Trade derived from one exchange match notification.
///
/// Immutable once appended to the trade log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    /// The instrument that was traded
    pub instrument_id: InstrumentId,
    /// Side of the maker order
    pub side: Side,
    pub price: Decimal,
    pub size: Decimal,
    /// Resting order that was matched
    pub maker_order_id: OrderId,
    pub taker_order_id: Option<OrderId>,
    pub trade_id: Option<u64>,
}

impl TradeEvent {
    /// Returns the notional value of the trade (price * size)
    pub fn notional(&self) -> Decimal {
        self.price * self.size
    }
}
