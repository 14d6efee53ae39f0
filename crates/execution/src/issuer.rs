//! Request issuer
//!
//! The operator-facing entry point. Inputs arrive as text from the UI; they
//! are validated here and either enqueued or reported through the status
//! message. Nothing reaches a queue, and so no exchange call is made, for a
//! request that fails validation.

use crate::error::{Error, Result};
use hermes_core::{CancelOrder, OrderType, PlaceOrder, Side};
use hermes_state::SharedState;
use log::{info, warn};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Clone)]
pub struct RequestIssuer {
    state: Arc<SharedState>,
}

impl RequestIssuer {
    pub fn new(state: Arc<SharedState>) -> Self {
        Self { state }
    }

    /// Queue a buy order. `order_type` is `market` or `limit`; `price` is
    /// ignored for market orders.
    pub fn create_buy_order(
        &self,
        size: &str,
        price: &str,
        instrument_id: &str,
        order_type: &str,
    ) -> Result<()> {
        self.create_order(Side::Buy, size, price, instrument_id, order_type)
    }

    /// Queue a sell order
    pub fn create_sell_order(
        &self,
        size: &str,
        price: &str,
        instrument_id: &str,
        order_type: &str,
    ) -> Result<()> {
        self.create_order(Side::Sell, size, price, instrument_id, order_type)
    }

    /// Queue a cancellation
    pub fn create_cancel_order(&self, order_id: &str) -> Result<()> {
        if order_id.trim().is_empty() {
            self.state.set_status("No order id given to cancel");
            return Err(Error::CancelRejected("empty order id".to_string()));
        }
        self.cancel(CancelOrder::new(order_id.trim()))
    }

    /// Queue an already-typed placement on the queue for its side
    pub fn submit(&self, request: PlaceOrder) -> Result<()> {
        let side = request.side;
        let queue = match side {
            Side::Buy => &self.state.queues().buy,
            Side::Sell => &self.state.queues().sell,
        };
        info!(
            "[ISSUER] Queueing {} {} {} @ {:?}",
            request.order_type, side, request.size, request.price
        );
        queue.push(request).map_err(|e| {
            self.state.set_status(format!("No {} worker: {}", side, e));
            Error::from(e)
        })
    }

    pub fn cancel(&self, request: CancelOrder) -> Result<()> {
        info!("[ISSUER] Queueing cancel of {}", request.order_id);
        self.state.queues().cancel.push(request).map_err(|e| {
            self.state.set_status(format!("No cancel worker: {}", e));
            Error::from(e)
        })
    }

    fn create_order(
        &self,
        side: Side,
        size: &str,
        price: &str,
        instrument_id: &str,
        order_type: &str,
    ) -> Result<()> {
        let expected = self.state.instrument_id();
        match parse_request(side, size, price, instrument_id, expected, order_type) {
            Ok(request) => self.submit(request),
            Err(e) => {
                warn!("[ISSUER] Rejected {} request: {}", side, e);
                let text = match &e {
                    Error::UnknownOrderType(_) => format!("Error in {} order type", side),
                    other => format!("Error in {} order: {}", side, other),
                };
                self.state.set_status(text);
                Err(e)
            }
        }
    }
}

fn parse_request(
    side: Side,
    size: &str,
    price: &str,
    instrument_id: &str,
    expected_instrument: &str,
    order_type: &str,
) -> Result<PlaceOrder> {
    let instrument_id = instrument_id.trim();
    if instrument_id != expected_instrument {
        return Err(Error::WrongInstrument {
            expected: expected_instrument.to_string(),
            got: instrument_id.to_string(),
        });
    }
    let order_type = if order_type.trim().is_empty() {
        OrderType::default()
    } else {
        OrderType::from_str(order_type.trim())
            .map_err(|_| Error::UnknownOrderType(order_type.to_string()))?
    };
    let size = parse_positive("size", size)?;

    Ok(match order_type {
        OrderType::Market => PlaceOrder::market(side, instrument_id, size),
        OrderType::Limit => {
            PlaceOrder::limit(side, instrument_id, size, parse_positive("price", price)?)
        }
    })
}

fn parse_positive(field: &'static str, value: &str) -> Result<Decimal> {
    let invalid = || Error::InvalidNumber {
        field,
        value: value.to_string(),
    };
    let parsed = Decimal::from_str(value.trim()).map_err(|_| invalid())?;
    if parsed <= Decimal::ZERO {
        return Err(invalid());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_state::StoreConfig;
    use rust_decimal_macros::dec;

    fn issuer() -> (RequestIssuer, hermes_state::RequestReceivers) {
        let (state, receivers) = SharedState::new(StoreConfig::default());
        (RequestIssuer::new(Arc::new(state)), receivers)
    }

    #[test]
    fn test_limit_buy_is_queued() {
        let (issuer, mut receivers) = issuer();
        issuer
            .create_buy_order("0.5", "50000.25", "BTC-USD", "limit")
            .unwrap();

        let request = receivers.buy.try_recv().unwrap();
        assert_eq!(request.order_type, OrderType::Limit);
        assert_eq!(request.price, Some(dec!(50000.25)));
        assert_eq!(request.size, dec!(0.5));
        assert!(receivers.sell.try_recv().is_none());
    }

    #[test]
    fn test_market_is_default_and_ignores_price() {
        let (issuer, mut receivers) = issuer();
        issuer.create_sell_order("2", "", "BTC-USD", "").unwrap();

        let request = receivers.sell.try_recv().unwrap();
        assert_eq!(request.order_type, OrderType::Market);
        assert!(request.price.is_none());
        assert_eq!(request.instrument_id, "BTC-USD");
    }

    #[test]
    fn test_other_instrument_sets_status_and_enqueues_nothing() {
        let (issuer, mut receivers) = issuer();

        let result = issuer.create_buy_order("1", "3000", "ETH-USD", "limit");
        assert_eq!(
            result,
            Err(Error::WrongInstrument {
                expected: "BTC-USD".to_string(),
                got: "ETH-USD".to_string()
            })
        );
        assert!(receivers.buy.try_recv().is_none());
        assert!(issuer.state.status_message().starts_with("Error in buy order"));

        assert!(issuer.create_sell_order("1", "", "", "market").is_err());
        assert!(receivers.sell.try_recv().is_none());
    }

    #[test]
    fn test_unknown_type_sets_status_and_enqueues_nothing() {
        let (issuer, mut receivers) = issuer();
        let result = issuer.create_buy_order("1", "100", "BTC-USD", "stop");

        assert!(matches!(result, Err(Error::UnknownOrderType(_))));
        assert!(receivers.buy.try_recv().is_none());
        assert_eq!(issuer.state.status_message(), "Error in buy order type");
    }

    #[test]
    fn test_non_numeric_size_rejected() {
        let (issuer, mut receivers) = issuer();
        let result = issuer.create_sell_order("lots", "100", "BTC-USD", "limit");

        assert_eq!(
            result,
            Err(Error::InvalidNumber {
                field: "size",
                value: "lots".to_string()
            })
        );
        assert!(receivers.sell.try_recv().is_none());
        assert!(issuer.state.status_message().starts_with("Error in sell order"));
    }

    #[test]
    fn test_limit_without_price_rejected() {
        let (issuer, mut receivers) = issuer();
        assert!(issuer.create_buy_order("1", "", "BTC-USD", "limit").is_err());
        assert!(receivers.buy.try_recv().is_none());
    }

    #[test]
    fn test_cancel_is_queued() {
        let (issuer, mut receivers) = issuer();
        issuer.create_cancel_order(" abc-123 ").unwrap();
        assert_eq!(receivers.cancel.try_recv().unwrap().order_id, "abc-123");
        assert!(issuer.create_cancel_order("").is_err());
    }
}
