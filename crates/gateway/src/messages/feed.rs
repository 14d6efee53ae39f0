//! Full-channel feed messages
//!
//! `FeedMessage` is the raw JSON shape the exchange sends: one flat object per
//! event with a `type` tag and optional fields. `StreamEvent` is the decoded,
//! validated form with one variant per event kind the order core cares about.

use chrono::{DateTime, Utc};
use hermes_core::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Raw full-channel message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
    #[serde(default, alias = "timestamp", skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maker_order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taker_order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_size: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_size: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_size: Option<Decimal>,
}

impl FeedMessage {
    /// Parse one websocket text frame
    pub fn from_json(text: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, DecodeError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode into a typed stream event
    pub fn decode(self) -> Result<StreamEvent, DecodeError> {
        StreamEvent::try_from(self)
    }

    fn require<T>(&self, value: Option<T>, field: &'static str) -> Result<T, DecodeError> {
        value.ok_or_else(|| DecodeError::MissingField {
            kind: self.kind.clone(),
            field,
        })
    }

    fn header(&self) -> Result<EventHeader, DecodeError> {
        let sequence = self.require(self.sequence, "sequence")?;
        let raw_time = self.require(self.time.as_deref(), "time")?;
        let time = DateTime::parse_from_rfc3339(raw_time)
            .map_err(|_| DecodeError::InvalidTimestamp(raw_time.to_string()))?
            .with_timezone(&Utc);
        let instrument_id = self.require(self.product_id.clone(), "product_id")?;

        Ok(EventHeader {
            sequence,
            time,
            instrument_id,
        })
    }

    fn parsed_side(&self) -> Result<Side, DecodeError> {
        let raw = self.require(self.side.as_deref(), "side")?;
        raw.parse()
            .map_err(|_| DecodeError::InvalidSide(raw.to_string()))
    }
}

/// Fields shared by every sequenced event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventHeader {
    pub sequence: u64,
    pub time: DateTime<Utc>,
    pub instrument_id: String,
}

/// An order is now resting on the book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenEvent {
    pub header: EventHeader,
    pub order_id: String,
    pub side: Side,
    pub price: Decimal,
    pub remaining_size: Decimal,
}

/// Why an order left the book
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoneReason {
    Filled,
    Canceled,
    Other(String),
}

impl DoneReason {
    fn parse(raw: &str) -> Self {
        match raw {
            "filled" => DoneReason::Filled,
            "canceled" => DoneReason::Canceled,
            other => DoneReason::Other(other.to_string()),
        }
    }
}

/// An order is no longer on the book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoneEvent {
    pub header: EventHeader,
    pub order_id: String,
    pub side: Side,
    /// Absent for market orders, which never rested
    pub price: Option<Decimal>,
    pub remaining_size: Option<Decimal>,
    pub reason: DoneReason,
}

/// A trade between a resting maker and an incoming taker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEvent {
    pub header: EventHeader,
    pub trade_id: Option<u64>,
    pub maker_order_id: String,
    pub taker_order_id: Option<String>,
    /// Side of the maker order
    pub side: Side,
    pub price: Decimal,
    pub size: Decimal,
}

/// The exchange amended a resting order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub header: EventHeader,
    pub order_id: String,
    pub side: Side,
    pub price: Option<Decimal>,
    pub new_size: Option<Decimal>,
    pub old_size: Option<Decimal>,
}

/// Decoded feed event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Open(OpenEvent),
    Done(DoneEvent),
    Match(MatchEvent),
    Change(ChangeEvent),
    /// Any other message type (`received`, `activate`, heartbeats, ...)
    Unsupported { kind: String, sequence: Option<u64> },
}

impl StreamEvent {
    pub fn kind(&self) -> &str {
        match self {
            StreamEvent::Open(_) => "open",
            StreamEvent::Done(_) => "done",
            StreamEvent::Match(_) => "match",
            StreamEvent::Change(_) => "change",
            StreamEvent::Unsupported { kind, .. } => kind,
        }
    }

    pub fn header(&self) -> Option<&EventHeader> {
        match self {
            StreamEvent::Open(e) => Some(&e.header),
            StreamEvent::Done(e) => Some(&e.header),
            StreamEvent::Match(e) => Some(&e.header),
            StreamEvent::Change(e) => Some(&e.header),
            StreamEvent::Unsupported { .. } => None,
        }
    }

    pub fn sequence(&self) -> Option<u64> {
        match self {
            StreamEvent::Unsupported { sequence, .. } => *sequence,
            other => other.header().map(|h| h.sequence),
        }
    }

    /// The order this event is about; the maker for matches
    pub fn order_id(&self) -> Option<&str> {
        match self {
            StreamEvent::Open(e) => Some(&e.order_id),
            StreamEvent::Done(e) => Some(&e.order_id),
            StreamEvent::Match(e) => Some(&e.maker_order_id),
            StreamEvent::Change(e) => Some(&e.order_id),
            StreamEvent::Unsupported { .. } => None,
        }
    }
}

impl TryFrom<FeedMessage> for StreamEvent {
    type Error = DecodeError;

    fn try_from(msg: FeedMessage) -> Result<Self, Self::Error> {
        let event = match msg.kind.as_str() {
            "open" => StreamEvent::Open(OpenEvent {
                header: msg.header()?,
                order_id: msg.require(msg.order_id.clone(), "order_id")?,
                side: msg.parsed_side()?,
                price: msg.require(msg.price, "price")?,
                remaining_size: msg.require(msg.remaining_size, "remaining_size")?,
            }),
            "done" => StreamEvent::Done(DoneEvent {
                header: msg.header()?,
                order_id: msg.require(msg.order_id.clone(), "order_id")?,
                side: msg.parsed_side()?,
                price: msg.price,
                remaining_size: msg.remaining_size,
                reason: DoneReason::parse(msg.require(msg.reason.as_deref(), "reason")?),
            }),
            "match" => StreamEvent::Match(MatchEvent {
                header: msg.header()?,
                trade_id: msg.trade_id,
                maker_order_id: msg.require(msg.maker_order_id.clone(), "maker_order_id")?,
                taker_order_id: msg.taker_order_id.clone(),
                side: msg.parsed_side()?,
                price: msg.require(msg.price, "price")?,
                size: msg.require(msg.size, "size")?,
            }),
            "change" => StreamEvent::Change(ChangeEvent {
                header: msg.header()?,
                order_id: msg.require(msg.order_id.clone(), "order_id")?,
                side: msg.parsed_side()?,
                price: msg.price,
                new_size: msg.new_size,
                old_size: msg.old_size,
            }),
            _ => StreamEvent::Unsupported {
                sequence: msg.sequence,
                kind: msg.kind.clone(),
            },
        };
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const MATCH: &str = r#"{
        "type": "match",
        "trade_id": 10,
        "sequence": 50,
        "maker_order_id": "ac928c66-ca53-498f-9c13-a110027a60e8",
        "taker_order_id": "132fb6ae-456b-4654-b4e0-d681ac05cea1",
        "time": "2014-11-07T08:19:27.028459Z",
        "product_id": "BTC-USD",
        "size": "5.23512",
        "price": "400.23",
        "side": "sell"
    }"#;

    #[test]
    fn test_decode_match() {
        let event = FeedMessage::from_json(MATCH).unwrap().decode().unwrap();
        match event {
            StreamEvent::Match(m) => {
                assert_eq!(m.header.sequence, 50);
                assert_eq!(m.header.instrument_id, "BTC-USD");
                assert_eq!(m.maker_order_id, "ac928c66-ca53-498f-9c13-a110027a60e8");
                assert_eq!(m.side, Side::Sell);
                assert_eq!(m.size, dec!(5.23512));
                assert_eq!(m.price, dec!(400.23));
                assert_eq!(m.trade_id, Some(10));
            }
            other => panic!("Wrong event type: {:?}", other),
        }
    }

    #[test]
    fn test_decode_done_without_price() {
        let json = r#"{"type":"done","sequence":7,"time":"2014-11-07T08:19:27.028459Z",
            "product_id":"BTC-USD","order_id":"d50ec984","side":"buy","reason":"filled"}"#;
        let event = FeedMessage::from_json(json).unwrap().decode().unwrap();
        match event {
            StreamEvent::Done(d) => {
                assert_eq!(d.reason, DoneReason::Filled);
                assert!(d.price.is_none());
            }
            other => panic!("Wrong event type: {:?}", other),
        }
    }

    #[test]
    fn test_timestamp_alias() {
        let json = r#"{"type":"open","sequence":3,"timestamp":"2014-11-07T08:19:27.028459Z",
            "product_id":"BTC-USD","order_id":"o1","side":"sell","price":"200.2",
            "remaining_size":"1.00"}"#;
        let event = FeedMessage::from_json(json).unwrap().decode().unwrap();
        assert_eq!(event.kind(), "open");
        assert_eq!(event.order_id(), Some("o1"));
    }

    #[test]
    fn test_malformed_timestamp_rejected() {
        let json = r#"{"type":"open","sequence":3,"time":"yesterday","product_id":"BTC-USD",
            "order_id":"o1","side":"sell","price":"200.2","remaining_size":"1.00"}"#;
        let err = FeedMessage::from_json(json).unwrap().decode().unwrap_err();
        assert_eq!(err, DecodeError::InvalidTimestamp("yesterday".to_string()));
    }

    #[test]
    fn test_missing_field_rejected() {
        let json = r#"{"type":"match","sequence":3,"time":"2014-11-07T08:19:27.028459Z",
            "product_id":"BTC-USD","side":"sell","price":"1","size":"1"}"#;
        let err = FeedMessage::from_json(json).unwrap().decode().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MissingField {
                field: "maker_order_id",
                ..
            }
        ));
    }

    #[test]
    fn test_unsupported_kind_passes_through() {
        let json = r#"{"type":"received","sequence":9,"order_id":"x"}"#;
        let event = FeedMessage::from_json(json).unwrap().decode().unwrap();
        assert_eq!(
            event,
            StreamEvent::Unsupported {
                kind: "received".to_string(),
                sequence: Some(9)
            }
        );
        assert!(event.order_id().is_none());
    }

    #[test]
    fn test_json_round_trip_keeps_decimals_exact() {
        let msg = FeedMessage::from_json(MATCH).unwrap();
        let again = FeedMessage::from_json(&msg.to_json().unwrap()).unwrap();
        assert_eq!(again.size, Some(dec!(5.23512)));
    }
}
