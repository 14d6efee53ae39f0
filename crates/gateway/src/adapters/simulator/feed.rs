//! Simulator feed - emits full-channel messages
//!
//! Stamps each message with the next sequence number, the current time and
//! the instrument, then publishes it on `full.{instrument}`.

use crate::error::GatewayError;
use crate::messages::FeedMessage;
use crate::transport::Publisher;
use crate::transport::config::Subjects;
use chrono::{SecondsFormat, Utc};
use hermes_core::Side;
use log::debug;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// Gateway In for the simulator
pub struct SimulatorFeed {
    publisher: Box<dyn Publisher<FeedMessage> + Send + Sync>,
    instrument_id: String,
    subject: String,
    /// Last sequence number handed out
    sequence: AtomicU64,
}

impl SimulatorFeed {
    pub fn new(
        publisher: Box<dyn Publisher<FeedMessage> + Send + Sync>,
        instrument_id: impl Into<String>,
    ) -> Self {
        let instrument_id = instrument_id.into();
        Self {
            publisher,
            subject: Subjects::full_channel(&instrument_id),
            instrument_id,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    /// Last sequence number published
    pub fn last_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// An order now rests on the book
    pub async fn publish_open(
        &self,
        order_id: &str,
        side: Side,
        price: Decimal,
        remaining_size: Decimal,
    ) -> Result<u64, GatewayError> {
        self.publish(FeedMessage {
            kind: "open".to_string(),
            order_id: Some(order_id.to_string()),
            side: Some(side.as_str().to_string()),
            price: Some(price),
            remaining_size: Some(remaining_size),
            ..Default::default()
        })
        .await
    }

    /// An order left the book
    pub async fn publish_done(
        &self,
        order_id: &str,
        side: Side,
        price: Option<Decimal>,
        remaining_size: Option<Decimal>,
        reason: &str,
    ) -> Result<u64, GatewayError> {
        self.publish(FeedMessage {
            kind: "done".to_string(),
            order_id: Some(order_id.to_string()),
            side: Some(side.as_str().to_string()),
            price,
            remaining_size,
            reason: Some(reason.to_string()),
            ..Default::default()
        })
        .await
    }

    /// A trade; `maker_side` is the side of the resting order
    pub async fn publish_match(
        &self,
        trade_id: u64,
        maker_order_id: &str,
        taker_order_id: &str,
        maker_side: Side,
        price: Decimal,
        size: Decimal,
    ) -> Result<u64, GatewayError> {
        self.publish(FeedMessage {
            kind: "match".to_string(),
            trade_id: Some(trade_id),
            maker_order_id: Some(maker_order_id.to_string()),
            taker_order_id: Some(taker_order_id.to_string()),
            side: Some(maker_side.as_str().to_string()),
            price: Some(price),
            size: Some(size),
            ..Default::default()
        })
        .await
    }

    /// Stamp and publish a message, returning its sequence number
    pub async fn publish(&self, mut msg: FeedMessage) -> Result<u64, GatewayError> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        msg.sequence = Some(sequence);
        msg.time = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true));
        msg.product_id = Some(self.instrument_id.clone());

        debug!(
            "Publishing {} #{} on subject {}",
            msg.kind, sequence, self.subject
        );

        self.publisher.publish_to(&self.subject, &msg).await?;
        Ok(sequence)
    }
}
