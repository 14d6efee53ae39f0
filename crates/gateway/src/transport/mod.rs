//! Transport abstraction layer
//!
//! Provides unified traits for message passing using tokio channels.
//! The trait-based design allows swapping in a websocket transport later.

pub mod channel;
pub mod config;

pub use config::Subjects;

use crate::error::TransportError;
use async_trait::async_trait;

/// Publisher - sends messages to a subject/channel
#[async_trait]
pub trait Publisher<M>: Send + Sync
where
    M: Send + Sync,
{
    /// Publish a message
    async fn publish(&self, msg: &M) -> Result<(), TransportError>;

    /// Publish a message to a specific subject
    async fn publish_to(&self, subject: &str, msg: &M) -> Result<(), TransportError> {
        // Default implementation ignores subject and uses configured subject
        let _ = subject;
        self.publish(msg).await
    }
}

/// Subscriber - receives messages from a subject
#[async_trait]
pub trait Subscriber<M>: Send
where
    M: Send,
{
    /// Wait for the next message
    async fn next(&mut self) -> Result<M, TransportError>;

    /// Try to receive without blocking (returns None if no message available)
    fn try_next(&mut self) -> Result<Option<M>, TransportError>;
}
