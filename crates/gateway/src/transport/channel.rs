//! Tokio channel-based transport for single-process mode
//!
//! Uses broadcast channels for pub/sub semantics within a single process.
//! No serialization overhead - messages are passed directly.

use crate::error::TransportError;
use crate::transport::{Publisher, Subscriber};
use async_trait::async_trait;
use log::warn;
use tokio::sync::broadcast;

/// Channel-based publisher using broadcast
#[derive(Clone)]
pub struct ChannelPublisher<M> {
    tx: broadcast::Sender<M>,
}

impl<M: Clone> ChannelPublisher<M> {
    /// Create a new publisher with the given broadcast sender
    pub fn new(tx: broadcast::Sender<M>) -> Self {
        Self { tx }
    }

    /// Create a publisher/subscriber pair with given capacity
    pub fn pair(capacity: usize) -> (Self, ChannelSubscriber<M>) {
        let (tx, rx) = broadcast::channel(capacity);
        (Self { tx }, ChannelSubscriber { rx, lagged: 0 })
    }

    /// Get another subscriber for this publisher
    pub fn subscribe(&self) -> ChannelSubscriber<M> {
        ChannelSubscriber {
            rx: self.tx.subscribe(),
            lagged: 0,
        }
    }
}

#[async_trait]
impl<M> Publisher<M> for ChannelPublisher<M>
where
    M: Clone + Send + Sync + 'static,
{
    async fn publish(&self, msg: &M) -> Result<(), TransportError> {
        // No subscriber yet is not an error for a feed
        let _ = self.tx.send(msg.clone());
        Ok(())
    }
}

/// Channel-based subscriber using broadcast receiver.
///
/// Dropping the last publisher closes the subscription, which is how the
/// feed signals end of session.
pub struct ChannelSubscriber<M> {
    rx: broadcast::Receiver<M>,
    lagged: u64,
}

impl<M: Clone> ChannelSubscriber<M> {
    /// Create a new subscriber from a broadcast receiver
    pub fn new(rx: broadcast::Receiver<M>) -> Self {
        Self { rx, lagged: 0 }
    }

    /// Messages skipped because this subscriber fell behind
    pub fn lagged(&self) -> u64 {
        self.lagged
    }
}

#[async_trait]
impl<M> Subscriber<M> for ChannelSubscriber<M>
where
    M: Clone + Send + 'static,
{
    async fn next(&mut self) -> Result<M, TransportError> {
        loop {
            match self.rx.recv().await {
                Ok(msg) => return Ok(msg),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Skip lagged messages and continue
                    warn!("Subscriber lagged, skipped {} messages", n);
                    self.lagged += n;
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(TransportError::ChannelClosed);
                }
            }
        }
    }

    fn try_next(&mut self) -> Result<Option<M>, TransportError> {
        match self.rx.try_recv() {
            Ok(msg) => Ok(Some(msg)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                // Return None on lag, caller can retry
                self.lagged += n;
                Ok(None)
            }
            Err(broadcast::error::TryRecvError::Closed) => Err(TransportError::ChannelClosed),
        }
    }
}
