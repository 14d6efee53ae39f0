//! Request queues
//!
//! Each queue is an unbounded tokio mpsc channel. Every enqueued request is a
//! message the consuming worker will receive, so a burst of requests arriving
//! before the worker wakes cannot strand any of them.

use hermes_core::{CancelOrder, PlaceOrder};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::mpsc;

/// The consuming worker has shut down
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{queue} queue closed")]
pub struct QueueClosed {
    pub queue: &'static str,
}

/// Producer side of one request queue
#[derive(Debug)]
pub struct RequestQueue<T> {
    name: &'static str,
    tx: mpsc::UnboundedSender<T>,
    pending: Arc<AtomicUsize>,
}

impl<T> Clone for RequestQueue<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            tx: self.tx.clone(),
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<T> RequestQueue<T> {
    /// Append a request; FIFO with respect to other pushes on this queue
    pub fn push(&self, request: T) -> Result<(), QueueClosed> {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.tx.send(request).map_err(|_| {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            QueueClosed { queue: self.name }
        })
    }

    /// Requests enqueued but not yet taken by the worker
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side of one request queue, owned by exactly one worker
#[derive(Debug)]
pub struct QueueReceiver<T> {
    name: &'static str,
    rx: mpsc::UnboundedReceiver<T>,
    pending: Arc<AtomicUsize>,
}

impl<T> QueueReceiver<T> {
    /// Wait for the next request. Returns None once every producer is gone.
    pub async fn recv(&mut self) -> Option<T> {
        let request = self.rx.recv().await?;
        self.pending.fetch_sub(1, Ordering::SeqCst);
        Some(request)
    }

    /// Take a request without waiting
    pub fn try_recv(&mut self) -> Option<T> {
        let request = self.rx.try_recv().ok()?;
        self.pending.fetch_sub(1, Ordering::SeqCst);
        Some(request)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Create a named request queue
pub fn request_queue<T>(name: &'static str) -> (RequestQueue<T>, QueueReceiver<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let pending = Arc::new(AtomicUsize::new(0));
    (
        RequestQueue {
            name,
            tx,
            pending: Arc::clone(&pending),
        },
        QueueReceiver { name, rx, pending },
    )
}

/// Producer handles for the three queues, held by the store
#[derive(Debug, Clone)]
pub struct RequestQueues {
    pub buy: RequestQueue<PlaceOrder>,
    pub sell: RequestQueue<PlaceOrder>,
    pub cancel: RequestQueue<CancelOrder>,
}

/// Consumer handles, handed once to the execution subsystem
#[derive(Debug)]
pub struct RequestReceivers {
    pub buy: QueueReceiver<PlaceOrder>,
    pub sell: QueueReceiver<PlaceOrder>,
    pub cancel: QueueReceiver<CancelOrder>,
}

impl RequestQueues {
    pub fn new() -> (Self, RequestReceivers) {
        let (buy, buy_rx) = request_queue("buy");
        let (sell, sell_rx) = request_queue("sell");
        let (cancel, cancel_rx) = request_queue("cancel");
        (
            Self { buy, sell, cancel },
            RequestReceivers {
                buy: buy_rx,
                sell: sell_rx,
                cancel: cancel_rx,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_burst_before_wakeup_is_not_lost() {
        let (queue, mut rx) = request_queue::<u32>("buy");

        // Two pushes before the consumer ever runs
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        assert_eq!(queue.pending(), 2);

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn test_push_after_close_fails() {
        let (queue, rx) = request_queue::<u32>("cancel");
        drop(rx);

        let err = queue.push(7).unwrap_err();
        assert_eq!(err.queue, "cancel");
        assert_eq!(queue.pending(), 0);
        assert!(queue.is_closed());
    }

    #[tokio::test]
    async fn test_recv_ends_when_producers_dropped() {
        let (queue, mut rx) = request_queue::<u32>("sell");
        queue.push(5).unwrap();
        drop(queue);

        assert_eq!(rx.recv().await, Some(5));
        assert_eq!(rx.recv().await, None);
    }
}
