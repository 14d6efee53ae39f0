//! Order executor and its workers
//!
//! Each queue has exactly one worker, so placements on the same side are
//! serviced one at a time in FIFO order while the buy, sell and cancel
//! queues proceed independently of each other.

use crate::config::ExecutionConfig;
use crate::error::{Error, Result};
use hermes_core::{CancelOrder, OrderId, OrderType, OwnedOrder, PlaceOrder};
use hermes_ports::{ExchangeClient, OPEN_STATUSES, PlacementReply};
use hermes_state::{QueueReceiver, RequestReceivers, SharedState};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub struct OrderExecutor {
    exchange: Arc<dyn ExchangeClient>,
    state: Arc<SharedState>,
    config: ExecutionConfig,
}

impl OrderExecutor {
    pub fn new(
        exchange: Arc<dyn ExchangeClient>,
        state: Arc<SharedState>,
        config: ExecutionConfig,
    ) -> Self {
        Self {
            exchange,
            state,
            config,
        }
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Place an order, retrying until it is acknowledged with an id or the
    /// order timeout elapses.
    ///
    /// On success the order is added to the directory and the directory is
    /// then reconciled against the exchange.
    pub async fn place_order(&self, request: &PlaceOrder) -> Result<(OrderId, PlacementReply)> {
        if request.order_type == OrderType::Limit && request.price.is_none() {
            return Err(Error::MissingPrice);
        }

        let deadline = Instant::now() + self.config.order_timeout;
        let mut attempts = 0u32;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::PlacementTimeout { attempts });
            }
            attempts += 1;

            match tokio::time::timeout(remaining, self.exchange.place_order(request)).await {
                Ok(Ok(reply)) => match reply.order_id.clone() {
                    Some(order_id) => {
                        self.record_placement(&order_id, request).await;
                        return Ok((order_id, reply));
                    }
                    None => warn!(
                        "[EXEC] {} attempt {} not acknowledged: {}",
                        request.side,
                        attempts,
                        reply.message.as_deref().unwrap_or("no order id")
                    ),
                },
                Ok(Err(e)) => warn!("[EXEC] {} attempt {} failed: {}", request.side, attempts, e),
                Err(_) => warn!("[EXEC] {} attempt {} timed out", request.side, attempts),
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::PlacementTimeout { attempts });
            }
            tokio::time::sleep(self.config.retry_backoff.min(remaining)).await;
        }
    }

    async fn record_placement(&self, order_id: &str, request: &PlaceOrder) {
        self.state.insert_owned_order(OwnedOrder::new(
            order_id,
            request.instrument_id.clone(),
            request.side,
            request.order_type,
            request.price,
            request.size,
        ));
        // Already logged; the directory stays as inserted until the next pass
        let _ = self.reconcile().await;
    }

    /// Cancel an order with a single exchange call
    pub async fn cancel_order(&self, order_id: &str) -> Result<()> {
        let canceled = self.exchange.cancel_order(order_id).await?;
        if !canceled.iter().any(|id| id == order_id) {
            return Err(Error::CancelRejected(format!("{:?}", canceled)));
        }
        let _ = self.reconcile().await;
        Ok(())
    }

    /// Replace the owned-order directory with the exchange's open orders.
    ///
    /// On failure the directory is left as it was.
    pub async fn reconcile(&self) -> Result<usize> {
        let instrument_id = self.state.instrument_id();
        match self.exchange.list_orders(instrument_id, &OPEN_STATUSES).await {
            Ok(records) => {
                let orders: Vec<OwnedOrder> =
                    records.iter().map(|r| r.to_owned_order()).collect();
                let count = orders.len();
                self.state.replace_owned_orders(orders);
                Ok(count)
            }
            Err(e) => {
                error!("[EXEC] Reconciliation failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Spawn the buy, sell, cancel and reconciliation workers
    pub fn start(self: &Arc<Self>, receivers: RequestReceivers) -> ExecutionHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let RequestReceivers { buy, sell, cancel } = receivers;

        let workers = vec![
            tokio::spawn(Arc::clone(self).placement_worker(buy, shutdown_rx.clone())),
            tokio::spawn(Arc::clone(self).placement_worker(sell, shutdown_rx.clone())),
            tokio::spawn(Arc::clone(self).cancel_worker(cancel, shutdown_rx.clone())),
            tokio::spawn(Arc::clone(self).reconcile_worker(shutdown_rx)),
        ];

        info!(
            "[EXEC] Started {} workers on {} via {}",
            workers.len(),
            self.state.instrument_id(),
            self.exchange.name()
        );

        ExecutionHandle {
            shutdown: shutdown_tx,
            workers,
        }
    }

    async fn placement_worker(
        self: Arc<Self>,
        mut queue: QueueReceiver<PlaceOrder>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let label = capitalize(queue.name());

        loop {
            let request = tokio::select! {
                _ = shutdown_signalled(&mut shutdown) => break,
                request = queue.recv() => match request {
                    Some(request) => request,
                    None => break,
                },
            };

            match self.place_order(&request).await {
                Ok((order_id, reply)) => {
                    self.state.set_status(format!(
                        "{} order {}: {}",
                        label,
                        order_id,
                        reply.status_or_pending().to_uppercase()
                    ));
                }
                Err(e) => {
                    warn!("[EXEC] {} order failed: {}", label, e);
                    self.state.set_status(format!("{} order failed: {}", label, e));
                }
            }
        }

        info!("[EXEC] {} worker stopped", label);
    }

    async fn cancel_worker(
        self: Arc<Self>,
        mut queue: QueueReceiver<CancelOrder>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            let request = tokio::select! {
                _ = shutdown_signalled(&mut shutdown) => break,
                request = queue.recv() => match request {
                    Some(request) => request,
                    None => break,
                },
            };

            self.state
                .set_status(format!("Cancelling order {}", request.order_id));
            match self.cancel_order(&request.order_id).await {
                Ok(()) => self.state.set_status("Order Canceled."),
                Err(e) => {
                    warn!("[EXEC] Cancel of {} failed: {}", request.order_id, e);
                    self.state.set_status(format!("Cancel failed: {}.", e));
                }
            }
        }

        info!("[EXEC] Cancel worker stopped");
    }

    async fn reconcile_worker(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.reconcile_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown_signalled(&mut shutdown) => break,
                _ = ticker.tick() => {
                    if let Ok(count) = self.reconcile().await {
                        info!("[EXEC] Reconciled {} open orders", count);
                    }
                }
            }
        }

        info!("[EXEC] Reconcile worker stopped");
    }
}

/// Running workers; dropping it without `close` leaves them running
pub struct ExecutionHandle {
    shutdown: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
}

impl ExecutionHandle {
    /// Signal every worker and wait for them to finish.
    ///
    /// A placement already in flight runs to completion first.
    pub async fn close(self) {
        let _ = self.shutdown.send(true);
        for worker in self.workers {
            if let Err(e) = worker.await {
                error!("[EXEC] Worker ended abnormally: {}", e);
            }
        }
        info!("[EXEC] Execution stopped");
    }

    pub fn is_running(&self) -> bool {
        self.workers.iter().any(|w| !w.is_finished())
    }
}

/// Resolves once the flag is set or the sender is gone
async fn shutdown_signalled(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("buy"), "Buy");
        assert_eq!(capitalize(""), "");
    }
}
