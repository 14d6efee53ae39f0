//! Scripted operator
//!
//! Plays the part of the person at the terminal: reads quotes from the store
//! and issues requests through the `RequestIssuer`, exactly as the display
//! loop would. The script rests a bid and an ask at the touch, sends a small
//! market buy, then cancels whatever is still open.

use hermes_core::Side;
use hermes_execution::RequestIssuer;
use hermes_state::SharedState;
use log::{info, warn};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub struct ScriptedOperator {
    issuer: RequestIssuer,
    state: Arc<SharedState>,
    order_size: Decimal,
    step: Duration,
}

impl ScriptedOperator {
    pub fn new(
        issuer: RequestIssuer,
        state: Arc<SharedState>,
        order_size: Decimal,
        step: Duration,
    ) -> Self {
        Self {
            issuer,
            state,
            order_size,
            step,
        }
    }

    /// Run the script; returns how many requests were accepted for queueing
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> usize {
        let instrument = self.state.instrument_id().to_string();
        let size = self.order_size.to_string();
        let mut issued = 0;

        if !self.pause(&mut shutdown, 1).await {
            return issued;
        }
        match self.state.best_bid() {
            Some(bid) => {
                if self
                    .issuer
                    .create_buy_order(&size, &bid.to_string(), &instrument, "limit")
                    .is_ok()
                {
                    issued += 1;
                }
            }
            None => warn!("[OPERATOR] No bid yet, skipping resting buy"),
        }

        if !self.pause(&mut shutdown, 1).await {
            return issued;
        }
        let best_ask = self
            .state
            .depth(Side::Sell)
            .first()
            .filter(|level| !level.is_empty())
            .map(|level| level.price);
        match best_ask {
            Some(ask) => {
                if self
                    .issuer
                    .create_sell_order(&size, &ask.to_string(), &instrument, "limit")
                    .is_ok()
                {
                    issued += 1;
                }
            }
            None => warn!("[OPERATOR] No ask yet, skipping resting sell"),
        }

        if !self.pause(&mut shutdown, 1).await {
            return issued;
        }
        if self
            .issuer
            .create_buy_order(&size, "", &instrument, "market")
            .is_ok()
        {
            issued += 1;
        }

        if !self.pause(&mut shutdown, 2).await {
            return issued;
        }
        for order in self.state.open_orders() {
            if self.issuer.create_cancel_order(&order.id).is_ok() {
                issued += 1;
            }
        }

        info!("[OPERATOR] Script finished, {} requests issued", issued);
        issued
    }

    /// Wait `steps` steps; false if shutdown arrived first
    async fn pause(&self, shutdown: &mut watch::Receiver<bool>, steps: u32) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.step * steps) => !*shutdown.borrow(),
            changed = shutdown.changed() => changed.is_ok() && !*shutdown.borrow(),
        }
    }
}
