//! Paper-trading session
//!
//! Wires every component against the in-process simulated exchange:
//!
//! ```text
//!  MarketActivity ──► SimulatedExchange ──► full.{product} ──► LedgerService
//!                          ▲                                        │
//!                          │ ExchangeClient                         ▼
//!                     OrderExecutor ◄── queues ◄── SharedState ◄────┘
//!                                                    ▲      │
//!                          ScriptedOperator ─────────┘      └──► Monitor
//! ```
//!
//! Shutdown order: stop the feed producers, then the workers, then the
//! ingestion task so its final depth pass sees every message.

use crate::activity::MarketActivity;
use crate::config::RunnerConfig;
use crate::error::{Error, Result};
use crate::monitor::Monitor;
use crate::operator::ScriptedOperator;
use hermes_execution::{OrderExecutor, RequestIssuer};
use hermes_gateway::{
    ChannelPublisher, ChannelSubscriber, FeedMessage, SimulatedExchange, SimulatorFeed,
};
use hermes_ledger::{LedgerService, LedgerStats, OrderLedger};
use hermes_ports::ExchangeClient;
use hermes_state::{MarketSnapshot, RequestReceivers, SharedState};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const FEED_CAPACITY: usize = 4096;
const SEED_LEVELS: u32 = 5;

/// Summary produced when a session ends
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub ledger: LedgerStats,
    pub activity_ticks: u64,
    pub operator_requests: usize,
    pub snapshot: MarketSnapshot,
}

pub struct PaperSession {
    config: RunnerConfig,
    state: Arc<SharedState>,
    receivers: RequestReceivers,
    exchange: Arc<SimulatedExchange>,
    subscriber: ChannelSubscriber<FeedMessage>,
}

impl PaperSession {
    pub fn new(config: RunnerConfig) -> Result<Self> {
        config.validate()?;

        let (state, receivers) = SharedState::new(config.store_config());
        let (publisher, subscriber) = ChannelPublisher::<FeedMessage>::pair(FEED_CAPACITY);
        let feed = SimulatorFeed::new(Box::new(publisher), config.exchange.product.clone());
        let exchange = SimulatedExchange::new(config.exchange_config(), feed);

        Ok(Self {
            config,
            state: Arc::new(state),
            receivers,
            exchange: Arc::new(exchange),
            subscriber,
        })
    }

    pub fn state(&self) -> Arc<SharedState> {
        Arc::clone(&self.state)
    }

    pub fn exchange(&self) -> Arc<SimulatedExchange> {
        Arc::clone(&self.exchange)
    }

    pub fn issuer(&self) -> RequestIssuer {
        RequestIssuer::new(self.state())
    }

    /// Operator script sized from the configuration
    pub fn scripted_operator(&self) -> ScriptedOperator {
        ScriptedOperator::new(
            self.issuer(),
            self.state(),
            self.config.simulation.max_order_size,
            Duration::from_millis(self.config.execution.retry_backoff_ms.max(500)),
        )
    }

    /// Run for the configured duration or until Ctrl-C
    pub async fn run(self, operator: Option<ScriptedOperator>) -> Result<SessionReport> {
        let duration = Duration::from_secs(self.config.simulation.duration_secs);
        self.run_for(duration, operator).await
    }

    pub async fn run_for(
        self,
        duration: Duration,
        operator: Option<ScriptedOperator>,
    ) -> Result<SessionReport> {
        let PaperSession {
            config,
            state,
            receivers,
            exchange,
            subscriber,
        } = self;

        info!(
            "[SESSION] Paper session on {} {} for {:?}",
            config.exchange.name, config.exchange.product, duration
        );
        for balance in exchange.list_account_balances().await? {
            info!(
                "[SESSION] Balance {}: {} ({} available)",
                balance.currency, balance.balance, balance.available
            );
        }

        let mut activity = MarketActivity::new(config.activity_config());
        activity.seed_book(&exchange, SEED_LEVELS).await?;

        let (ingest_tx, ingest_rx) = watch::channel(false);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // === Ingestion ===
        let service = LedgerService::new(
            OrderLedger::new(Arc::clone(&state)),
            subscriber,
            config.ledger_config(),
        );
        let ledger_task = tokio::spawn(service.run(ingest_rx));

        // === Execution ===
        let exchange_client: Arc<dyn ExchangeClient> = exchange.clone();
        let executor = Arc::new(OrderExecutor::new(
            exchange_client,
            Arc::clone(&state),
            config.execution_config(),
        ));
        let execution = executor.start(receivers);

        // === Producers and display ===
        let activity_task = tokio::spawn(activity.run(
            Arc::clone(&exchange),
            Duration::from_millis(config.simulation.activity_interval_ms),
            shutdown_rx.clone(),
        ));
        let monitor_task = tokio::spawn(
            Monitor::new(
                Arc::clone(&state),
                Duration::from_millis(config.simulation.monitor_interval_ms),
                Duration::from_secs(config.simulation.trade_window_secs),
            )
            .run(shutdown_rx.clone()),
        );
        let operator_task: Option<JoinHandle<usize>> =
            operator.map(|op| tokio::spawn(op.run(shutdown_rx.clone())));

        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!("[SESSION] Ctrl-C handler failed: {}", e);
                }
                info!("[SESSION] Interrupted");
            }
        }

        // === Shutdown ===
        let _ = shutdown_tx.send(true);
        let activity_ticks = join(activity_task).await?;
        let operator_requests = match operator_task {
            Some(task) => join(task).await?,
            None => 0,
        };
        execution.close().await;
        join(monitor_task).await?;

        let _ = ingest_tx.send(true);
        let ledger = join(ledger_task).await?;

        let snapshot = state.snapshot();
        info!("[SESSION] Finished: {}", crate::monitor::render(&snapshot));

        Ok(SessionReport {
            ledger,
            activity_ticks,
            operator_requests,
            snapshot,
        })
    }
}

async fn join<T>(task: JoinHandle<T>) -> Result<T> {
    task.await.map_err(|e| Error::Task(e.to_string()))
}
