//! Hermes Execution
//!
//! Turns operator requests into exchange calls:
//! - **Workers**: one task per queue (buy, sell, cancel) plus a periodic
//!   reconciliation task
//! - **Placement**: retried on rejection or transport error until the order
//!   timeout elapses
//! - **Cancel**: a single call, successful only if the exchange echoes the id
//! - **Reconciliation**: replaces the owned-order directory with the
//!   exchange's list of open orders
//!
//! ## Architecture
//!
//! ```text
//! RequestIssuer ──► buy / sell / cancel queues (SharedState)
//!                          │       │       │
//!                   ┌──────▼──┐ ┌──▼────┐ ┌▼───────┐ ┌───────────┐
//!                   │  buy    │ │ sell  │ │ cancel │ │ reconcile │
//!                   │ worker  │ │worker │ │ worker │ │  (10s)    │
//!                   └────┬────┘ └──┬────┘ └───┬────┘ └─────┬─────┘
//!                        └─────────┴──────────┴────────────┘
//!                                       │
//!                                ExchangeClient
//!                                       │
//!            status message + owned orders ──► SharedState
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod issuer;

pub use config::ExecutionConfig;
pub use error::{Error, Result};
pub use executor::{ExecutionHandle, OrderExecutor};
pub use issuer::RequestIssuer;
