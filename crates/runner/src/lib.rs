//! Hermes Runner - Paper-Trading Session
//!
//! Runs the order core end to end against an in-process exchange:
//!
//! - **Config**: JSON configuration with defaults and validation
//! - **Activity**: background order flow (random-walk fair value)
//! - **Operator**: scripted stand-in for the person at the terminal
//! - **Monitor**: periodic log of the shared state
//! - **Session**: wiring, startup and ordered shutdown
//!
//! ## Architecture
//!
//! ```text
//!               ┌──────────────────┐
//!               │  MarketActivity  │
//!               └────────┬─────────┘
//!                        │ add / take / cancel
//!                        ▼
//!               ┌──────────────────┐   feed    ┌──────────────────┐
//!               │ SimulatedExchange├──────────►│  LedgerService   │
//!               └────────▲─────────┘           └────────┬─────────┘
//!                        │ ExchangeClient               │
//!               ┌────────┴─────────┐           ┌────────▼─────────┐
//!               │  OrderExecutor   │◄──queues──┤   SharedState    │
//!               └──────────────────┘           └───▲──────────┬───┘
//!                                                  │          │
//!                                     ScriptedOperator     Monitor
//! ```

pub mod activity;
pub mod config;
pub mod error;
pub mod monitor;
pub mod operator;
pub mod session;

// Re-export main types
pub use activity::{Activity, MarketActivity, MarketActivityConfig};
pub use config::{ConfigError, RunnerConfig, SUPPORTED_EXCHANGES, SUPPORTED_PRODUCTS};
pub use error::{Error, Result};
pub use monitor::Monitor;
pub use operator::ScriptedOperator;
pub use session::{PaperSession, SessionReport};
