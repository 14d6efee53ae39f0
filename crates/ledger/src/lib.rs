//! Hermes Ledger
//!
//! Consumes the exchange's full-channel feed and keeps the shared state store
//! current:
//! - `LocalOrderBook` - order-level replica of the book, aggregated per price
//! - `OrderLedger` - trade log, last match price and the operator's own
//!   order lifecycle
//! - `LedgerService` - the ingestion task that drives both
//!
//! ## Flow
//!
//! ```text
//! full.{instrument} ──► decode ──► LocalOrderBook.apply
//!                                        │
//!                         ┌──────────────┼──────────────┐
//!                         ▼              ▼              ▼
//!                     on_trade   on_owned_order_event  best_bid
//!                         │              │              │
//!                         └──────► SharedState ◄────────┘
//!                                        ▲
//!                    every 500ms: recompute_depth(book)
//! ```

pub mod book;
pub mod ledger;
pub mod service;

pub use book::LocalOrderBook;
pub use ledger::OrderLedger;
pub use service::{LedgerConfig, LedgerService, LedgerStats};
