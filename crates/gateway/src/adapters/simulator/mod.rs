//! In-process simulated exchange
//!
//! Stands in for the real venue: a small order book that accepts the
//! operator's orders over the `ExchangeClient` port and reports every book
//! change on the full-channel feed.

mod exchange;
mod feed;

pub use exchange::{SimulatedExchange, SimulatedExchangeConfig};
pub use feed::SimulatorFeed;
