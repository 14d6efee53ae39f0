//! Exchange adapters
//!
//! Adapters sit on both sides of the exchange boundary: the feed side emits
//! full-channel messages (Gateway In), the order side implements the
//! `ExchangeClient` port (Gateway Out).

pub mod simulator;

pub use simulator::{SimulatedExchange, SimulatedExchangeConfig, SimulatorFeed};
