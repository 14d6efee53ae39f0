//! Wire message types for gateway communication
//!
//! These types mirror the exchange's full-channel JSON and convert it into
//! the typed events the ledger consumes.

pub mod feed;

pub use feed::{FeedMessage, StreamEvent};
