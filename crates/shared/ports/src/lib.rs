//! Hermes Ports
//!
//! Port definitions (traits) for the Hermes trading client.
//! These define the boundaries between the order core and its collaborators:
//! the exchange client and the externally maintained price-level book.

mod book;
mod error;
mod exchange;

pub use book::PriceLevelBook;
pub use error::{ExchangeError, ExchangeResult};
pub use exchange::{AccountBalance, ExchangeClient, OPEN_STATUSES, OrderRecord, PlacementReply};
