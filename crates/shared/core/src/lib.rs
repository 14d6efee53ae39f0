//! Hermes Core Domain
//!
//! Pure domain types for the Hermes trading client.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    CancelOrder, DepthLevel, OrderRequest, OrderStatus, OrderType, OwnedOrder, ParseError,
    PlaceOrder, Side, TradeEvent,
};
pub use values::{InstrumentId, OrderId, Price, Size, Timestamp};
