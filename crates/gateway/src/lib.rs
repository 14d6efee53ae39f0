//! Hermes Gateway
//!
//! Gateway layer for the Hermes trading client. Provides:
//! - Wire decoding of the exchange's full-channel feed into typed stream events
//! - Transport abstraction (tokio channels, with traits for future transports)
//! - Exchange adapters (in-process simulated exchange)
//!
//! ## Architecture
//!
//! ```text
//! Exchange (websocket feed, REST)      SimulatedExchange
//!         │                                   │
//!    ┌────▼────┐                              │
//!    │ Gateway │◄─────── FeedMessage ─────────┘
//!    │ decode  │
//!    └────┬────┘
//!         │ Channels:
//!         │ full.{instrument}
//!    ┌────▼────┐
//!    │ Ledger  │
//!    └─────────┘
//! ```
//!
//! ## Transport
//!
//! Currently uses tokio channels for single-process operation.
//! The `Publisher`/`Subscriber` traits allow plugging in a websocket
//! transport when needed.

pub mod adapters;
pub mod error;
pub mod messages;
pub mod transport;

// Re-export commonly used types
pub use adapters::{SimulatedExchange, SimulatedExchangeConfig, SimulatorFeed};
pub use error::{DecodeError, GatewayError, TransportError};
pub use messages::feed::{
    ChangeEvent, DoneEvent, DoneReason, EventHeader, FeedMessage, MatchEvent, OpenEvent,
    StreamEvent,
};
pub use transport::{
    Publisher, Subjects, Subscriber,
    channel::{ChannelPublisher, ChannelSubscriber},
};
