//! Hermes Shared State Store
//!
//! The only channel between the market-data path and the execution path.
//!
//! ## Atomicity contract
//!
//! Every field is individually atomic; no cross-field consistency is offered.
//! Readers may observe a best bid from one message and a depth table from an
//! earlier cadence, and every consumer tolerates that.
//!
//! | Field               | Guard                          |
//! |---------------------|--------------------------------|
//! | best bid, last match| `parking_lot::RwLock`          |
//! | depth tables        | `parking_lot::RwLock` per side |
//! | owned orders        | `DashMap` (per-slot)           |
//! | trade log           | `parking_lot::Mutex`           |
//! | status message      | `parking_lot::RwLock`          |
//! | request queues      | tokio mpsc channels            |
//!
//! ```text
//! Feed ──► Ledger ──► ┌──────────────┐ ◄── Execution workers
//!                     │ SharedState  │
//! Display ◄────────── └──────┬───────┘
//!    │                       │ buy / sell / cancel queues
//!    └── RequestQueues ──────┘
//! ```

pub mod queue;
pub mod store;

pub use queue::{QueueClosed, QueueReceiver, RequestQueue, RequestQueues, RequestReceivers, request_queue};
pub use store::{MarketSnapshot, SharedState, StatusMessage, StoreConfig};
