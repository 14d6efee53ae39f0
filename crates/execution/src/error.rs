//! Execution errors

use hermes_ports::ExchangeError;
use hermes_state::QueueClosed;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Order type unknown: {0}")]
    UnknownOrderType(String),

    #[error("Invalid {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Instrument '{got}' not traded in this session ({expected})")]
    WrongInstrument { expected: String, got: String },

    #[error("Limit order requires a price")]
    MissingPrice,

    #[error("Order placement timed out after {attempts} attempts")]
    PlacementTimeout { attempts: u32 },

    #[error("Unable to cancel order: {0}")]
    CancelRejected(String),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    QueueClosed(#[from] QueueClosed),
}

pub type Result<T> = std::result::Result<T, Error>;
