//! Error types for the gateway crate

use thiserror::Error;

/// Transport-level errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Channel closed")]
    ChannelClosed,
}

/// A feed message that cannot be turned into a stream event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Invalid JSON: {0}")]
    Json(String),

    #[error("Missing field `{field}` in {kind} message")]
    MissingField {
        kind: String,
        field: &'static str,
    },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid side: {0}")]
    InvalidSide(String),
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        DecodeError::Json(e.to_string())
    }
}

/// Gateway-level errors (adapter operations)
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}
