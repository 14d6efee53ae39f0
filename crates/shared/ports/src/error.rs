use thiserror::Error;

/// Errors surfaced by an exchange client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Rate limited by exchange")]
    RateLimited,

    #[error("Rejected by exchange: {0}")]
    Rejected(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Malformed exchange reply: {0}")]
    Malformed(String),
}

pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;
