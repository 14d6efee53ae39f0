use thiserror::Error;

/// Error parsing a domain enum from its exchange string form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown side: {0}")]
    UnknownSide(String),

    #[error("Order type unknown: {0}")]
    UnknownOrderType(String),

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),
}
