//! Runner errors

use crate::config::ConfigError;
use hermes_gateway::GatewayError;
use hermes_ports::ExchangeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error("Session task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, Error>;
