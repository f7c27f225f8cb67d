// service/errors.rs

use crate::exchange::ExchangeError;
use thiserror::Error;

/// Service layer error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Order for {symbol} rejected: {}", errors.join("; "))]
    Rejected { symbol: String, errors: Vec<String> },

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
