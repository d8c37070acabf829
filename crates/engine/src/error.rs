//! The module contains the error the engine can throw.
//!
//! The ledger specific errors are:
//!
//! - [`InvalidAmount`] thrown when a monetary amount is zero, negative or
//!   overflows.
//! - [`ExceedsBalance`] thrown when a payment is larger than the remaining
//!   fee of a [`FeeAccount`].
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`ExceedsBalance`]: EngineError::ExceedsBalance
//!  [`FeeAccount`]: super::fees::FeeAccount
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Payment amount exceeds remaining fee: {0}")]
    ExceedsBalance(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::ExceedsBalance(a), Self::ExceedsBalance(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
