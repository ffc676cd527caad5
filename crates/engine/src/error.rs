//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidInput`] thrown when a caller passes blank rule text or a blank
//!   context tag. Rejected before any parsing attempt.
//! - [`MalformedRule`] thrown when a stored rule has no recognized comparison
//!   operator, a non-numeric threshold or an unparsable left expression.
//! - [`Evaluation`] thrown when the arithmetic of a rule fails (division by
//!   zero).
//! - [`LimitExceeded`] thrown when a roster change would break a season cap.
//! - [`KeyNotFound`] thrown when an item are not found.
//!
//! Rule errors are permanent: retrying without fixing the stored rule will
//! reproduce them.
//!
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`MalformedRule`]: EngineError::MalformedRule
//!  [`Evaluation`]: EngineError::Evaluation
//!  [`LimitExceeded`]: EngineError::LimitExceeded
//!  [`KeyNotFound`]: EngineError::KeyNotFound
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Malformed rule: {0}")]
    MalformedRule(String),
    #[error("Evaluation error: {0}")]
    Evaluation(String),
    #[error("Maximum {limit} player limit reached. Current: {current}, Max allowed: {max}")]
    LimitExceeded {
        limit: String,
        current: i32,
        max: i32,
    },
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::MalformedRule(a), Self::MalformedRule(b)) => a == b,
            (Self::Evaluation(a), Self::Evaluation(b)) => a == b,
            (
                Self::LimitExceeded {
                    limit: a,
                    current: ca,
                    max: ma,
                },
                Self::LimitExceeded {
                    limit: b,
                    current: cb,
                    max: mb,
                },
            ) => a == b && ca == cb && ma == mb,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
