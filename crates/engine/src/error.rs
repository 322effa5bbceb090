//! The module contains the errors the engine can return.
//!
//! The main ones are:
//!
//! - [`Unauthenticated`] returned when an operation needs a session and none is open.
//! - [`Forbidden`] returned when the session role lacks the required capability.
//! - [`KeyNotFound`] returned when an item is not found.
//! - [`InvalidTransition`] returned when a transaction already left `PENDING`.
//!
//!  [`Unauthenticated`]: EngineError::Unauthenticated
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidTransition`]: EngineError::InvalidTransition
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("No active session")]
    Unauthenticated,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error("Invalid member: {0}")]
    InvalidMember(String),
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
    #[error("Invalid role: {0}")]
    InvalidRole(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}
