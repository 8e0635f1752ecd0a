//! Domain error model.

use thiserror::Error;

/// Result type used across the engine.
pub type DomainResult<T> = Result<T, DomainError>;

/// Engine-level error.
///
/// Validation and transition errors are returned before any mutation happens.
/// `InsufficientStock` is usually captured per line by callers rather than
/// propagated, so one short line does not fail a whole invoice.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input failed validation (negative amount, missing party, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An outbound stock movement would take the product below zero.
    #[error("insufficient stock (available: {available}, requested: {requested})")]
    InsufficientStock { available: i64, requested: i64 },

    /// An explicit status change that is not allowed (e.g. paid -> due).
    #[error("invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: &'static str,
        to: &'static str,
    },

    /// A record that must exist was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A record with the same identity already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The persistence collaborator failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn insufficient_stock(available: i64, requested: i64) -> Self {
        Self::InsufficientStock {
            available,
            requested,
        }
    }

    /// True for errors that callers may record as a per-line warning.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientStock { .. })
    }
}
