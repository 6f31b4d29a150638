//! Ledger domain errors

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or missing input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced entity does not exist or is inactive
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Operation blocked by dependent data or duplicates
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Mutation not allowed in the entity's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Double-entry sum mismatch; a strategy bug, never user-correctable
    #[error("Unbalanced entry: debits={debits}, credits={credits}")]
    Unbalanced { debits: Decimal, credits: Decimal },

    /// The backing store failed to commit a unit of work
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        LedgerError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        LedgerError::Conflict(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        LedgerError::InvalidState(message.into())
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound { .. })
    }
}

impl From<core_kernel::MoneyError> for LedgerError {
    fn from(err: core_kernel::MoneyError) -> Self {
        LedgerError::Validation(err.to_string())
    }
}
