//! Request/Response data transfer objects

pub mod accounts;
pub mod entries;
pub mod operations;

use rust_decimal::Decimal;
use serde::Serialize;
use validator::ValidationError;

/// Success envelope, per the API contract
#[derive(Debug, Serialize)]
pub struct ApiEnvelope<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiEnvelope<T> {
    /// Wraps a payload in the success envelope
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Validator hook for amounts that must be strictly positive
pub(crate) fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("amount_not_positive"))
    }
}
