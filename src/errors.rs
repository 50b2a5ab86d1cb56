use thiserror::Error;

use crate::decimal::{Money, Rate};
use crate::types::OfferStatus;

#[derive(Error, Debug)]
pub enum LendingError {
    #[error("invalid loan terms: {message}")]
    InvalidLoanTerms {
        message: String,
    },

    #[error("invalid offer transition: {from} -> {to}")]
    InvalidTransition {
        from: OfferStatus,
        to: OfferStatus,
    },

    #[error("offer cannot be edited: effective status is {status}")]
    OfferNotEditable {
        status: OfferStatus,
    },

    #[error("unknown {kind} status: {value}")]
    UnknownStatus {
        kind: &'static str,
        value: String,
    },

    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("amount out of range: {amount} not within {min}..={max}")]
    AmountOutOfRange {
        amount: Money,
        min: Money,
        max: Money,
    },

    #[error("interest rate out of range: {rate} not within {min}..={max}")]
    RateOutOfRange {
        rate: Rate,
        min: Rate,
        max: Rate,
    },

    #[error("application incomplete: missing {field}")]
    IncompleteApplication {
        field: &'static str,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LendingError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        LendingError::Validation {
            field,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LendingError>;
