//! The module contains the errors the engine can return.
//!
//! The variants fall into four families, matching how callers should react:
//!
//! - validation: [`InstallmentSumMismatch`], [`InstallmentFieldInvalid`],
//!   [`CurrencyNotInPrincipal`], [`NonPositiveAmount`], [`InvalidAmount`],
//!   [`DuplicateCurrency`] — bad input, never retried
//! - state: [`IllegalTransition`], [`ObligationClosed`] — lifecycle violation
//! - lookup: [`KeyNotFound`]
//! - conflict: [`StaleVersion`] — re-fetch and reapply
//!
//! [`InstallmentSumMismatch`]: EngineError::InstallmentSumMismatch
//! [`InstallmentFieldInvalid`]: EngineError::InstallmentFieldInvalid
//! [`CurrencyNotInPrincipal`]: EngineError::CurrencyNotInPrincipal
//! [`NonPositiveAmount`]: EngineError::NonPositiveAmount
//! [`InvalidAmount`]: EngineError::InvalidAmount
//! [`DuplicateCurrency`]: EngineError::DuplicateCurrency
//! [`IllegalTransition`]: EngineError::IllegalTransition
//! [`ObligationClosed`]: EngineError::ObligationClosed
//! [`KeyNotFound`]: EngineError::KeyNotFound
//! [`StaleVersion`]: EngineError::StaleVersion
use thiserror::Error;

use crate::{Currency, Money, lifecycle::Status};

/// Engine custom errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error("installments for {currency} sum to {actual}, principal is {expected}")]
    InstallmentSumMismatch {
        currency: Currency,
        expected: Money,
        actual: Money,
    },
    #[error("invalid installment {field}: {reason}")]
    InstallmentFieldInvalid {
        field: &'static str,
        reason: String,
    },
    #[error("currency {0} is not part of the obligation's principals")]
    CurrencyNotInPrincipal(Currency),
    #[error("amount must be > 0: {0}")]
    NonPositiveAmount(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("principal for {0} already present")]
    DuplicateCurrency(Currency),
    #[error("illegal transition: {from} -> {to}")]
    IllegalTransition { from: Status, to: Status },
    #[error("obligation is closed: {0}")]
    ObligationClosed(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("stale version: expected {expected}, found {actual}")]
    StaleVersion { expected: u64, actual: u64 },
}
