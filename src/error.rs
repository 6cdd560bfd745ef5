//! Error types for the leave ledger.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure a ledger operation can surface to its caller.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::LeaveStatus;

/// The main error type for the leave ledger.
///
/// Every operation returns this error type. None of the variants imply a
/// partial mutation: when an operation fails, the state it touched is unchanged.
///
/// # Example
///
/// ```
/// use leave_ledger::error::LedgerError;
///
/// let error = LedgerError::NotFound { entity: "leave request" };
/// assert_eq!(error.to_string(), "leave request not found");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Input was malformed: bad date range, missing field, negative quantity.
    #[error("Invalid '{field}': {message}")]
    Validation {
        /// The offending input field.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A leave request action was attempted from a status that does not allow it.
    #[error("Cannot {action} leave request {request_id} in status '{status}'")]
    InvalidTransition {
        /// The request the action targeted.
        request_id: Uuid,
        /// The status the request was in when the action was attempted.
        status: LeaveStatus,
        /// The attempted action (approve, reject, cancel).
        action: &'static str,
    },

    /// Approval would drive the current balance below zero.
    #[error("Insufficient balance: {available} day(s) available, {requested} requested")]
    InsufficientBalance {
        /// The current balance before the attempted deduction.
        available: Decimal,
        /// The number of days the operation tried to deduct.
        requested: Decimal,
    },

    /// A comp-off grant was applied a second time.
    #[error("Comp-off grant {grant_id} has already been applied")]
    AlreadyApplied {
        /// The grant that was already applied.
        grant_id: Uuid,
    },

    /// The referenced entity does not exist or is not visible to the caller.
    ///
    /// Carries no identifier: a missing record and another organization's
    /// record are indistinguishable.
    #[error("{entity} not found")]
    NotFound {
        /// The kind of entity that was looked up.
        entity: &'static str,
    },

    /// A configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// A configuration file could not be parsed or failed validation.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl LedgerError {
    /// Shorthand for a [`LedgerError::Validation`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        LedgerError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;
