//! Response types for the leave ledger API.
//!
//! This module defines the response bodies, the error response structure
//! and the mapping from [`LedgerError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LedgerError;
use crate::models::{BalanceView, CompOffGrant, DaySummary, LeaveRequest};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<LedgerError> for ApiErrorResponse {
    fn from(error: LedgerError) -> Self {
        let message = error.to_string();
        match error {
            LedgerError::Validation { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::validation_error(message),
            },
            LedgerError::InvalidTransition { status, .. } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "INVALID_TRANSITION",
                    message,
                    format!("The request is '{}' and cannot move to the requested status", status),
                ),
            },
            LedgerError::InsufficientBalance { .. } => ApiErrorResponse {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::with_details(
                    "INSUFFICIENT_BALANCE",
                    message,
                    "The request remains pending",
                ),
            },
            LedgerError::AlreadyApplied { .. } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::new("ALREADY_APPLIED", message),
            },
            LedgerError::NotFound { .. } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new("NOT_FOUND", message),
            },
            LedgerError::ConfigNotFound { .. } | LedgerError::ConfigParseError { .. } => {
                ApiErrorResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
                }
            }
        }
    }
}

/// A leave request together with the balance it is charged to.
///
/// The balance is shown for information only; it is not reserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequestResponse {
    /// The request.
    #[serde(flatten)]
    pub request: LeaveRequest,
    /// Current balance of the charged policy and year.
    pub available_balance: Decimal,
}

/// Result of applying a comp-off grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompOffAppliedResponse {
    /// The grant, now applied.
    pub grant: CompOffGrant,
    /// The credited balance.
    pub balance: BalanceView,
}

/// Aggregated attendance for a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSummaryResponse {
    /// The employee summarized.
    pub employee_id: Uuid,
    /// First day of the range (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the range (inclusive).
    pub end_date: NaiveDate,
    /// Worked minutes over the whole range.
    pub total_minutes: i64,
    /// Per-day totals, newest first.
    pub days: Vec<DaySummary>,
}
