//! HTTP API module for the leave ledger.
//!
//! This module provides the REST endpoints for leave policies, balances,
//! leave requests, comp-off grants and attendance summaries.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    CreatePolicyRequest, GrantCompOffRequest, RecordTimeEntryRequest, RegisterEmployeeRequest,
    SubmitLeaveRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
