//! Request types for the leave ledger API.
//!
//! This module defines the JSON request bodies and query strings accepted by
//! the endpoints, and their conversions into ledger inputs.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::{NewCompOff, NewPolicy, SubmitLeave};
use crate::models::{CompOffSource, EntryType, LeaveStatus, Role};

/// Body of `POST /employees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterEmployeeRequest {
    /// The organization the employee joins.
    pub organization_id: Uuid,
    /// Display name.
    pub name: String,
    /// Permission tier; defaults to `employee`.
    #[serde(default)]
    pub role: Option<Role>,
}

/// Body of `POST /policies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePolicyRequest {
    /// The owning organization.
    pub organization_id: Uuid,
    /// Short code, unique within the organization.
    pub code: String,
    /// Human-readable name.
    pub display_name: String,
    /// Days credited as opening balance at year start.
    pub annual_quota: Decimal,
}

/// Body of `POST /leave-requests`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitLeaveRequest {
    /// The requesting employee.
    pub employee_id: Uuid,
    /// The policy to charge.
    pub policy_id: Uuid,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Free-text justification.
    pub reason: String,
}

/// Body of `POST /comp-offs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantCompOffRequest {
    /// The employee receiving the grant.
    pub employee_id: Uuid,
    /// The date the extra work was performed.
    pub work_date: NaiveDate,
    /// Hours of extra work.
    pub hours_worked: Decimal,
    /// Leave days to credit when applied.
    pub days_granted: Decimal,
    /// Why the grant was issued.
    pub source: CompOffSource,
    /// Optional note.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Body of `PUT /balances/{employee}/{policy}/{year}/adjustment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetAdjustmentRequest {
    /// The new manual adjustment; may be negative.
    pub adjustment: Decimal,
}

/// Body of `PUT /balances/{employee}/{policy}/{year}/opening`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenBalanceRequest {
    /// Days credited at the start of the year.
    pub opening_balance: Decimal,
}

/// Body of `POST /time-entries`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordTimeEntryRequest {
    /// The employee checking in or out.
    pub employee_id: Uuid,
    /// Check-in or check-out.
    pub entry_type: EntryType,
    /// When the event happened.
    pub entry_time: NaiveDateTime,
}

/// Query of `GET /employees/{employee}/leave-requests`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaveListQuery {
    /// Only return requests in this status.
    #[serde(default)]
    pub status: Option<LeaveStatus>,
}

/// Query of `GET /organizations/{organization}/policies`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyListQuery {
    /// Include deactivated policies.
    #[serde(default)]
    pub include_inactive: bool,
}

/// Query of `POST /comp-offs/{grant}/apply`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplyCompOffQuery {
    /// Credit this policy instead of the organization's comp-off policy.
    #[serde(default)]
    pub policy_id: Option<Uuid>,
}

/// Query of `GET /employees/{employee}/balances`.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceListQuery {
    /// The calendar year.
    pub year: i32,
}

/// Query of `GET /employees/{employee}/time-summary`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeSummaryQuery {
    /// First day of the range (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the range (inclusive).
    pub end_date: NaiveDate,
}

impl From<CreatePolicyRequest> for NewPolicy {
    fn from(req: CreatePolicyRequest) -> Self {
        NewPolicy {
            organization_id: req.organization_id,
            code: req.code,
            display_name: req.display_name,
            annual_quota: req.annual_quota,
        }
    }
}

impl From<SubmitLeaveRequest> for SubmitLeave {
    fn from(req: SubmitLeaveRequest) -> Self {
        SubmitLeave {
            employee_id: req.employee_id,
            policy_id: req.policy_id,
            start_date: req.start_date,
            end_date: req.end_date,
            reason: req.reason,
        }
    }
}

impl From<GrantCompOffRequest> for NewCompOff {
    fn from(req: GrantCompOffRequest) -> Self {
        NewCompOff {
            employee_id: req.employee_id,
            work_date: req.work_date,
            hours_worked: req.hours_worked,
            days_granted: req.days_granted,
            source: req.source,
            reason: req.reason,
        }
    }
}
