//! Leave request model and its status machine.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a leave request.
///
/// ```text
/// pending ──approve──▶ approved ──cancel──▶ cancelled
///    │ └────reject───▶ rejected
///    └──────cancel───▶ cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Submitted, awaiting an admin decision.
    Pending,
    /// Approved; its days are counted in the balance's `used`.
    Approved,
    /// Rejected by an admin.
    Rejected,
    /// Withdrawn, either before or after approval.
    Cancelled,
}

impl LeaveStatus {
    /// Returns true if `next` is reachable from this status in one step.
    pub fn can_transition_to(self, next: LeaveStatus) -> bool {
        use LeaveStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Pending, Cancelled) | (Approved, Cancelled)
        )
    }
}

impl std::fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaveStatus::Pending => write!(f, "pending"),
            LeaveStatus::Approved => write!(f, "approved"),
            LeaveStatus::Rejected => write!(f, "rejected"),
            LeaveStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// An employee's request for leave against one policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique identifier for the request.
    pub id: Uuid,
    /// The requesting employee.
    pub employee_id: Uuid,
    /// The policy the leave is charged to.
    pub policy_id: Uuid,
    /// Snapshot of the policy code at submission time.
    pub leave_type: String,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Inclusive day count, fixed at submission.
    pub total_days: Decimal,
    /// Free-text justification.
    pub reason: String,
    /// Current status.
    pub status: LeaveStatus,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// The calendar year whose balance this request is charged to.
    pub fn balance_year(&self) -> i32 {
        self.start_date.year()
    }
}

/// Returns the inclusive number of days from `start` to `end`.
///
/// # Examples
///
/// ```
/// use leave_ledger::models::inclusive_days;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
/// assert_eq!(inclusive_days(start, end), Decimal::new(3, 0));
/// ```
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> Decimal {
    Decimal::from((end - start).num_days() + 1)
}
