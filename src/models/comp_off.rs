//! Compensatory time-off grant model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a comp-off grant was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompOffSource {
    /// Hours worked beyond the regular schedule.
    Overtime,
    /// Work performed on a holiday.
    HolidayWork,
    /// Granted directly by an admin.
    Manual,
}

/// A record of compensatory leave earned by an employee.
///
/// Created unapplied. Applying it credits the employee's balance once; the
/// transition is one-way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompOffGrant {
    /// Unique identifier for the grant.
    pub id: Uuid,
    /// The employee receiving the grant.
    pub employee_id: Uuid,
    /// The date the extra work was performed.
    pub work_date: NaiveDate,
    /// Hours of extra work.
    pub hours_worked: Decimal,
    /// Leave days credited when applied.
    pub days_granted: Decimal,
    /// Why the grant was issued.
    pub source: CompOffSource,
    /// Optional note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Whether the grant has been credited to a balance.
    pub is_applied: bool,
    /// When the grant was recorded.
    pub created_at: DateTime<Utc>,
}
