//! Attendance time-entry model.
//!
//! Time entries are immutable facts: a check-in or check-out at an instant.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of attendance event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Start of a worked interval.
    CheckIn,
    /// End of a worked interval.
    CheckOut,
}

/// A single check-in or check-out event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Unique identifier for the entry.
    pub id: Uuid,
    /// The employee who recorded the entry.
    pub employee_id: Uuid,
    /// The calendar day the entry belongs to.
    pub date: NaiveDate,
    /// Check-in or check-out.
    pub entry_type: EntryType,
    /// When the event happened.
    pub entry_time: NaiveDateTime,
}

impl TimeEntry {
    /// Creates an entry, deriving `date` from `entry_time`.
    pub fn new(employee_id: Uuid, entry_type: EntryType, entry_time: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            date: entry_time.date(),
            entry_type,
            entry_time,
        }
    }
}

/// Worked time for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    /// The day summarized.
    pub date: NaiveDate,
    /// Sum of all well-formed check-in/check-out pairs, in minutes.
    pub total_minutes: i64,
    /// True when some pair was malformed or an entry was left unpaired.
    pub incomplete: bool,
}
