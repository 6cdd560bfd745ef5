//! Append-only attendance log.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::attendance::{DaySummaries, aggregate};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{EntryType, TimeEntry};

use super::directory::EmployeeDirectory;

/// Check-in/check-out events per employee. Entries are never updated or removed.
#[derive(Debug)]
pub struct TimeEntryLog {
    directory: Arc<EmployeeDirectory>,
    entries: DashMap<Uuid, Vec<TimeEntry>>,
}

impl TimeEntryLog {
    /// Creates an empty log.
    pub fn new(directory: Arc<EmployeeDirectory>) -> Self {
        Self {
            directory,
            entries: DashMap::new(),
        }
    }

    /// Appends an event for a known employee.
    pub fn record(
        &self,
        employee_id: Uuid,
        entry_type: EntryType,
        entry_time: NaiveDateTime,
    ) -> LedgerResult<TimeEntry> {
        let employee = self.directory.get(employee_id)?;
        let entry = TimeEntry::new(employee.id, entry_type, entry_time);
        self.entries
            .entry(employee.id)
            .or_default()
            .push(entry.clone());

        debug!(
            employee_id = %employee.id,
            entry_type = ?entry_type,
            entry_time = %entry_time,
            "Recorded time entry"
        );
        Ok(entry)
    }

    /// Returns an employee's entries dated within `[start, end]`, in recorded order.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Validation`] if `end` precedes `start`.
    pub fn entries_between(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<Vec<TimeEntry>> {
        if end < start {
            return Err(LedgerError::validation(
                "end_date",
                "must not be before start_date",
            ));
        }
        Ok(self
            .entries
            .get(&employee_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.date >= start && e.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Aggregates an employee's entries within `[start, end]` into daily totals.
    pub fn summarize(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<DaySummaries> {
        Ok(aggregate(self.entries_between(employee_id, start, end)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, Role};

    fn log_with_employee() -> (TimeEntryLog, Uuid) {
        let directory = Arc::new(EmployeeDirectory::new());
        let employee = directory
            .register(Employee {
                id: Uuid::new_v4(),
                organization_id: Uuid::new_v4(),
                name: "Sana".to_string(),
                role: Role::Employee,
            })
            .unwrap();
        (TimeEntryLog::new(directory), employee.id)
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_record_and_summarize() {
        let (log, employee) = log_with_employee();
        log.record(employee, EntryType::CheckIn, at("2024-03-04 09:00")).unwrap();
        log.record(employee, EntryType::CheckOut, at("2024-03-04 17:30")).unwrap();
        log.record(employee, EntryType::CheckIn, at("2024-03-05 09:00")).unwrap();
        log.record(employee, EntryType::CheckOut, at("2024-03-05 10:00")).unwrap();

        let summaries = log
            .summarize(employee, date("2024-03-01"), date("2024-03-31"))
            .unwrap();
        let totals: Vec<i64> = summaries.iter().map(|s| s.total_minutes).collect();
        assert_eq!(totals, vec![60, 510]);
    }

    #[test]
    fn test_range_is_inclusive() {
        let (log, employee) = log_with_employee();
        log.record(employee, EntryType::CheckIn, at("2024-02-29 09:00")).unwrap();
        log.record(employee, EntryType::CheckIn, at("2024-03-01 09:00")).unwrap();
        log.record(employee, EntryType::CheckIn, at("2024-03-02 09:00")).unwrap();

        let entries = log
            .entries_between(employee, date("2024-03-01"), date("2024-03-02"))
            .unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_unknown_employee_cannot_record() {
        let (log, _) = log_with_employee();
        assert!(matches!(
            log.record(Uuid::new_v4(), EntryType::CheckIn, at("2024-03-04 09:00")),
            Err(LedgerError::NotFound { .. })
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let (log, employee) = log_with_employee();
        assert!(matches!(
            log.entries_between(employee, date("2024-03-02"), date("2024-03-01")),
            Err(LedgerError::Validation { .. })
        ));
    }

    #[test]
    fn test_employee_without_entries_has_empty_summary() {
        let (log, employee) = log_with_employee();
        let summaries = log
            .summarize(employee, date("2024-03-01"), date("2024-03-31"))
            .unwrap();
        assert_eq!(summaries.iter().count(), 0);
    }
}
