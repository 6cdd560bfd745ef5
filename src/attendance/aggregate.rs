//! Pairing of check-in/check-out events into daily worked totals.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{DaySummary, EntryType, TimeEntry};

/// Time entries grouped by day, ready to be summarized.
///
/// Summaries are computed lazily on each iteration, so the sequence can be
/// walked any number of times. Days are yielded newest first for display,
/// while pairing inside a day always runs on entries sorted oldest first.
#[derive(Debug, Clone, Default)]
pub struct DaySummaries {
    days: BTreeMap<NaiveDate, Vec<TimeEntry>>,
}

impl DaySummaries {
    /// Iterates summaries ordered by date descending.
    pub fn iter(&self) -> impl Iterator<Item = DaySummary> + '_ {
        self.days
            .iter()
            .rev()
            .map(|(date, entries)| summarize_day(*date, entries))
    }

    /// Sum of worked minutes over every day.
    pub fn total_minutes(&self) -> i64 {
        self.iter().map(|s| s.total_minutes).sum()
    }
}

impl<'a> IntoIterator for &'a DaySummaries {
    type Item = DaySummary;
    type IntoIter = Box<dyn Iterator<Item = DaySummary> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Groups entries by date and prepares them for pairing.
///
/// Entries within each day are sorted ascending by `entry_time`; ties keep
/// their input order.
///
/// # Examples
///
/// ```
/// use leave_ledger::attendance::aggregate;
/// use leave_ledger::models::{EntryType, TimeEntry};
/// use chrono::NaiveDateTime;
/// use uuid::Uuid;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
/// let employee = Uuid::new_v4();
/// let entries = vec![
///     TimeEntry::new(employee, EntryType::CheckOut, at("2024-03-04 13:00")),
///     TimeEntry::new(employee, EntryType::CheckIn, at("2024-03-04 09:00")),
/// ];
///
/// let summaries = aggregate(entries);
/// let day: Vec<_> = summaries.iter().collect();
/// assert_eq!(day[0].total_minutes, 240);
/// ```
pub fn aggregate<I>(entries: I) -> DaySummaries
where
    I: IntoIterator<Item = TimeEntry>,
{
    let mut days: BTreeMap<NaiveDate, Vec<TimeEntry>> = BTreeMap::new();
    for entry in entries {
        days.entry(entry.date).or_default().push(entry);
    }
    for entries in days.values_mut() {
        entries.sort_by_key(|e| e.entry_time);
    }
    DaySummaries { days }
}

/// Walks a day's ascending entries two at a time.
///
/// A `check_in` followed by a `check_out` adds their difference; any other
/// pair adds nothing and the walk still advances by two. A trailing odd entry
/// adds nothing. Either case marks the day incomplete.
fn summarize_day(date: NaiveDate, entries: &[TimeEntry]) -> DaySummary {
    let mut total_minutes = 0;
    let mut incomplete = false;

    for pair in entries.chunks(2) {
        match pair {
            [start, end]
                if start.entry_type == EntryType::CheckIn
                    && end.entry_type == EntryType::CheckOut =>
            {
                total_minutes += (end.entry_time - start.entry_time).num_minutes();
            }
            _ => incomplete = true,
        }
    }

    DaySummary {
        date,
        total_minutes,
        incomplete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use uuid::Uuid;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn entry(employee: Uuid, kind: EntryType, time: &str) -> TimeEntry {
        TimeEntry::new(employee, kind, at(time))
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn day_of(summaries: &DaySummaries, s: &str) -> DaySummary {
        summaries.iter().find(|d| d.date == date(s)).unwrap()
    }

    #[test]
    fn test_two_sessions_in_one_day() {
        let e = Uuid::new_v4();
        let summaries = aggregate(vec![
            entry(e, EntryType::CheckIn, "2024-03-04 09:00"),
            entry(e, EntryType::CheckOut, "2024-03-04 13:00"),
            entry(e, EntryType::CheckIn, "2024-03-04 14:00"),
            entry(e, EntryType::CheckOut, "2024-03-04 18:00"),
        ]);

        let day = day_of(&summaries, "2024-03-04");
        assert_eq!(day.total_minutes, 480);
        assert!(!day.incomplete);
    }

    #[test]
    fn test_two_check_ins_contribute_zero() {
        let e = Uuid::new_v4();
        let summaries = aggregate(vec![
            entry(e, EntryType::CheckIn, "2024-03-04 09:00"),
            entry(e, EntryType::CheckIn, "2024-03-04 10:00"),
        ]);

        let day = day_of(&summaries, "2024-03-04");
        assert_eq!(day.total_minutes, 0);
        assert!(day.incomplete);
    }

    #[test]
    fn test_unsorted_input_is_paired_in_time_order() {
        let e = Uuid::new_v4();
        let summaries = aggregate(vec![
            entry(e, EntryType::CheckOut, "2024-03-04 18:00"),
            entry(e, EntryType::CheckIn, "2024-03-04 14:00"),
            entry(e, EntryType::CheckOut, "2024-03-04 13:00"),
            entry(e, EntryType::CheckIn, "2024-03-04 09:00"),
        ]);

        assert_eq!(day_of(&summaries, "2024-03-04").total_minutes, 480);
    }

    #[test]
    fn test_broken_pair_still_advances_by_two() {
        // out, in | in, out  -> first pair broken, second pair counts
        let e = Uuid::new_v4();
        let summaries = aggregate(vec![
            entry(e, EntryType::CheckOut, "2024-03-04 08:00"),
            entry(e, EntryType::CheckIn, "2024-03-04 09:00"),
            entry(e, EntryType::CheckIn, "2024-03-04 10:00"),
            entry(e, EntryType::CheckOut, "2024-03-04 12:30"),
        ]);

        let day = day_of(&summaries, "2024-03-04");
        assert_eq!(day.total_minutes, 150);
        assert!(day.incomplete);
    }

    #[test]
    fn test_trailing_check_in_is_dropped() {
        let e = Uuid::new_v4();
        let summaries = aggregate(vec![
            entry(e, EntryType::CheckIn, "2024-03-04 09:00"),
            entry(e, EntryType::CheckOut, "2024-03-04 12:00"),
            entry(e, EntryType::CheckIn, "2024-03-04 13:00"),
        ]);

        let day = day_of(&summaries, "2024-03-04");
        assert_eq!(day.total_minutes, 180);
        assert!(day.incomplete);
    }

    #[test]
    fn test_days_are_yielded_newest_first() {
        let e = Uuid::new_v4();
        let summaries = aggregate(vec![
            entry(e, EntryType::CheckIn, "2024-03-01 09:00"),
            entry(e, EntryType::CheckOut, "2024-03-01 10:00"),
            entry(e, EntryType::CheckIn, "2024-03-03 09:00"),
            entry(e, EntryType::CheckOut, "2024-03-03 11:00"),
            entry(e, EntryType::CheckIn, "2024-03-02 09:00"),
            entry(e, EntryType::CheckOut, "2024-03-02 09:30"),
        ]);

        let dates: Vec<NaiveDate> = summaries.iter().map(|s| s.date).collect();
        assert_eq!(
            dates,
            vec![date("2024-03-03"), date("2024-03-02"), date("2024-03-01")]
        );

        let minutes: Vec<i64> = summaries.iter().map(|s| s.total_minutes).collect();
        assert_eq!(minutes, vec![120, 30, 60]);
    }

    #[test]
    fn test_sequence_is_restartable() {
        let e = Uuid::new_v4();
        let summaries = aggregate(vec![
            entry(e, EntryType::CheckIn, "2024-03-01 09:00"),
            entry(e, EntryType::CheckOut, "2024-03-01 17:00"),
        ]);

        let first: Vec<DaySummary> = summaries.iter().collect();
        let second: Vec<DaySummary> = (&summaries).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(summaries.total_minutes(), 480);
    }

    #[test]
    fn test_empty_input() {
        let summaries = aggregate(Vec::new());
        assert_eq!(summaries.iter().count(), 0);
        assert_eq!(summaries.total_minutes(), 0);
    }
}
