//! Attendance aggregation.
//!
//! Turns raw check-in/check-out events into per-day worked totals. This module
//! is pure: it owns no state and never fails.

mod aggregate;

pub use aggregate::{DaySummaries, aggregate};
