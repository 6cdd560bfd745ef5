//! Core data models for the leave ledger.
//!
//! This module contains all the domain models used throughout the crate.

mod balance;
mod comp_off;
mod employee;
mod leave_request;
mod policy;
mod time_entry;

pub use balance::{BalanceCheck, BalanceField, BalanceKey, BalanceView, LeaveBalance};
pub use comp_off::{CompOffGrant, CompOffSource};
pub use employee::{Employee, Role};
pub use leave_request::{LeaveRequest, LeaveStatus, inclusive_days};
pub use policy::LeavePolicy;
pub use time_entry::{DaySummary, EntryType, TimeEntry};
