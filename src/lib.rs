//! Multi-tenant leave ledger.
//!
//! This crate tracks leave balances per employee, policy and year, runs leave
//! requests through an approval state machine that moves balances atomically,
//! credits comp-off grants, and aggregates check-in/check-out events into
//! daily worked minutes.

#![warn(missing_docs)]

pub mod api;
pub mod attendance;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
