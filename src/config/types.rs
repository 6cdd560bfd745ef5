//! Configuration types for the leave ledger service.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::ledger::{DEFAULT_COMP_OFF_POLICY_CODE, DEFAULT_EVENT_CAPACITY};
use crate::models::{Employee, LeavePolicy};

/// Service settings from `server.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Default log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Policy code applied comp-off is credited to.
    #[serde(default = "default_comp_off_policy_code")]
    pub comp_off_policy_code: String,
    /// Invalidation notices buffered per subscriber.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            log_level: default_log_level(),
            comp_off_policy_code: default_comp_off_policy_code(),
            event_capacity: default_event_capacity(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_comp_off_policy_code() -> String {
    DEFAULT_COMP_OFF_POLICY_CODE.to_string()
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

/// An opening balance to set at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedBalance {
    /// The employee who owns the balance.
    pub employee_id: Uuid,
    /// The policy the balance is tracked against.
    pub policy_id: Uuid,
    /// The calendar year.
    pub year: i32,
    /// Days credited at the start of the year.
    pub opening_balance: Decimal,
}

/// Initial data from `seed.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfig {
    /// Employees to register.
    #[serde(default)]
    pub employees: Vec<Employee>,
    /// Leave policies to create.
    #[serde(default)]
    pub policies: Vec<LeavePolicy>,
    /// Opening balances to set.
    #[serde(default)]
    pub balances: Vec<SeedBalance>,
}

/// The complete configuration loaded from a configuration directory.
#[derive(Debug, Clone)]
pub struct AppConfig {
    server: ServerConfig,
    seed: SeedConfig,
}

impl AppConfig {
    /// Creates a new AppConfig from its component parts.
    pub fn new(server: ServerConfig, seed: SeedConfig) -> Self {
        Self { server, seed }
    }

    /// Returns the service settings.
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    /// Returns the seed data.
    pub fn seed(&self) -> &SeedConfig {
        &self.seed
    }
}
