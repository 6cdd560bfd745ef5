//! Configuration loading for the leave ledger service.
//!
//! This module loads service settings and seed data (employees, leave
//! policies, opening balances) from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use leave_ledger::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/demo").unwrap();
//! println!("Binding to {}", config.server().bind_address);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{AppConfig, SeedBalance, SeedConfig, ServerConfig};
