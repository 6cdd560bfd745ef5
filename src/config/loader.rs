//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading service
//! settings and seed data from YAML files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::models::BalanceKey;

use super::types::{AppConfig, SeedConfig, ServerConfig};

/// Loads and provides access to service configuration.
///
/// # Directory Structure
///
/// ```text
/// config/demo/
/// ├── server.yaml   # Bind address, log level, comp-off policy code
/// └── seed.yaml     # Employees, leave policies, opening balances
/// ```
///
/// # Example
///
/// ```no_run
/// use leave_ledger::config::ConfigLoader;
/// use leave_ledger::ledger::Ledger;
///
/// let loader = ConfigLoader::load("./config/demo")?;
/// let ledger = loader.build_ledger()?;
/// println!("Seeded {} employees", ledger.directory.len());
/// # Ok::<(), leave_ledger::error::LedgerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: AppConfig,
    seed_path: PathBuf,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if either file is missing, contains invalid YAML, or
    /// the seed references employees or policies it does not define.
    pub fn load<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let path = path.as_ref();

        let server = Self::load_yaml::<ServerConfig>(&path.join("server.yaml"))?;

        let seed_path = path.join("seed.yaml");
        let seed = Self::load_yaml::<SeedConfig>(&seed_path)?;
        Self::validate_seed(&seed, &seed_path)?;

        Ok(Self {
            config: AppConfig::new(server, seed),
            seed_path,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> LedgerResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| LedgerError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| LedgerError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Checks that every seeded balance names a seeded employee and a policy
    /// of that employee's organization.
    fn validate_seed(seed: &SeedConfig, path: &Path) -> LedgerResult<()> {
        let parse_error = |message: String| LedgerError::ConfigParseError {
            path: path.display().to_string(),
            message,
        };

        let organizations: HashMap<Uuid, Uuid> = seed
            .employees
            .iter()
            .map(|e| (e.id, e.organization_id))
            .collect();
        let policy_orgs: HashMap<Uuid, Uuid> = seed
            .policies
            .iter()
            .map(|p| (p.id, p.organization_id))
            .collect();

        for balance in &seed.balances {
            let org = organizations.get(&balance.employee_id).ok_or_else(|| {
                parse_error(format!("balance references unknown employee {}", balance.employee_id))
            })?;
            match policy_orgs.get(&balance.policy_id) {
                Some(policy_org) if policy_org == org => {}
                Some(_) => {
                    return Err(parse_error(format!(
                        "policy {} belongs to another organization than employee {}",
                        balance.policy_id, balance.employee_id
                    )));
                }
                None => {
                    return Err(parse_error(format!(
                        "balance references unknown policy {}",
                        balance.policy_id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns the service settings.
    pub fn server(&self) -> &ServerConfig {
        self.config.server()
    }

    /// Creates a ledger from the settings and applies the seed to it.
    pub fn build_ledger(&self) -> LedgerResult<Ledger> {
        let server = self.server();
        let ledger = Ledger::new(&server.comp_off_policy_code, server.event_capacity);
        self.apply_seed(&ledger)?;
        Ok(ledger)
    }

    /// Registers the seed's employees, policies and opening balances.
    ///
    /// Errors from the ledger (duplicate codes, blank names) are reported
    /// against the seed file.
    pub fn apply_seed(&self, ledger: &Ledger) -> LedgerResult<()> {
        let seed = self.config.seed();
        let in_seed = |err: LedgerError| LedgerError::ConfigParseError {
            path: self.seed_path.display().to_string(),
            message: err.to_string(),
        };

        for employee in &seed.employees {
            ledger.directory.register(employee.clone()).map_err(in_seed)?;
        }
        for policy in &seed.policies {
            ledger.policies.insert(policy.clone()).map_err(in_seed)?;
        }
        for balance in &seed.balances {
            let key = BalanceKey::new(balance.employee_id, balance.policy_id, balance.year);
            ledger
                .balances
                .open(key, balance.opening_balance)
                .map_err(in_seed)?;
        }

        info!(
            employees = seed.employees.len(),
            policies = seed.policies.len(),
            balances = seed.balances.len(),
            "Applied seed data"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/demo"
    }

    fn uuid(s: &str) -> Uuid {
        Uuid::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.server().comp_off_policy_code, "CO");
        assert_eq!(loader.config().seed().employees.len(), 3);
    }

    #[test]
    fn test_build_ledger_applies_seed() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let ledger = loader.build_ledger().unwrap();

        let asha = uuid("11111111-1111-4111-8111-111111111111");
        let casual = uuid("aaaaaaaa-0000-4000-8000-000000000001");
        let balance = ledger
            .balances
            .get_balance(BalanceKey::new(asha, casual, 2024));
        assert_eq!(balance.current_balance().unwrap(), Decimal::new(12, 0));
        assert_eq!(ledger.directory.len(), 3);
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(LedgerError::ConfigNotFound { path }) => {
                assert!(path.contains("server.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_seed_with_unknown_policy_is_rejected() {
        let seed: SeedConfig = serde_yaml::from_str(
            r#"
employees:
  - id: "11111111-1111-4111-8111-111111111111"
    organization_id: "00000000-0000-4000-8000-00000000000a"
    name: "Asha"
balances:
  - employee_id: "11111111-1111-4111-8111-111111111111"
    policy_id: "aaaaaaaa-0000-4000-8000-000000000009"
    year: 2024
    opening_balance: 12
"#,
        )
        .unwrap();

        let result = ConfigLoader::validate_seed(&seed, Path::new("seed.yaml"));
        assert!(matches!(result, Err(LedgerError::ConfigParseError { .. })));
    }

    #[test]
    fn test_seed_with_cross_org_policy_is_rejected() {
        let seed: SeedConfig = serde_yaml::from_str(
            r#"
employees:
  - id: "11111111-1111-4111-8111-111111111111"
    organization_id: "00000000-0000-4000-8000-00000000000a"
    name: "Asha"
policies:
  - id: "aaaaaaaa-0000-4000-8000-000000000001"
    organization_id: "00000000-0000-4000-8000-00000000000b"
    code: "CL"
    display_name: "Casual Leave"
    annual_quota: 12
balances:
  - employee_id: "11111111-1111-4111-8111-111111111111"
    policy_id: "aaaaaaaa-0000-4000-8000-000000000001"
    year: 2024
    opening_balance: 12
"#,
        )
        .unwrap();

        let result = ConfigLoader::validate_seed(&seed, Path::new("seed.yaml"));
        match result {
            Err(LedgerError::ConfigParseError { message, .. }) => {
                assert!(message.contains("another organization"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }
}
