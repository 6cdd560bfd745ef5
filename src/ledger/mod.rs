//! Stateful leave services.
//!
//! This module contains the employee directory, leave policy registry,
//! balance ledger, leave request workflow, comp-off grant ledger and the
//! attendance log, plus the [`Ledger`] that wires them to a shared
//! [`InvalidationBus`].

mod balance;
mod comp_off;
mod directory;
mod events;
mod policy_registry;
mod time_log;
mod workflow;

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{BalanceKey, LeaveBalance};

pub use balance::BalanceLedger;
pub use comp_off::{CompOffLedger, DEFAULT_COMP_OFF_POLICY_CODE, NewCompOff};
pub use directory::EmployeeDirectory;
pub use events::{DEFAULT_EVENT_CAPACITY, Invalidation, InvalidationBus};
pub use policy_registry::{NewPolicy, PolicyRegistry};
pub use time_log::TimeEntryLog;
pub use workflow::{LeaveWorkflow, SubmitLeave};

/// All leave services sharing one store and one invalidation bus.
#[derive(Debug)]
pub struct Ledger {
    /// Employees and their organizations.
    pub directory: Arc<EmployeeDirectory>,
    /// Leave policies per organization.
    pub policies: Arc<PolicyRegistry>,
    /// Balance rows.
    pub balances: Arc<BalanceLedger>,
    /// Leave request state machine.
    pub requests: LeaveWorkflow,
    /// Comp-off grants.
    pub comp_offs: CompOffLedger,
    /// Attendance events.
    pub time_entries: TimeEntryLog,
    /// Invalidation notices for every committed mutation.
    pub bus: InvalidationBus,
}

impl Ledger {
    /// Creates an empty ledger.
    ///
    /// `comp_off_policy_code` names the policy applied comp-off is credited to.
    pub fn new(comp_off_policy_code: &str, event_capacity: usize) -> Self {
        let bus = InvalidationBus::new(event_capacity);
        let directory = Arc::new(EmployeeDirectory::new());
        let policies = Arc::new(PolicyRegistry::new(bus.clone()));
        let balances = Arc::new(BalanceLedger::new(bus.clone()));

        let requests = LeaveWorkflow::new(
            directory.clone(),
            policies.clone(),
            balances.clone(),
            bus.clone(),
        );
        let comp_offs = CompOffLedger::new(
            directory.clone(),
            policies.clone(),
            balances.clone(),
            bus.clone(),
            comp_off_policy_code,
        );
        let time_entries = TimeEntryLog::new(directory.clone());

        Self {
            directory,
            policies,
            balances,
            requests,
            comp_offs,
            time_entries,
            bus,
        }
    }

    /// Opens an employee's balances for `year` at each active policy's quota.
    ///
    /// Rows that were already opened are left alone, so running this twice for
    /// the same year is harmless. Returns the rows opened by this call.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] for an unknown employee, and any error from
    /// [`BalanceLedger::open`] other than losing the race to open a row.
    /// Rows opened before the failure stay opened.
    pub fn open_year(&self, employee_id: Uuid, year: i32) -> LedgerResult<Vec<LeaveBalance>> {
        let employee = self.directory.get(employee_id)?;
        let mut opened = Vec::new();

        for policy in self.policies.list(employee.organization_id, false) {
            let key = BalanceKey::new(employee.id, policy.id, year);
            if self.balances.get_balance(key).opened {
                continue;
            }
            match self.balances.open(key, policy.annual_quota) {
                Ok(row) => opened.push(row),
                // A concurrent opener won the race for this row.
                Err(LedgerError::Validation { .. }) if self.balances.get_balance(key).opened => {}
                Err(error) => return Err(error),
            }
        }

        info!(
            employee_id = %employee_id,
            year,
            opened = opened.len(),
            "Opened leave year"
        );
        Ok(opened)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_COMP_OFF_POLICY_CODE, DEFAULT_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BalanceCheck, BalanceField, Employee, Role};
    use rust_decimal::Decimal;

    fn employee(ledger: &Ledger) -> Employee {
        ledger
            .directory
            .register(Employee {
                id: Uuid::new_v4(),
                organization_id: Uuid::new_v4(),
                name: "Nisha".to_string(),
                role: Role::Employee,
            })
            .unwrap()
    }

    fn policy(ledger: &Ledger, org: Uuid, code: &str, quota: i64) -> Uuid {
        ledger
            .policies
            .create(NewPolicy {
                organization_id: org,
                code: code.to_string(),
                display_name: code.to_string(),
                annual_quota: Decimal::new(quota, 0),
            })
            .unwrap()
            .id
    }

    #[test]
    fn test_open_year_uses_quotas_of_active_policies() {
        let ledger = Ledger::default();
        let e = employee(&ledger);
        let cl = policy(&ledger, e.organization_id, "CL", 12);
        let sl = policy(&ledger, e.organization_id, "SL", 7);
        let old = policy(&ledger, e.organization_id, "OL", 3);
        ledger.policies.deactivate(old).unwrap();

        let opened = ledger.open_year(e.id, 2024).unwrap();
        assert_eq!(opened.len(), 2);
        assert_eq!(
            ledger.balances.get_balance(BalanceKey::new(e.id, cl, 2024)).current_balance(),
            Ok(Decimal::new(12, 0))
        );
        assert_eq!(
            ledger.balances.get_balance(BalanceKey::new(e.id, sl, 2024)).current_balance(),
            Ok(Decimal::new(7, 0))
        );
        assert!(!ledger.balances.get_balance(BalanceKey::new(e.id, old, 2024)).opened);
    }

    #[test]
    fn test_open_year_is_repeatable() {
        let ledger = Ledger::default();
        let e = employee(&ledger);
        let cl = policy(&ledger, e.organization_id, "CL", 12);

        assert_eq!(ledger.open_year(e.id, 2024).unwrap().len(), 1);
        assert!(ledger.open_year(e.id, 2024).unwrap().is_empty());
        let row = ledger.balances.get_balance(BalanceKey::new(e.id, cl, 2024));
        assert_eq!(row.opening_balance, Decimal::new(12, 0));
    }

    #[test]
    fn test_open_year_reports_failed_open() {
        let ledger = Ledger::default();
        let e = employee(&ledger);
        let cl = policy(&ledger, e.organization_id, "CL", 12);
        let key = BalanceKey::new(e.id, cl, 2024);
        ledger
            .balances
            .apply_delta(key, BalanceField::Adjustment, Decimal::MAX, BalanceCheck::Unchecked)
            .unwrap();

        let result = ledger.open_year(e.id, 2024);
        assert!(matches!(result, Err(LedgerError::Validation { .. })));
        assert!(!ledger.balances.get_balance(key).opened);
    }

    #[test]
    fn test_open_year_unknown_employee() {
        let ledger = Ledger::default();
        assert!(ledger.open_year(Uuid::new_v4(), 2024).is_err());
    }
}
