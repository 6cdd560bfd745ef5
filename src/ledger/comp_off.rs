//! Comp-off grant ledger.
//!
//! A grant is recorded unapplied and credited to the employee's balance at
//! most once. `apply` holds the grant's entry across the flag check, the
//! balance credit and the flag write, so concurrent retries cannot double-credit.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    BalanceCheck, BalanceField, BalanceKey, CompOffGrant, CompOffSource, LeaveBalance,
};

use super::balance::BalanceLedger;
use super::directory::EmployeeDirectory;
use super::events::{Invalidation, InvalidationBus};
use super::policy_registry::PolicyRegistry;

/// Policy code comp-off is credited to when no explicit policy is given.
pub const DEFAULT_COMP_OFF_POLICY_CODE: &str = "CO";

/// Input for recording a comp-off grant.
#[derive(Debug, Clone)]
pub struct NewCompOff {
    /// The employee receiving the grant.
    pub employee_id: Uuid,
    /// The date the extra work was performed.
    pub work_date: NaiveDate,
    /// Hours of extra work.
    pub hours_worked: Decimal,
    /// Leave days to credit when applied.
    pub days_granted: Decimal,
    /// Why the grant was issued.
    pub source: CompOffSource,
    /// Optional note.
    pub reason: Option<String>,
}

/// The comp-off grant ledger.
#[derive(Debug)]
pub struct CompOffLedger {
    directory: Arc<EmployeeDirectory>,
    policies: Arc<PolicyRegistry>,
    ledger: Arc<BalanceLedger>,
    grants: DashMap<Uuid, CompOffGrant>,
    bus: InvalidationBus,
    policy_code: String,
}

impl CompOffLedger {
    /// Creates a ledger crediting the organization's `policy_code` policy.
    pub fn new(
        directory: Arc<EmployeeDirectory>,
        policies: Arc<PolicyRegistry>,
        ledger: Arc<BalanceLedger>,
        bus: InvalidationBus,
        policy_code: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            policies,
            ledger,
            grants: DashMap::new(),
            bus,
            policy_code: policy_code.into(),
        }
    }

    /// Records an unapplied grant.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Validation`] if hours or days are negative.
    /// - [`LedgerError::NotFound`] if the employee is unknown.
    pub fn grant(&self, input: NewCompOff) -> LedgerResult<CompOffGrant> {
        if input.hours_worked < Decimal::ZERO {
            return Err(LedgerError::validation(
                "hours_worked",
                "must not be negative",
            ));
        }
        if input.days_granted < Decimal::ZERO {
            return Err(LedgerError::validation(
                "days_granted",
                "must not be negative",
            ));
        }
        let employee = self.directory.get(input.employee_id)?;

        let grant = CompOffGrant {
            id: Uuid::new_v4(),
            employee_id: employee.id,
            work_date: input.work_date,
            hours_worked: input.hours_worked,
            days_granted: input.days_granted,
            source: input.source,
            reason: input
                .reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            is_applied: false,
            created_at: Utc::now(),
        };
        self.grants.insert(grant.id, grant.clone());

        info!(
            grant_id = %grant.id,
            employee_id = %grant.employee_id,
            source = ?grant.source,
            days_granted = %grant.days_granted,
            "Recorded comp-off grant"
        );
        self.bus.publish(Invalidation::CompOff { id: grant.id });
        Ok(grant)
    }

    /// Credits a grant to the organization's comp-off policy.
    ///
    /// The balance year is the year of the grant's work date.
    pub fn apply(&self, grant_id: Uuid) -> LedgerResult<(CompOffGrant, LeaveBalance)> {
        self.apply_with(grant_id, |organization_id| {
            self.policies.find_by_code(organization_id, &self.policy_code)
        })
    }

    /// Credits a grant to an explicit policy of the employee's organization.
    pub fn apply_to(
        &self,
        grant_id: Uuid,
        policy_id: Uuid,
    ) -> LedgerResult<(CompOffGrant, LeaveBalance)> {
        self.apply_with(grant_id, |organization_id| {
            self.policies.get_in_org(policy_id, organization_id)
        })
    }

    /// Looks up a grant.
    pub fn get(&self, grant_id: Uuid) -> LedgerResult<CompOffGrant> {
        self.grants
            .get(&grant_id)
            .map(|g| g.clone())
            .ok_or(LedgerError::NotFound {
                entity: "comp-off grant",
            })
    }

    /// Lists an employee's grants by work date, newest first.
    pub fn list_for_employee(&self, employee_id: Uuid) -> Vec<CompOffGrant> {
        let mut grants: Vec<CompOffGrant> = self
            .grants
            .iter()
            .filter(|g| g.employee_id == employee_id)
            .map(|g| g.clone())
            .collect();
        grants.sort_by(|a, b| b.work_date.cmp(&a.work_date));
        grants
    }

    fn apply_with<F>(
        &self,
        grant_id: Uuid,
        resolve_policy: F,
    ) -> LedgerResult<(CompOffGrant, LeaveBalance)>
    where
        F: FnOnce(Uuid) -> LedgerResult<crate::models::LeavePolicy>,
    {
        let (grant, balance, current) = {
            let mut grant = self.grants.get_mut(&grant_id).ok_or(LedgerError::NotFound {
                entity: "comp-off grant",
            })?;

            if grant.is_applied {
                warn!(grant_id = %grant_id, "Comp-off grant already applied");
                return Err(LedgerError::AlreadyApplied { grant_id });
            }

            let employee = self.directory.get(grant.employee_id)?;
            let policy = resolve_policy(employee.organization_id)?;
            let key = BalanceKey::new(grant.employee_id, policy.id, grant.work_date.year());
            let (balance, current) = self.ledger.apply_delta_unpublished(
                key,
                BalanceField::Adjustment,
                grant.days_granted,
                BalanceCheck::Unchecked,
            )?;

            grant.is_applied = true;
            (grant.clone(), balance, current)
        };

        info!(
            grant_id = %grant_id,
            employee_id = %grant.employee_id,
            policy_id = %balance.key.policy_id,
            days_granted = %grant.days_granted,
            current_balance = %current,
            "Applied comp-off grant"
        );
        self.bus.publish(Invalidation::CompOff { id: grant_id });
        self.bus.publish(Invalidation::Balance { key: balance.key });
        Ok((grant, balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::policy_registry::NewPolicy;
    use crate::models::{Employee, LeavePolicy, Role};

    struct Fixture {
        comp_offs: CompOffLedger,
        ledger: Arc<BalanceLedger>,
        employee: Employee,
        policy: LeavePolicy,
        policies: Arc<PolicyRegistry>,
    }

    fn fixture() -> Fixture {
        let bus = InvalidationBus::default();
        let directory = Arc::new(EmployeeDirectory::new());
        let policies = Arc::new(PolicyRegistry::new(bus.clone()));
        let ledger = Arc::new(BalanceLedger::new(bus.clone()));

        let employee = directory
            .register(Employee {
                id: Uuid::new_v4(),
                organization_id: Uuid::new_v4(),
                name: "Ravi".to_string(),
                role: Role::Employee,
            })
            .unwrap();
        let policy = policies
            .create(NewPolicy {
                organization_id: employee.organization_id,
                code: DEFAULT_COMP_OFF_POLICY_CODE.to_string(),
                display_name: "Compensatory Off".to_string(),
                annual_quota: Decimal::ZERO,
            })
            .unwrap();

        let comp_offs = CompOffLedger::new(
            directory,
            policies.clone(),
            ledger.clone(),
            bus,
            DEFAULT_COMP_OFF_POLICY_CODE,
        );
        Fixture {
            comp_offs,
            ledger,
            employee,
            policy,
            policies,
        }
    }

    fn new_grant(f: &Fixture, days: i64) -> NewCompOff {
        NewCompOff {
            employee_id: f.employee.id,
            work_date: NaiveDate::from_ymd_opt(2024, 1, 26).unwrap(),
            hours_worked: Decimal::new(8, 0),
            days_granted: Decimal::new(days, 0),
            source: CompOffSource::HolidayWork,
            reason: Some("Republic Day shift".to_string()),
        }
    }

    #[test]
    fn test_apply_credits_adjustment_once() {
        let f = fixture();
        let grant = f.comp_offs.grant(new_grant(&f, 1)).unwrap();
        assert!(!grant.is_applied);

        let (applied, balance) = f.comp_offs.apply(grant.id).unwrap();
        assert!(applied.is_applied);
        assert_eq!(balance.adjustment, Decimal::ONE);
        assert_eq!(balance.key.year, 2024);
        assert_eq!(balance.key.policy_id, f.policy.id);

        assert_eq!(
            f.comp_offs.apply(grant.id),
            Err(LedgerError::AlreadyApplied { grant_id: grant.id })
        );
        let key = BalanceKey::new(f.employee.id, f.policy.id, 2024);
        assert_eq!(f.ledger.get_balance(key).adjustment, Decimal::ONE);
    }

    #[test]
    fn test_apply_to_explicit_policy() {
        let f = fixture();
        let other = f
            .policies
            .create(NewPolicy {
                organization_id: f.employee.organization_id,
                code: "EL".to_string(),
                display_name: "Earned Leave".to_string(),
                annual_quota: Decimal::new(15, 0),
            })
            .unwrap();
        let grant = f.comp_offs.grant(new_grant(&f, 2)).unwrap();

        let (_, balance) = f.comp_offs.apply_to(grant.id, other.id).unwrap();
        assert_eq!(balance.key.policy_id, other.id);
        assert_eq!(balance.current_balance().unwrap(), Decimal::new(2, 0));
    }

    #[test]
    fn test_missing_comp_off_policy_leaves_grant_unapplied() {
        let f = fixture();
        let grant = f.comp_offs.grant(new_grant(&f, 1)).unwrap();

        let result = f.comp_offs.apply_to(grant.id, Uuid::new_v4());
        assert!(matches!(result, Err(LedgerError::NotFound { .. })));
        assert!(!f.comp_offs.get(grant.id).unwrap().is_applied);
    }

    #[test]
    fn test_negative_values_rejected() {
        let f = fixture();
        let mut input = new_grant(&f, 1);
        input.hours_worked = Decimal::new(-1, 0);
        assert!(matches!(
            f.comp_offs.grant(input),
            Err(LedgerError::Validation { ref field, .. }) if field == "hours_worked"
        ));

        let input = new_grant(&f, -1);
        assert!(matches!(
            f.comp_offs.grant(input),
            Err(LedgerError::Validation { ref field, .. }) if field == "days_granted"
        ));
    }

    #[test]
    fn test_unknown_employee_rejected() {
        let f = fixture();
        let mut input = new_grant(&f, 1);
        input.employee_id = Uuid::new_v4();
        assert_eq!(
            f.comp_offs.grant(input),
            Err(LedgerError::NotFound { entity: "employee" })
        );
    }

    #[test]
    fn test_concurrent_apply_credits_once() {
        let f = fixture();
        let grant = f.comp_offs.grant(new_grant(&f, 1)).unwrap();

        let successes: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| f.comp_offs.apply(grant.id).is_ok()))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap() as usize)
                .sum()
        });

        assert_eq!(successes, 1);
        let key = BalanceKey::new(f.employee.id, f.policy.id, 2024);
        assert_eq!(f.ledger.get_balance(key).adjustment, Decimal::ONE);
    }

    #[test]
    fn test_blank_reason_dropped() {
        let f = fixture();
        let mut input = new_grant(&f, 1);
        input.reason = Some("   ".to_string());
        assert_eq!(f.comp_offs.grant(input).unwrap().reason, None);
    }
}
