//! Leave balance ledger.
//!
//! Keeps one row per (employee, policy, year). Each row is mutated only while
//! its map entry is held, which serializes all writers of the same key.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{BalanceCheck, BalanceField, BalanceKey, LeaveBalance};

use super::events::{Invalidation, InvalidationBus};

/// The balance ledger.
#[derive(Debug)]
pub struct BalanceLedger {
    rows: DashMap<BalanceKey, LeaveBalance>,
    bus: InvalidationBus,
}

impl BalanceLedger {
    /// Creates an empty ledger publishing on `bus`.
    pub fn new(bus: InvalidationBus) -> Self {
        Self {
            rows: DashMap::new(),
            bus,
        }
    }

    /// Returns the row for `key`, or an all-zero row if none exists. Never fails.
    pub fn get_balance(&self, key: BalanceKey) -> LeaveBalance {
        self.rows
            .get(&key)
            .map(|row| row.clone())
            .unwrap_or_else(|| LeaveBalance::zero(key))
    }

    /// Lists an employee's rows for one year, ordered by policy id.
    pub fn list_for_employee(&self, employee_id: Uuid, year: i32) -> Vec<LeaveBalance> {
        let mut rows: Vec<LeaveBalance> = self
            .rows
            .iter()
            .filter(|row| row.key.employee_id == employee_id && row.key.year == year)
            .map(|row| row.clone())
            .collect();
        rows.sort_by_key(|row| row.key.policy_id);
        rows
    }

    /// Adds `amount` to one component and returns the new current balance.
    ///
    /// With [`BalanceCheck::NonNegative`] the delta is refused when the result
    /// would be below zero; the row is then left exactly as it was.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientBalance`] when the check fails, and
    /// [`LedgerError::Validation`] when the result would not fit in a `Decimal`.
    ///
    /// # Examples
    ///
    /// ```
    /// use leave_ledger::ledger::{BalanceLedger, InvalidationBus};
    /// use leave_ledger::models::{BalanceCheck, BalanceField, BalanceKey};
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let ledger = BalanceLedger::new(InvalidationBus::default());
    /// let key = BalanceKey::new(Uuid::new_v4(), Uuid::new_v4(), 2024);
    ///
    /// let balance = ledger
    ///     .apply_delta(key, BalanceField::Accrued, Decimal::new(2, 0), BalanceCheck::Unchecked)
    ///     .unwrap();
    /// assert_eq!(balance, Decimal::new(2, 0));
    ///
    /// let result = ledger.apply_delta(key, BalanceField::Used, Decimal::new(3, 0), BalanceCheck::NonNegative);
    /// assert!(result.is_err());
    /// ```
    pub fn apply_delta(
        &self,
        key: BalanceKey,
        field: BalanceField,
        amount: Decimal,
        check: BalanceCheck,
    ) -> LedgerResult<Decimal> {
        let (_, current) = self.apply_delta_unpublished(key, field, amount, check)?;
        self.bus.publish(Invalidation::Balance { key });
        Ok(current)
    }

    /// Applies a delta without publishing an invalidation. Returns the stored
    /// row and its current balance.
    ///
    /// Callers that change another record in the same step publish both
    /// notices themselves once everything has committed.
    pub(crate) fn apply_delta_unpublished(
        &self,
        key: BalanceKey,
        field: BalanceField,
        amount: Decimal,
        check: BalanceCheck,
    ) -> LedgerResult<(LeaveBalance, Decimal)> {
        let (updated, current) =
            self.replace_row(key, |row| checked_delta(row, field, amount, check))?;

        info!(
            employee_id = %key.employee_id,
            policy_id = %key.policy_id,
            year = key.year,
            field = ?field,
            amount = %amount,
            current_balance = %current,
            "Applied balance delta"
        );
        Ok((updated, current))
    }

    /// Sets the opening balance of a row. A row can be opened only once.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Validation`] if `opening` is negative, the row was
    /// already opened, or the resulting balance would not fit in a `Decimal`.
    pub fn open(&self, key: BalanceKey, opening: Decimal) -> LedgerResult<LeaveBalance> {
        if opening < Decimal::ZERO {
            return Err(LedgerError::validation(
                "opening_balance",
                "must not be negative",
            ));
        }

        let (opened, _) = self.replace_row(key, |row| {
            if row.opened {
                return Err(LedgerError::validation(
                    "opening_balance",
                    format!("already set for {}", key.year),
                ));
            }
            let mut next = row.clone();
            next.opening_balance = opening;
            next.opened = true;
            Ok(next)
        })?;

        info!(
            employee_id = %key.employee_id,
            policy_id = %key.policy_id,
            year = key.year,
            opening_balance = %opening,
            "Opened leave balance"
        );
        self.bus.publish(Invalidation::Balance { key });
        Ok(opened)
    }

    /// Overwrites the manual adjustment of a row. The result may be negative.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Validation`] if the resulting balance would not fit in
    /// a `Decimal`. The stored row is then unchanged.
    pub fn set_adjustment(
        &self,
        key: BalanceKey,
        adjustment: Decimal,
    ) -> LedgerResult<LeaveBalance> {
        let (updated, current) = self.replace_row(key, |row| {
            let mut next = row.clone();
            next.adjustment = adjustment;
            Ok(next)
        })?;

        if current < Decimal::ZERO {
            warn!(
                employee_id = %key.employee_id,
                policy_id = %key.policy_id,
                year = key.year,
                current_balance = %current,
                "Manual adjustment left balance negative"
            );
        }
        info!(
            employee_id = %key.employee_id,
            policy_id = %key.policy_id,
            year = key.year,
            adjustment = %adjustment,
            "Set balance adjustment"
        );
        self.bus.publish(Invalidation::Balance { key });
        Ok(updated)
    }

    /// Builds the next version of a row under its entry and stores it only if
    /// `build` succeeds and the result still has a representable balance.
    /// A missing row is treated as zero and stays missing on failure.
    fn replace_row<F>(&self, key: BalanceKey, build: F) -> LedgerResult<(LeaveBalance, Decimal)>
    where
        F: FnOnce(&LeaveBalance) -> LedgerResult<LeaveBalance>,
    {
        match self.rows.entry(key) {
            Entry::Occupied(mut occupied) => {
                let next = build(occupied.get())?;
                let current = next.current_balance()?;
                occupied.insert(next.clone());
                Ok((next, current))
            }
            Entry::Vacant(vacant) => {
                let next = build(&LeaveBalance::zero(key))?;
                let current = next.current_balance()?;
                vacant.insert(next.clone());
                Ok((next, current))
            }
        }
    }
}

fn checked_delta(
    row: &LeaveBalance,
    field: BalanceField,
    amount: Decimal,
    check: BalanceCheck,
) -> LedgerResult<LeaveBalance> {
    let next = row.with_delta(field, amount)?;
    if check == BalanceCheck::NonNegative && next.current_balance()? < Decimal::ZERO {
        return Err(LedgerError::InsufficientBalance {
            available: row.current_balance()?,
            requested: amount,
        });
    }
    Ok(next)
}
