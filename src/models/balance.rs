//! Leave balance model.
//!
//! A balance is stored as its four components only. The current balance is
//! derived on every read and is never persisted alongside them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};

/// Composite key of a balance row: one row per employee, policy and year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BalanceKey {
    /// The employee who owns the balance.
    pub employee_id: Uuid,
    /// The policy the balance is tracked against.
    pub policy_id: Uuid,
    /// The calendar year.
    pub year: i32,
}

impl BalanceKey {
    /// Creates a new balance key.
    pub fn new(employee_id: Uuid, policy_id: Uuid, year: i32) -> Self {
        Self {
            employee_id,
            policy_id,
            year,
        }
    }
}

/// The components of a balance that may be moved by a delta.
///
/// The opening balance is absent on purpose: it is set once, never adjusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceField {
    /// Days earned during the year.
    Accrued,
    /// Days consumed by approved leave.
    Used,
    /// Manual corrections and applied comp-off.
    Adjustment,
}

impl BalanceField {
    /// The field's name as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            BalanceField::Accrued => "accrued",
            BalanceField::Used => "used",
            BalanceField::Adjustment => "adjustment",
        }
    }
}

/// Whether a delta may leave the current balance below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceCheck {
    /// Reject the delta if the resulting balance is negative.
    NonNegative,
    /// Apply the delta unconditionally.
    Unchecked,
}

/// One employee's leave entitlement for one policy and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// The row's composite key.
    pub key: BalanceKey,
    /// Days credited at the start of the year.
    pub opening_balance: Decimal,
    /// Days earned during the year.
    pub accrued: Decimal,
    /// Days consumed by approved leave.
    pub used: Decimal,
    /// Manual corrections and applied comp-off.
    pub adjustment: Decimal,
    /// Whether the opening balance has been set.
    #[serde(default)]
    pub opened: bool,
}

impl LeaveBalance {
    /// Creates an all-zero balance, the value of a row that does not exist yet.
    pub fn zero(key: BalanceKey) -> Self {
        Self {
            key,
            opening_balance: Decimal::ZERO,
            accrued: Decimal::ZERO,
            used: Decimal::ZERO,
            adjustment: Decimal::ZERO,
            opened: false,
        }
    }

    /// Returns `opening + accrued - used + adjustment`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Validation`] if the sum does not fit in a `Decimal`.
    ///
    /// # Examples
    ///
    /// ```
    /// use leave_ledger::models::{BalanceKey, LeaveBalance};
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let mut balance = LeaveBalance::zero(BalanceKey::new(Uuid::nil(), Uuid::nil(), 2024));
    /// balance.opening_balance = Decimal::new(12, 0);
    /// balance.used = Decimal::new(3, 0);
    /// assert_eq!(balance.current_balance().unwrap(), Decimal::new(9, 0));
    /// ```
    pub fn current_balance(&self) -> LedgerResult<Decimal> {
        self.opening_balance
            .checked_add(self.accrued)
            .and_then(|sum| sum.checked_sub(self.used))
            .and_then(|sum| sum.checked_add(self.adjustment))
            .ok_or_else(|| out_of_range("current_balance"))
    }

    /// Returns the current value of one delta-adjustable component.
    pub fn component(&self, field: BalanceField) -> Decimal {
        match field {
            BalanceField::Accrued => self.accrued,
            BalanceField::Used => self.used,
            BalanceField::Adjustment => self.adjustment,
        }
    }

    /// Returns a copy with `amount` added to `field`.
    ///
    /// The copy is only returned if its current balance is still
    /// representable, so a row built this way can always be read back.
    pub fn with_delta(&self, field: BalanceField, amount: Decimal) -> LedgerResult<Self> {
        let mut next = self.clone();
        let slot = match field {
            BalanceField::Accrued => &mut next.accrued,
            BalanceField::Used => &mut next.used,
            BalanceField::Adjustment => &mut next.adjustment,
        };
        *slot = slot
            .checked_add(amount)
            .ok_or_else(|| out_of_range(field.as_str()))?;
        next.current_balance()?;
        Ok(next)
    }
}

fn out_of_range(field: &str) -> LedgerError {
    LedgerError::validation(field, "amount is out of range")
}

/// Read model of a balance including the derived current balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceView {
    /// The employee who owns the balance.
    pub employee_id: Uuid,
    /// The policy the balance is tracked against.
    pub policy_id: Uuid,
    /// The calendar year.
    pub year: i32,
    /// Days credited at the start of the year.
    pub opening_balance: Decimal,
    /// Days earned during the year.
    pub accrued: Decimal,
    /// Days consumed by approved leave.
    pub used: Decimal,
    /// Manual corrections and applied comp-off.
    pub adjustment: Decimal,
    /// `opening_balance + accrued - used + adjustment`.
    pub current_balance: Decimal,
}

impl TryFrom<&LeaveBalance> for BalanceView {
    type Error = LedgerError;

    fn try_from(balance: &LeaveBalance) -> LedgerResult<Self> {
        Ok(BalanceView {
            employee_id: balance.key.employee_id,
            policy_id: balance.key.policy_id,
            year: balance.key.year,
            opening_balance: balance.opening_balance,
            accrued: balance.accrued,
            used: balance.used,
            adjustment: balance.adjustment,
            current_balance: balance.current_balance()?,
        })
    }
}
