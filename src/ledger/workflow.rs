//! Leave request workflow.
//!
//! Submission creates a pending request without touching the balance. The
//! deduction happens at approval and is reversed by cancelling an approved
//! request. Each transition holds the request's map entry from the status
//! check until the new status is written, and the balance delta happens inside
//! that window, so the pair commits together or not at all.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    BalanceCheck, BalanceField, BalanceKey, LeaveBalance, LeaveRequest, LeaveStatus,
    inclusive_days,
};

use super::balance::BalanceLedger;
use super::directory::EmployeeDirectory;
use super::events::{Invalidation, InvalidationBus};
use super::policy_registry::PolicyRegistry;

/// Input for submitting a leave request.
#[derive(Debug, Clone)]
pub struct SubmitLeave {
    /// The requesting employee.
    pub employee_id: Uuid,
    /// The policy to charge.
    pub policy_id: Uuid,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Free-text justification.
    pub reason: String,
}

/// The leave request state machine.
#[derive(Debug)]
pub struct LeaveWorkflow {
    directory: Arc<EmployeeDirectory>,
    policies: Arc<PolicyRegistry>,
    ledger: Arc<BalanceLedger>,
    requests: DashMap<Uuid, LeaveRequest>,
    bus: InvalidationBus,
}

impl LeaveWorkflow {
    /// Creates a workflow over the given collaborators.
    pub fn new(
        directory: Arc<EmployeeDirectory>,
        policies: Arc<PolicyRegistry>,
        ledger: Arc<BalanceLedger>,
        bus: InvalidationBus,
    ) -> Self {
        Self {
            directory,
            policies,
            ledger,
            requests: DashMap::new(),
            bus,
        }
    }

    /// Files a new pending request.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Validation`] if `end_date` precedes `start_date`, the
    ///   reason is blank, or the policy is inactive.
    /// - [`LedgerError::NotFound`] if the employee is unknown or the policy
    ///   does not belong to the employee's organization.
    pub fn submit(&self, input: SubmitLeave) -> LedgerResult<LeaveRequest> {
        if input.end_date < input.start_date {
            return Err(LedgerError::validation(
                "end_date",
                "must not be before start_date",
            ));
        }
        let reason = input.reason.trim();
        if reason.is_empty() {
            return Err(LedgerError::validation("reason", "must not be blank"));
        }

        let employee = self.directory.get(input.employee_id)?;
        let policy = self
            .policies
            .get_in_org(input.policy_id, employee.organization_id)?;
        if !policy.is_active {
            return Err(LedgerError::validation(
                "policy_id",
                format!("policy '{}' is inactive", policy.code),
            ));
        }

        let request = LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: employee.id,
            policy_id: policy.id,
            leave_type: policy.code.clone(),
            start_date: input.start_date,
            end_date: input.end_date,
            total_days: inclusive_days(input.start_date, input.end_date),
            reason: reason.to_string(),
            status: LeaveStatus::Pending,
            created_at: Utc::now(),
        };
        let available = self.balance_for(&request).current_balance()?;
        self.requests.insert(request.id, request.clone());

        if available < request.total_days {
            // Not reserved at submission; approval will enforce it.
            warn!(
                request_id = %request.id,
                available = %available,
                total_days = %request.total_days,
                "Leave request exceeds current balance"
            );
        }
        info!(
            request_id = %request.id,
            employee_id = %request.employee_id,
            leave_type = %request.leave_type,
            total_days = %request.total_days,
            "Submitted leave request"
        );
        self.bus.publish(Invalidation::LeaveRequest { id: request.id });
        Ok(request)
    }

    /// Approves a pending request and deducts its days from the balance.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidTransition`] unless the request is pending.
    /// - [`LedgerError::InsufficientBalance`] if the deduction would leave the
    ///   balance negative; the request stays pending.
    pub fn approve(&self, request_id: Uuid) -> LedgerResult<LeaveRequest> {
        self.transition(request_id, LeaveStatus::Approved, "approve", |request| {
            Some((BalanceCheck::NonNegative, request.total_days))
        })
    }

    /// Rejects a pending request. The balance is not touched.
    pub fn reject(&self, request_id: Uuid) -> LedgerResult<LeaveRequest> {
        self.transition(request_id, LeaveStatus::Rejected, "reject", |_| None)
    }

    /// Cancels a pending or approved request.
    ///
    /// Cancelling an approved request gives its days back.
    pub fn cancel(&self, request_id: Uuid) -> LedgerResult<LeaveRequest> {
        self.transition(request_id, LeaveStatus::Cancelled, "cancel", |request| {
            (request.status == LeaveStatus::Approved)
                .then(|| (BalanceCheck::Unchecked, -request.total_days))
        })
    }

    /// Looks up a request.
    pub fn get(&self, request_id: Uuid) -> LedgerResult<LeaveRequest> {
        self.requests
            .get(&request_id)
            .map(|r| r.clone())
            .ok_or(LedgerError::NotFound {
                entity: "leave request",
            })
    }

    /// Lists an employee's requests, newest first, optionally by status.
    pub fn list_for_employee(
        &self,
        employee_id: Uuid,
        status: Option<LeaveStatus>,
    ) -> Vec<LeaveRequest> {
        let mut requests: Vec<LeaveRequest> = self
            .requests
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .filter(|r| status.is_none_or(|s| r.status == s))
            .map(|r| r.clone())
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
    }

    /// The balance row a request is charged to.
    pub fn balance_for(&self, request: &LeaveRequest) -> LeaveBalance {
        self.ledger.get_balance(balance_key(request))
    }

    /// Runs one status transition.
    ///
    /// `used_delta` decides, from the request as it was before the transition,
    /// whether `used` moves and under which check.
    fn transition<F>(
        &self,
        request_id: Uuid,
        next: LeaveStatus,
        action: &'static str,
        used_delta: F,
    ) -> LedgerResult<LeaveRequest>
    where
        F: FnOnce(&LeaveRequest) -> Option<(BalanceCheck, Decimal)>,
    {
        let (updated, touched) = {
            let mut request = self
                .requests
                .get_mut(&request_id)
                .ok_or(LedgerError::NotFound {
                    entity: "leave request",
                })?;

            if !request.status.can_transition_to(next) {
                warn!(
                    request_id = %request_id,
                    status = %request.status,
                    action,
                    "Rejected leave request transition"
                );
                return Err(LedgerError::InvalidTransition {
                    request_id,
                    status: request.status,
                    action,
                });
            }

            let touched = match used_delta(&*request) {
                Some((check, amount)) => {
                    let key = balance_key(&*request);
                    self.ledger
                        .apply_delta_unpublished(key, BalanceField::Used, amount, check)?;
                    Some(key)
                }
                None => None,
            };

            request.status = next;
            (request.clone(), touched)
        };

        info!(
            request_id = %request_id,
            employee_id = %updated.employee_id,
            status = %updated.status,
            total_days = %updated.total_days,
            "Leave request {}", action
        );
        self.bus.publish(Invalidation::LeaveRequest { id: request_id });
        if let Some(key) = touched {
            self.bus.publish(Invalidation::Balance { key });
        }
        Ok(updated)
    }
}

fn balance_key(request: &LeaveRequest) -> BalanceKey {
    BalanceKey::new(request.employee_id, request.policy_id, request.balance_year())
}
