//! Per-organization catalog of leave policies.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::models::LeavePolicy;

use super::events::{Invalidation, InvalidationBus};

/// Input for creating a policy.
#[derive(Debug, Clone)]
pub struct NewPolicy {
    /// The owning organization.
    pub organization_id: Uuid,
    /// Short code, unique within the organization.
    pub code: String,
    /// Human-readable name.
    pub display_name: String,
    /// Days credited as opening balance at year start.
    pub annual_quota: Decimal,
}

/// Registry of leave policies.
///
/// Codes are normalized (trimmed, upper-cased) and unique per organization.
/// Uniqueness is claimed through the code index's entry API, so two concurrent
/// creates of the same code cannot both succeed.
#[derive(Debug)]
pub struct PolicyRegistry {
    policies: DashMap<Uuid, LeavePolicy>,
    codes: DashMap<(Uuid, String), Uuid>,
    bus: InvalidationBus,
}

impl PolicyRegistry {
    /// Creates an empty registry publishing on `bus`.
    pub fn new(bus: InvalidationBus) -> Self {
        Self {
            policies: DashMap::new(),
            codes: DashMap::new(),
            bus,
        }
    }

    /// Creates an active policy with a fresh id.
    pub fn create(&self, new: NewPolicy) -> LedgerResult<LeavePolicy> {
        self.insert(LeavePolicy {
            id: Uuid::new_v4(),
            organization_id: new.organization_id,
            code: new.code,
            display_name: new.display_name,
            annual_quota: new.annual_quota,
            is_active: true,
        })
    }

    /// Stores a fully specified policy (used when seeding from configuration).
    ///
    /// # Errors
    ///
    /// [`LedgerError::Validation`] if the code or name is blank, the quota is
    /// negative, or the code or id is already taken.
    pub fn insert(&self, mut policy: LeavePolicy) -> LedgerResult<LeavePolicy> {
        policy.code = policy.code.trim().to_uppercase();
        policy.display_name = policy.display_name.trim().to_string();

        if policy.code.is_empty() {
            return Err(LedgerError::validation("code", "must not be blank"));
        }
        if policy.display_name.is_empty() {
            return Err(LedgerError::validation("display_name", "must not be blank"));
        }
        if policy.annual_quota < Decimal::ZERO {
            return Err(LedgerError::validation(
                "annual_quota",
                "must not be negative",
            ));
        }
        if self.policies.contains_key(&policy.id) {
            return Err(LedgerError::validation("id", "policy already exists"));
        }

        match self.codes.entry((policy.organization_id, policy.code.clone())) {
            Entry::Occupied(_) => {
                return Err(LedgerError::validation(
                    "code",
                    format!("'{}' is already used in this organization", policy.code),
                ));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(policy.id);
            }
        }
        self.policies.insert(policy.id, policy.clone());

        info!(
            policy_id = %policy.id,
            organization_id = %policy.organization_id,
            code = %policy.code,
            annual_quota = %policy.annual_quota,
            "Created leave policy"
        );
        self.bus.publish(Invalidation::Policy { id: policy.id });
        Ok(policy)
    }

    /// Looks up a policy by id.
    pub fn get(&self, id: Uuid) -> LedgerResult<LeavePolicy> {
        self.policies
            .get(&id)
            .map(|p| p.clone())
            .ok_or(LedgerError::NotFound {
                entity: "leave policy",
            })
    }

    /// Looks up a policy by id, treating another organization's policy as missing.
    pub fn get_in_org(&self, id: Uuid, organization_id: Uuid) -> LedgerResult<LeavePolicy> {
        self.get(id)
            .ok()
            .filter(|p| p.organization_id == organization_id)
            .ok_or(LedgerError::NotFound {
                entity: "leave policy",
            })
    }

    /// Looks up a policy by its code within an organization.
    pub fn find_by_code(&self, organization_id: Uuid, code: &str) -> LedgerResult<LeavePolicy> {
        let id = self
            .codes
            .get(&(organization_id, code.trim().to_uppercase()))
            .map(|id| *id)
            .ok_or(LedgerError::NotFound {
                entity: "leave policy",
            })?;
        self.get(id)
    }

    /// Lists an organization's policies ordered by code.
    pub fn list(&self, organization_id: Uuid, include_inactive: bool) -> Vec<LeavePolicy> {
        let mut policies: Vec<LeavePolicy> = self
            .policies
            .iter()
            .filter(|p| p.organization_id == organization_id)
            .filter(|p| include_inactive || p.is_active)
            .map(|p| p.clone())
            .collect();
        policies.sort_by(|a, b| a.code.cmp(&b.code));
        policies
    }

    /// Hides a policy from new requests. Deactivating twice is harmless.
    pub fn deactivate(&self, id: Uuid) -> LedgerResult<LeavePolicy> {
        let policy = {
            let mut policy = self.policies.get_mut(&id).ok_or(LedgerError::NotFound {
                entity: "leave policy",
            })?;
            policy.is_active = false;
            policy.clone()
        };

        info!(policy_id = %id, code = %policy.code, "Deactivated leave policy");
        self.bus.publish(Invalidation::Policy { id });
        Ok(policy)
    }
}
