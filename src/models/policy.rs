//! Leave policy model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named category of leave (casual, sick, ...) with an annual quota.
///
/// Deactivating a policy hides it from new requests; balances and requests
/// that already reference it stay valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeavePolicy {
    /// Unique identifier for the policy.
    pub id: Uuid,
    /// The organization that owns the policy.
    pub organization_id: Uuid,
    /// Short code, unique within the organization (e.g., "CL").
    pub code: String,
    /// Human-readable name (e.g., "Casual Leave").
    pub display_name: String,
    /// Days credited as opening balance at year start.
    pub annual_quota: Decimal,
    /// Whether new requests may be filed against this policy.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}
