//! Tenant records and plan limits.

use serde::{Deserialize, Serialize};

use crate::TenantId;

/// A tenant: the isolation boundary for every other entity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    /// Inactive tenants admit no operations.
    pub is_active: bool,
    /// Security lockout. Locked tenants admit no spins and no grants.
    pub is_locked: bool,
    /// Plan ceiling on campaigns created per calendar month. `None` = unlimited.
    pub plan_campaign_limit: Option<u32>,
    /// Plan ceiling on spins used per calendar month. `None` = unlimited.
    pub plan_spin_limit: Option<u32>,
    pub created_at: u64,
}

impl Tenant {
    /// Whether the tenant may currently serve end-user traffic.
    pub fn is_serving(&self) -> bool {
        self.is_active && !self.is_locked
    }
}

/// A time-bounded tenant-level grant on top of plan limits.
///
/// Distinct from per-user bonus grants: these are platform-side goodwill
/// credits (e.g. compensation for an outage) that raise the monthly budget.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LimitOverride {
    pub id: crate::OverrideId,
    pub tenant_id: TenantId,
    pub bonus_spins: u32,
    pub bonus_vouchers: u32,
    pub reason: String,
    pub granted_by: String,
    /// `None` = does not expire.
    pub expires_at: Option<u64>,
    pub is_active: bool,
    pub created_at: u64,
}

impl LimitOverride {
    /// Whether the override contributes to the budget at `now`.
    pub fn is_effective(&self, now: u64) -> bool {
        self.is_active && self.expires_at.map(|e| e > now).unwrap_or(true)
    }
}
