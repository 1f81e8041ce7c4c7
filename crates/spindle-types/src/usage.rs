//! Per-tenant monthly usage counters.

use serde::{Deserialize, Serialize};

use crate::TenantId;

/// Usage counters for one tenant in one calendar month.
///
/// Created lazily on first access within the month; the first access after
/// a month boundary is the entire "reset" — there is no scheduled sweep.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub tenant_id: TenantId,
    /// Calendar month key, `YYYY-MM`.
    pub month: String,
    pub campaigns_created: u32,
    pub spins_used: u32,
}
