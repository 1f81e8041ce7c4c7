//! End-user records and bonus ledger entries.

use serde::{Deserialize, Serialize};

use crate::{CompletionId, ManagerId, TenantId, UserId};

/// An end-user of a tenant's campaigns. Created on first interaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EndUser {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub phone: String,
    /// Derived from the phone number; unique per tenant.
    pub referral_code: String,
    /// The user who referred this one. Same tenant only.
    pub referred_by_id: Option<UserId>,
    /// Monotonic counter, materialized from the referral-credit ledger.
    pub successful_referrals: u32,
    pub created_at: u64,
}

/// Where a bonus-ledger entry came from.
///
/// Bonus spins from each source are recorded as separate tagged entries and
/// summed on read, so a double-credit from one source cannot hide inside a
/// mutable counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusSource {
    TaskVerification,
    DirectGrant,
    Override,
}

impl BonusSource {
    /// Stable column value for the ledger row.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskVerification => "task_verification",
            Self::DirectGrant => "direct_grant",
            Self::Override => "override",
        }
    }

    /// Parse a ledger column value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "task_verification" => Some(Self::TaskVerification),
            "direct_grant" => Some(Self::DirectGrant),
            "override" => Some(Self::Override),
            _ => None,
        }
    }
}

/// One bonus-ledger entry. Entries are append-only; the user's granted
/// bonus pool is the sum of their entries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BonusEntry {
    pub id: i64,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub source: BonusSource,
    pub amount: u32,
    pub manager_id: Option<ManagerId>,
    pub task_completion_id: Option<CompletionId>,
    pub reason: Option<String>,
    pub created_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonus_source_round_trip() {
        for source in [
            BonusSource::TaskVerification,
            BonusSource::DirectGrant,
            BonusSource::Override,
        ] {
            assert_eq!(BonusSource::parse(source.as_str()), Some(source));
        }
        assert_eq!(BonusSource::parse("referral"), None);
    }
}
