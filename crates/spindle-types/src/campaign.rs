//! Campaign records.

use serde::{Deserialize, Serialize};

use crate::{CampaignId, TenantId};

/// A promotional campaign owned by exactly one tenant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub tenant_id: TenantId,
    pub name: String,
    /// Regular spins allowed per cooldown window.
    pub spin_limit: u32,
    /// Sliding window length in hours for the regular quota.
    pub spin_cooldown_hours: u32,
    /// Referrals needed to earn one bonus spin. `0` disables referral bonuses.
    pub referrals_required_for_spin: u32,
    pub is_active: bool,
    /// Archived campaigns admit no new spins.
    pub is_archived: bool,
    pub created_at: u64,
}

impl Campaign {
    /// Whether the campaign currently admits spins.
    pub fn admits_spins(&self) -> bool {
        self.is_active && !self.is_archived
    }

    /// Cooldown window length in seconds.
    pub fn cooldown_secs(&self) -> u64 {
        u64::from(self.spin_cooldown_hours) * crate::SECONDS_PER_HOUR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archived_campaign_admits_nothing() {
        let mut c = Campaign {
            id: 1,
            tenant_id: 1,
            name: "launch".into(),
            spin_limit: 1,
            spin_cooldown_hours: 24,
            referrals_required_for_spin: 3,
            is_active: true,
            is_archived: false,
            created_at: 0,
        };
        assert!(c.admits_spins());
        c.is_archived = true;
        assert!(!c.admits_spins());
    }

    #[test]
    fn test_cooldown_secs() {
        let c = Campaign {
            id: 1,
            tenant_id: 1,
            name: "x".into(),
            spin_limit: 1,
            spin_cooldown_hours: 24,
            referrals_required_for_spin: 0,
            is_active: true,
            is_archived: false,
            created_at: 0,
        };
        assert_eq!(c.cooldown_secs(), 86_400);
    }
}
