//! Spin events, prizes, and vouchers.

use serde::{Deserialize, Serialize};

use crate::{CampaignId, PrizeId, SpinId, TenantId, UserId, VoucherId};

/// An admitted spin. Immutable once written: spins are the ground truth
/// for quota accounting.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpinRecord {
    pub id: SpinId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub campaign_id: CampaignId,
    pub spin_date: u64,
    /// True if this spin consumed a bonus-pool unit rather than regular quota.
    pub is_referral_bonus: bool,
    pub won_prize: bool,
    pub prize_id: Option<PrizeId>,
}

/// A prize on a campaign's wheel.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Prize {
    pub id: PrizeId,
    pub campaign_id: CampaignId,
    pub label: String,
    /// Relative selection weight among active prizes.
    pub weight: u32,
    /// Remaining stock. `None` = unlimited.
    pub current_stock: Option<u32>,
    pub is_active: bool,
}

impl Prize {
    /// Whether the prize can currently be awarded.
    pub fn in_stock(&self) -> bool {
        self.is_active && self.current_stock.map(|s| s > 0).unwrap_or(true)
    }
}

/// A voucher issued for a winning spin.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Voucher {
    pub id: VoucherId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub spin_id: SpinId,
    pub prize_id: PrizeId,
    pub code: String,
    pub is_redeemed: bool,
    pub redeemed_at: Option<u64>,
    /// Voiding sets this to the void time; the transition is one-way.
    pub expires_at: Option<u64>,
    pub issued_at: u64,
}

impl Voucher {
    /// Whether the voucher can still be redeemed at `now`.
    pub fn is_redeemable(&self, now: u64) -> bool {
        !self.is_redeemed && self.expires_at.map(|e| e > now).unwrap_or(true)
    }
}
