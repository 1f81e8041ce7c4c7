//! Entitlement computation and spin-source preference.
//!
//! Two pools feed a user's entitlement:
//!
//! - **Regular quota** — `spin_limit` spins per sliding cooldown window.
//! - **Bonus pool** — earned from referrals and manager grants. Not
//!   cooldown-bound: once earned, bonus spins are available immediately
//!   and do not expire.
//!
//! Regular quota is consumed before bonus: regular spins expire with the
//! window and would otherwise be wasted.

use serde::{Deserialize, Serialize};

use crate::{QuotaError, Result};

/// Seconds per hour.
const SECONDS_PER_HOUR: u64 = 3600;

/// Ledger facts for one (user, campaign) pair, read inside the same
/// transaction that will record the spin.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct QuotaSnapshot {
    /// Campaign's regular spins per cooldown window.
    pub spin_limit: u32,
    /// Referrals needed per bonus spin. `0` disables referral bonuses.
    pub referrals_required_for_spin: u32,
    /// The user's credited referral count.
    pub successful_referrals: u32,
    /// Sum of the user's bonus-ledger entries (manager grants, task
    /// verifications, overrides).
    pub granted_bonus: u64,
    /// Non-bonus spins inside the current window.
    pub regular_used: u32,
    /// Bonus spins ever taken on this campaign.
    pub bonus_used: u32,
}

/// Remaining entitlement for one (user, campaign) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub regular_remaining: u64,
    pub bonus_remaining: u64,
}

impl Entitlement {
    /// Total spins the user may take right now.
    pub fn total(&self) -> u64 {
        self.regular_remaining.saturating_add(self.bonus_remaining)
    }
}

/// Which pool an admitted spin consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinSource {
    Regular,
    Bonus,
}

/// Compute the remaining entitlement from a snapshot.
///
/// # Errors
///
/// - [`QuotaError::Overflow`] if the earned bonus total overflows
pub fn compute_entitlement(snap: &QuotaSnapshot) -> Result<Entitlement> {
    let regular_remaining = u64::from(snap.spin_limit.saturating_sub(snap.regular_used));

    let referral_bonus = if snap.referrals_required_for_spin == 0 {
        0
    } else {
        u64::from(snap.successful_referrals / snap.referrals_required_for_spin)
    };

    let bonus_earned = referral_bonus
        .checked_add(snap.granted_bonus)
        .ok_or(QuotaError::Overflow)?;
    let bonus_remaining = bonus_earned.saturating_sub(u64::from(snap.bonus_used));

    Ok(Entitlement {
        regular_remaining,
        bonus_remaining,
    })
}

/// Pick the pool the next spin should consume, or `None` when the
/// entitlement is exhausted. Regular before bonus.
pub fn choose_source(entitlement: &Entitlement) -> Option<SpinSource> {
    if entitlement.regular_remaining > 0 {
        Some(SpinSource::Regular)
    } else if entitlement.bonus_remaining > 0 {
        Some(SpinSource::Bonus)
    } else {
        None
    }
}

/// Start of the sliding cooldown window ending at `now`.
pub fn window_start(now: u64, cooldown_hours: u32) -> u64 {
    now.saturating_sub(u64::from(cooldown_hours) * SECONDS_PER_HOUR)
}
