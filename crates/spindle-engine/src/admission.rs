//! Spin admission.
//!
//! One `BEGIN IMMEDIATE` transaction per decision: entitlement is
//! recomputed from ledger facts, exactly one spin row is inserted with the
//! chosen source flag, prize stock is consumed with a guarded decrement,
//! and the tenant's monthly counter moves — all or nothing. Two admissions
//! racing for one remaining spin serialize on the write lock, so the loser
//! sees the winner's row and gets `QuotaExhausted`.

use rand::Rng;
use rusqlite::{Connection, TransactionBehavior};
use spindle_db::queries::{
    bonus as db_bonus, campaigns, overrides, prizes, spins, tenants, users, vouchers,
};
use spindle_quota::entitlement::{
    choose_source, compute_entitlement, window_start, Entitlement, QuotaSnapshot, SpinSource,
};
use spindle_types::campaign::Campaign;
use spindle_types::spin::{Prize, SpinRecord, Voucher};
use spindle_types::user::EndUser;
use spindle_types::{CampaignId, UserId};

use crate::notify::{self, NotificationSink, NotifyEvent};
use crate::{prize, store_err, usage, with_retry, EngineError, Result};

/// Result of an admitted spin.
#[derive(Clone, Debug)]
pub struct SpinOutcome {
    pub spin: SpinRecord,
    /// `None` when the wheel landed on no prize or stock ran out.
    pub prize: Option<Prize>,
    pub voucher: Option<Voucher>,
}

/// Admit one spin for `(user_id, campaign_id)` at `now`.
///
/// On success a winning outcome is notified fire-and-forget through
/// `sink` after the transaction commits.
///
/// # Errors
///
/// - [`EngineError::CampaignInactive`] — archived/inactive campaign or
///   non-serving tenant
/// - [`EngineError::AccessDenied`] — user and campaign in different tenants
/// - [`EngineError::QuotaExhausted`] — no entitlement left, or the
///   tenant's monthly spin budget is spent
/// - [`EngineError::TransientConflict`] — lock conflict after one retry
pub fn admit_spin<R: Rng>(
    conn: &mut Connection,
    sink: &dyn NotificationSink,
    user_id: UserId,
    campaign_id: CampaignId,
    now: u64,
    rng: &mut R,
) -> Result<SpinOutcome> {
    let outcome = with_retry(|| attempt(conn, user_id, campaign_id, now, rng))?;

    if let Some(won) = &outcome.prize {
        notify::dispatch(
            sink,
            user_id,
            NotifyEvent::PrizeWon,
            serde_json::json!({
                "campaign_id": campaign_id,
                "prize": won.label,
                "voucher_code": outcome.voucher.as_ref().map(|v| v.code.clone()),
            }),
        );
    }
    Ok(outcome)
}

fn attempt<R: Rng>(
    conn: &mut Connection,
    user_id: UserId,
    campaign_id: CampaignId,
    now: u64,
    rng: &mut R,
) -> Result<SpinOutcome> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(store_err)?;

    let campaign = campaigns::get(&tx, campaign_id)?;
    if !campaign.admits_spins() {
        return Err(EngineError::CampaignInactive);
    }

    let user = users::get(&tx, user_id)?;
    if user.tenant_id != campaign.tenant_id {
        return Err(EngineError::AccessDenied);
    }

    let tenant = tenants::get(&tx, campaign.tenant_id)?;
    if !tenant.is_serving() {
        return Err(EngineError::CampaignInactive);
    }

    // Monthly tenant budget, plan limit plus effective overrides.
    let month = usage::month_key(now)?;
    let usage_row = spindle_db::queries::usage::ensure(&tx, tenant.id, &month)?;
    if let Some(limit) = tenant.plan_spin_limit {
        let budget = u64::from(limit) + overrides::active_bonus_spins(&tx, tenant.id, now)?;
        if u64::from(usage_row.spins_used) >= budget {
            tracing::info!(tenant_id = tenant.id, %month, "monthly spin budget exhausted");
            return Err(EngineError::QuotaExhausted);
        }
    }

    let entitlement = read_entitlement(&tx, &user, &campaign, now)?;
    let source = choose_source(&entitlement).ok_or(EngineError::QuotaExhausted)?;
    let is_bonus = matches!(source, SpinSource::Bonus);

    // Prize selection and stock consumption stay inside this transaction
    // so a finite-stock prize can never be oversold.
    let available = prizes::available_for_campaign(&tx, campaign.id)?;
    let awarded = match prize::roll(&available, rng) {
        Some(picked) => {
            if prizes::try_consume_stock(&tx, picked.id)? {
                Some(picked.clone())
            } else {
                tracing::warn!(prize_id = picked.id, "prize stock gone, no-prize fallback");
                None
            }
        }
        None => None,
    };

    let spin_id = spins::insert(
        &tx,
        tenant.id,
        user.id,
        campaign.id,
        now,
        is_bonus,
        awarded.is_some(),
        awarded.as_ref().map(|p| p.id),
    )?;

    let voucher = match &awarded {
        Some(won) => {
            let code = prize::voucher_code(tenant.id, spin_id);
            let voucher_id =
                vouchers::issue(&tx, tenant.id, user.id, spin_id, won.id, &code, None, now)?;
            Some(vouchers::get(&tx, voucher_id)?)
        }
        None => None,
    };

    spindle_db::queries::usage::increment_spins_used(&tx, tenant.id, &month)?;
    let spin = spins::get(&tx, spin_id)?;
    tx.commit().map_err(store_err)?;

    tracing::info!(
        user_id,
        campaign_id,
        spin_id,
        bonus = is_bonus,
        won = spin.won_prize,
        "spin admitted"
    );
    Ok(SpinOutcome { spin, prize: awarded, voucher })
}

/// Remaining entitlement for `(user_id, campaign_id)` at `now`.
///
/// A pure read for display purposes; admission recomputes the snapshot
/// inside its own transaction.
pub fn compute_user_entitlement(
    conn: &Connection,
    user_id: UserId,
    campaign_id: CampaignId,
    now: u64,
) -> Result<Entitlement> {
    let campaign = campaigns::get(conn, campaign_id)?;
    let user = users::get(conn, user_id)?;
    if user.tenant_id != campaign.tenant_id {
        return Err(EngineError::AccessDenied);
    }
    read_entitlement(conn, &user, &campaign, now)
}

fn read_entitlement(
    conn: &Connection,
    user: &EndUser,
    campaign: &Campaign,
    now: u64,
) -> Result<Entitlement> {
    let snapshot = QuotaSnapshot {
        spin_limit: campaign.spin_limit,
        referrals_required_for_spin: campaign.referrals_required_for_spin,
        successful_referrals: user.successful_referrals,
        granted_bonus: db_bonus::granted_total(conn, user.id)?,
        regular_used: spins::regular_used_since(
            conn,
            user.id,
            campaign.id,
            window_start(now, campaign.spin_cooldown_hours),
        )?,
        bonus_used: spins::bonus_used(conn, user.id, campaign.id)?,
    };
    compute_entitlement(&snapshot).map_err(|e| EngineError::Internal(e.to_string()))
}
