//! Bonus accrual.
//!
//! Three independent paths feed one entitlement: referral milestones,
//! verified social tasks, and direct manager grants. Referral credits are
//! idempotent per referred user; manager-side grants append tagged ledger
//! entries and write exactly one audit row in the same transaction.

use rusqlite::{Connection, TransactionBehavior};
use spindle_db::queries::{audit as db_audit, bonus as db_bonus, managers, referrals, tenants, users};
use spindle_types::staff::{Manager, ManagerAction};
use spindle_types::user::BonusSource;
use spindle_types::{CompletionId, ManagerId, TenantId, UserId};

use crate::notify::{self, NotificationSink, NotifyEvent};
use crate::{store_err, with_retry, EngineError, Result};

/// Balance summary after a grant.
#[derive(Clone, Copy, Debug)]
pub struct NewBalance {
    pub user_id: UserId,
    /// Sum of the user's bonus-ledger entries after the grant.
    pub granted_total: u64,
}

/// Credit the referrer of `referred_user_id`, exactly once.
///
/// Returns `true` when the credit was applied, `false` when the user has
/// no referrer or was already credited (re-processing is a no-op).
///
/// # Errors
///
/// - [`EngineError::AccessDenied`] — user outside `tenant_id`, or a
///   cross-tenant referrer link
pub fn credit_referral(
    conn: &mut Connection,
    tenant_id: TenantId,
    referred_user_id: UserId,
    now: u64,
) -> Result<bool> {
    with_retry(|| {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(store_err)?;

        let referred = users::get(&tx, referred_user_id)?;
        if referred.tenant_id != tenant_id {
            return Err(EngineError::AccessDenied);
        }
        let Some(referrer_id) = referred.referred_by_id else {
            return Ok(false);
        };
        let referrer = users::get(&tx, referrer_id)?;
        if referrer.tenant_id != referred.tenant_id {
            // Cross-tenant referral links are invalid by construction.
            return Err(EngineError::AccessDenied);
        }

        let credited = referrals::credit_once(&tx, tenant_id, referrer_id, referred_user_id, now)?;
        tx.commit().map_err(store_err)?;

        if credited {
            tracing::info!(referrer_id, referred_user_id, "referral credited");
        }
        Ok(credited)
    })
}

/// Direct manager grant (the standee / in-person path).
///
/// Enforces both manager caps and writes the ledger entry plus exactly one
/// GRANT audit row atomically.
///
/// # Errors
///
/// - [`EngineError::CapExceeded`] — `amount` over the per-approval cap, or
///   cumulative manager grants to this user over `max_spins_per_user`
/// - [`EngineError::AccessDenied`] — inactive manager, cross-tenant user,
///   or non-serving tenant
pub fn grant_bonus(
    conn: &mut Connection,
    sink: &dyn NotificationSink,
    manager_id: ManagerId,
    user_id: UserId,
    amount: u32,
    reason: &str,
    now: u64,
) -> Result<NewBalance> {
    let balance = with_retry(|| {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(store_err)?;

        let manager = managers::get(&tx, manager_id)?;
        if !manager.is_active {
            return Err(EngineError::AccessDenied);
        }
        let user = users::get(&tx, user_id)?;
        if user.tenant_id != manager.tenant_id {
            return Err(EngineError::AccessDenied);
        }
        let tenant = tenants::get(&tx, manager.tenant_id)?;
        if !tenant.is_serving() {
            return Err(EngineError::AccessDenied);
        }

        check_caps(&tx, &manager, user_id, amount)?;

        db_bonus::append_entry(
            &tx,
            manager.tenant_id,
            user_id,
            BonusSource::DirectGrant,
            amount,
            Some(manager_id),
            None,
            Some(reason),
            now,
        )?;
        db_audit::append(
            &tx,
            manager.tenant_id,
            manager_id,
            ManagerAction::Grant,
            None,
            Some(user_id),
            amount,
            Some(reason),
            now,
        )?;

        let granted_total = db_bonus::granted_total(&tx, user_id)?;
        tx.commit().map_err(store_err)?;

        tracing::info!(manager_id, user_id, amount, "bonus granted");
        Ok(NewBalance { user_id, granted_total })
    })?;

    notify::dispatch(
        sink,
        user_id,
        NotifyEvent::BonusGranted,
        serde_json::json!({ "amount": amount, "reason": reason }),
    );
    Ok(balance)
}

/// Hard cap check for direct grants.
fn check_caps(conn: &Connection, manager: &Manager, user_id: UserId, amount: u32) -> Result<()> {
    if amount > manager.max_bonus_spins_per_approval {
        return Err(EngineError::CapExceeded {
            limit: u64::from(manager.max_bonus_spins_per_approval),
            requested: u64::from(amount),
        });
    }
    let cumulative = db_bonus::manager_granted_total(conn, user_id)?;
    let requested = cumulative.saturating_add(u64::from(amount));
    if requested > u64::from(manager.max_spins_per_user) {
        return Err(EngineError::CapExceeded {
            limit: u64::from(manager.max_spins_per_user),
            requested,
        });
    }
    Ok(())
}

/// Apply a verified-task reward, clamped to the manager's caps.
///
/// Unlike direct grants, approvals do not fail on a cap: the reward is
/// clamped to the per-approval ceiling and the user's remaining headroom,
/// and the actually-granted amount is returned for the audit row.
pub(crate) fn apply_task_reward(
    conn: &Connection,
    manager: &Manager,
    user_id: UserId,
    completion_id: CompletionId,
    reward: u32,
    now: u64,
) -> Result<u32> {
    let per_approval = reward.min(manager.max_bonus_spins_per_approval);
    let cumulative = db_bonus::manager_granted_total(conn, user_id)?;
    let headroom = u64::from(manager.max_spins_per_user).saturating_sub(cumulative);
    let granted = u64::from(per_approval).min(headroom) as u32;

    if granted > 0 {
        db_bonus::append_entry(
            conn,
            manager.tenant_id,
            user_id,
            BonusSource::TaskVerification,
            granted,
            Some(manager.id),
            Some(completion_id),
            None,
            now,
        )?;
    }
    Ok(granted)
}
