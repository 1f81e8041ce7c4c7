//! Campaign creation against plan limits.

use rusqlite::{Connection, TransactionBehavior};
use spindle_db::queries::{campaigns as db_campaigns, tenants, usage as db_usage};
use spindle_types::campaign::Campaign;
use spindle_types::TenantId;

use crate::{store_err, usage, with_retry, EngineError, Result};

/// Create a campaign, counting it against the tenant's monthly plan limit.
///
/// # Errors
///
/// - [`EngineError::CapExceeded`] — the month's `plan_campaign_limit` is
///   already used up
/// - [`EngineError::AccessDenied`] — tenant inactive or locked
pub fn create_campaign(
    conn: &mut Connection,
    tenant_id: TenantId,
    name: &str,
    spin_limit: u32,
    spin_cooldown_hours: u32,
    referrals_required_for_spin: u32,
    now: u64,
) -> Result<Campaign> {
    with_retry(|| {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(store_err)?;

        let tenant = tenants::get(&tx, tenant_id)?;
        if !tenant.is_serving() {
            return Err(EngineError::AccessDenied);
        }

        let month = usage::month_key(now)?;
        let usage_row = db_usage::ensure(&tx, tenant_id, &month)?;
        if let Some(limit) = tenant.plan_campaign_limit {
            if usage_row.campaigns_created >= limit {
                return Err(EngineError::CapExceeded {
                    limit: u64::from(limit),
                    requested: u64::from(usage_row.campaigns_created) + 1,
                });
            }
        }

        let id = db_campaigns::insert(
            &tx,
            tenant_id,
            name,
            spin_limit,
            spin_cooldown_hours,
            referrals_required_for_spin,
            now,
        )?;
        db_usage::increment_campaigns_created(&tx, tenant_id, &month)?;
        let campaign = db_campaigns::get(&tx, id)?;
        tx.commit().map_err(store_err)?;

        tracing::info!(campaign_id = campaign.id, tenant_id, "campaign created");
        Ok(campaign)
    })
}
