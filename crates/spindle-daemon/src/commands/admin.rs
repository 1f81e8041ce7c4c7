//! Provisioning command handlers (tenants, campaigns, prizes, staff).

use std::sync::Arc;

use serde_json::Value;
use spindle_db::queries::{campaigns, overrides, prizes, tasks, tenants};
use spindle_engine as engine;

use crate::resolver;
use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Create a tenant.
pub async fn create_tenant(state: &Arc<DaemonState>, params: &Value) -> Result {
    let name = params
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("name required"))?;
    let plan_campaign_limit = params
        .get("plan_campaign_limit")
        .and_then(|v| v.as_u64())
        .map(|v| v as u32);
    let plan_spin_limit = params
        .get("plan_spin_limit")
        .and_then(|v| v.as_u64())
        .map(|v| v as u32);

    let db = state.db.lock().await;
    let id = tenants::insert(&db, name, plan_campaign_limit, plan_spin_limit, state.now())
        .map_err(|e| RpcError::internal_error(&format!("db error: {e}")))?;

    Ok(serde_json::json!({ "tenant_id": id }))
}

/// Lock or unlock a tenant.
pub async fn set_tenant_lock(state: &Arc<DaemonState>, params: &Value) -> Result {
    let tenant_id = params
        .get("tenant_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("tenant_id required"))?;
    let locked = params
        .get("locked")
        .and_then(|v| v.as_bool())
        .ok_or_else(|| RpcError::invalid_params("locked required"))?;

    let db = state.db.lock().await;
    tenants::set_locked(&db, tenant_id, locked)
        .map_err(|e| RpcError::internal_error(&format!("db error: {e}")))?;

    Ok(serde_json::json!({ "tenant_id": tenant_id, "locked": locked }))
}

/// Create a campaign; omitted limits come from config defaults.
pub async fn create_campaign(state: &Arc<DaemonState>, params: &Value) -> Result {
    let token = params
        .get("token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("token required"))?;
    let name = params
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("name required"))?;

    let defaults = &state.config.campaign_defaults;
    let spin_limit = params
        .get("spin_limit")
        .and_then(|v| v.as_u64())
        .map(|v| v as u32)
        .unwrap_or(defaults.spin_limit);
    let cooldown = params
        .get("spin_cooldown_hours")
        .and_then(|v| v.as_u64())
        .map(|v| v as u32)
        .unwrap_or(defaults.spin_cooldown_hours);
    let referrals = params
        .get("referrals_required_for_spin")
        .and_then(|v| v.as_u64())
        .map(|v| v as u32)
        .unwrap_or(defaults.referrals_required_for_spin);

    let mut db = state.db.lock().await;
    let (actor, _) = resolver::resolve(&db, token)?;
    let campaign = engine::campaigns::create_campaign(
        &mut db,
        actor.tenant_id,
        name,
        spin_limit,
        cooldown,
        referrals,
        state.now(),
    )
    .map_err(|e| RpcError::from_engine(&e))?;

    Ok(serde_json::json!({
        "campaign_id": campaign.id,
        "spin_limit": campaign.spin_limit,
        "spin_cooldown_hours": campaign.spin_cooldown_hours,
        "referrals_required_for_spin": campaign.referrals_required_for_spin,
    }))
}

/// Archive a campaign.
pub async fn archive_campaign(state: &Arc<DaemonState>, params: &Value) -> Result {
    let token = params
        .get("token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("token required"))?;
    let campaign_id = params
        .get("campaign_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("campaign_id required"))?;

    let db = state.db.lock().await;
    let (actor, _) = resolver::resolve(&db, token)?;
    let campaign = campaigns::get(&db, campaign_id)
        .map_err(|e| RpcError::from_engine(&engine::EngineError::from(e)))?;
    if campaign.tenant_id != actor.tenant_id {
        return Err(RpcError::from_engine(&engine::EngineError::AccessDenied));
    }
    campaigns::archive(&db, campaign_id)
        .map_err(|e| RpcError::internal_error(&format!("db error: {e}")))?;

    Ok(serde_json::json!({ "campaign_id": campaign_id, "archived": true }))
}

/// Create a prize on a campaign's wheel.
pub async fn create_prize(state: &Arc<DaemonState>, params: &Value) -> Result {
    let token = params
        .get("token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("token required"))?;
    let campaign_id = params
        .get("campaign_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("campaign_id required"))?;
    let label = params
        .get("label")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("label required"))?;
    let weight = params
        .get("weight")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| RpcError::invalid_params("weight required"))? as u32;
    let stock = params.get("stock").and_then(|v| v.as_u64()).map(|v| v as u32);

    let db = state.db.lock().await;
    let (actor, _) = resolver::resolve(&db, token)?;
    let campaign = campaigns::get(&db, campaign_id)
        .map_err(|e| RpcError::from_engine(&engine::EngineError::from(e)))?;
    if campaign.tenant_id != actor.tenant_id {
        return Err(RpcError::from_engine(&engine::EngineError::AccessDenied));
    }
    let id = prizes::insert(&db, campaign_id, label, weight, stock)
        .map_err(|e| RpcError::internal_error(&format!("db error: {e}")))?;

    Ok(serde_json::json!({ "prize_id": id }))
}

/// Create a manager with a hashed PIN.
pub async fn create_manager(state: &Arc<DaemonState>, params: &Value) -> Result {
    let token = params
        .get("token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("token required"))?;
    let name = params
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("name required"))?;
    let pin = params
        .get("pin")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("pin required"))?;
    let per_approval = params
        .get("max_bonus_spins_per_approval")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| RpcError::invalid_params("max_bonus_spins_per_approval required"))?
        as u32;
    let per_user = params
        .get("max_spins_per_user")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| RpcError::invalid_params("max_spins_per_user required"))?
        as u32;

    let db = state.db.lock().await;
    let (actor, _) = resolver::resolve(&db, token)?;
    let manager = engine::managers::create_manager(
        &db,
        actor.tenant_id,
        name,
        pin,
        per_approval,
        per_user,
        state.now(),
    )
    .map_err(|e| RpcError::from_engine(&e))?;

    Ok(serde_json::json!({ "manager_id": manager.id }))
}

/// Deactivate a manager.
pub async fn deactivate_manager(state: &Arc<DaemonState>, params: &Value) -> Result {
    let token = params
        .get("token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("token required"))?;
    let manager_id = params
        .get("manager_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("manager_id required"))?;

    let db = state.db.lock().await;
    let (actor, _) = resolver::resolve(&db, token)?;
    engine::managers::deactivate_manager(&db, &actor, manager_id)
        .map_err(|e| RpcError::from_engine(&e))?;

    Ok(serde_json::json!({ "manager_id": manager_id, "deactivated": true }))
}

/// Create a social task.
pub async fn create_task(state: &Arc<DaemonState>, params: &Value) -> Result {
    let token = params
        .get("token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("token required"))?;
    let campaign_id = params
        .get("campaign_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("campaign_id required"))?;
    let title = params
        .get("title")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("title required"))?;
    let reward = params
        .get("reward_spins")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| RpcError::invalid_params("reward_spins required"))? as u32;

    let db = state.db.lock().await;
    let (actor, _) = resolver::resolve(&db, token)?;
    let campaign = campaigns::get(&db, campaign_id)
        .map_err(|e| RpcError::from_engine(&engine::EngineError::from(e)))?;
    if campaign.tenant_id != actor.tenant_id {
        return Err(RpcError::from_engine(&engine::EngineError::AccessDenied));
    }
    let id = tasks::insert_task(&db, actor.tenant_id, campaign_id, title, reward)
        .map_err(|e| RpcError::internal_error(&format!("db error: {e}")))?;

    Ok(serde_json::json!({ "task_id": id }))
}

/// Grant a platform-side limit override to a tenant.
pub async fn grant_limit_override(state: &Arc<DaemonState>, params: &Value) -> Result {
    let tenant_id = params
        .get("tenant_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("tenant_id required"))?;
    let bonus_spins = params
        .get("bonus_spins")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;
    let bonus_vouchers = params
        .get("bonus_vouchers")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;
    let reason = params
        .get("reason")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("reason required"))?;
    let granted_by = params
        .get("granted_by")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("granted_by required"))?;
    let expires_at = params.get("expires_at").and_then(|v| v.as_u64());

    let db = state.db.lock().await;
    let id = overrides::insert(
        &db,
        tenant_id,
        bonus_spins,
        bonus_vouchers,
        reason,
        granted_by,
        expires_at,
        state.now(),
    )
    .map_err(|e| RpcError::internal_error(&format!("db error: {e}")))?;

    Ok(serde_json::json!({ "override_id": id }))
}
