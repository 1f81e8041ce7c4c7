//! End-user command handlers (enrollment, spins, entitlement).

use std::sync::Arc;

use serde_json::Value;
use spindle_db::queries::tasks;
use spindle_engine as engine;
use spindle_engine::notify::LogSink;

use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Enroll a user by phone, optionally with a referral code.
pub async fn enroll_user(state: &Arc<DaemonState>, params: &Value) -> Result {
    let tenant_id = params
        .get("tenant_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("tenant_id required"))?;
    let phone = params
        .get("phone")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("phone required"))?;
    let referral_code = params.get("referral_code").and_then(|v| v.as_str());

    let mut db = state.db.lock().await;
    let enrollment =
        engine::enroll::enroll_user(&mut db, tenant_id, phone, referral_code, state.now())
            .map_err(|e| RpcError::from_engine(&e))?;

    Ok(serde_json::json!({
        "user_id": enrollment.user.id,
        "referral_code": enrollment.user.referral_code,
        "created": enrollment.created,
        "referral_credited": enrollment.referral_credited,
    }))
}

/// Admit one spin.
pub async fn admit_spin(state: &Arc<DaemonState>, params: &Value) -> Result {
    let user_id = params
        .get("user_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("user_id required"))?;
    let campaign_id = params
        .get("campaign_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("campaign_id required"))?;

    let mut db = state.db.lock().await;
    let mut rng = rand::thread_rng();
    let outcome = engine::admission::admit_spin(
        &mut db,
        &LogSink,
        user_id,
        campaign_id,
        state.now(),
        &mut rng,
    )
    .map_err(|e| RpcError::from_engine(&e))?;

    Ok(serde_json::json!({
        "spin_id": outcome.spin.id,
        "is_referral_bonus": outcome.spin.is_referral_bonus,
        "won_prize": outcome.spin.won_prize,
        "prize": outcome.prize.as_ref().map(|p| p.label.clone()),
        "voucher_code": outcome.voucher.as_ref().map(|v| v.code.clone()),
    }))
}

/// Read the current entitlement for a (user, campaign) pair.
pub async fn get_entitlement(state: &Arc<DaemonState>, params: &Value) -> Result {
    let user_id = params
        .get("user_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("user_id required"))?;
    let campaign_id = params
        .get("campaign_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("campaign_id required"))?;

    let db = state.db.lock().await;
    let entitlement =
        engine::admission::compute_user_entitlement(&db, user_id, campaign_id, state.now())
            .map_err(|e| RpcError::from_engine(&e))?;

    Ok(serde_json::json!({
        "regular_remaining": entitlement.regular_remaining,
        "bonus_remaining": entitlement.bonus_remaining,
        "total": entitlement.total(),
    }))
}

/// Record an end-user's task completion claim (pending review).
pub async fn submit_task_completion(state: &Arc<DaemonState>, params: &Value) -> Result {
    let tenant_id = params
        .get("tenant_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("tenant_id required"))?;
    let user_id = params
        .get("user_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("user_id required"))?;
    let task_id = params
        .get("task_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("task_id required"))?;

    let db = state.db.lock().await;
    let id = tasks::submit_completion(&db, tenant_id, user_id, task_id, state.now())
        .map_err(|e| RpcError::internal_error(&format!("db error: {e}")))?;

    Ok(serde_json::json!({ "completion_id": id, "status": "pending" }))
}
