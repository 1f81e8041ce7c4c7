//! Staff command handlers (approvals, grants, audit, usage).

use std::sync::Arc;

use serde_json::Value;
use spindle_db::queries::tasks;
use spindle_engine as engine;
use spindle_engine::audit::{AuditFilter, Page};
use spindle_engine::notify::LogSink;
use spindle_types::staff::ManagerAction;

use crate::resolver;
use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

fn manager_token(params: &Value) -> std::result::Result<&str, RpcError> {
    params
        .get("token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("token required"))
}

/// Approve a pending task completion.
pub async fn approve_task(state: &Arc<DaemonState>, params: &Value) -> Result {
    let token = manager_token(params)?;
    let completion_id = params
        .get("completion_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("completion_id required"))?;
    let comment = params.get("comment").and_then(|v| v.as_str()).unwrap_or("");

    let mut db = state.db.lock().await;
    let (actor, manager_id) = resolver::resolve(&db, token)?;
    let manager_id =
        manager_id.ok_or_else(|| RpcError::invalid_params("manager token required"))?;
    let decision = engine::approval::approve_task(
        &mut db,
        &LogSink,
        &actor,
        manager_id,
        completion_id,
        comment,
        state.now(),
    )
    .map_err(|e| RpcError::from_engine(&e))?;

    Ok(serde_json::json!({
        "completion_id": completion_id,
        "status": decision.completion.status,
        "bonus_spins_granted": decision.bonus_spins_granted,
    }))
}

/// Reject a pending task completion.
pub async fn reject_task(state: &Arc<DaemonState>, params: &Value) -> Result {
    let token = manager_token(params)?;
    let completion_id = params
        .get("completion_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("completion_id required"))?;
    let comment = params.get("comment").and_then(|v| v.as_str()).unwrap_or("");

    let mut db = state.db.lock().await;
    let (actor, manager_id) = resolver::resolve(&db, token)?;
    let manager_id =
        manager_id.ok_or_else(|| RpcError::invalid_params("manager token required"))?;
    let decision = engine::approval::reject_task(
        &mut db,
        &actor,
        manager_id,
        completion_id,
        comment,
        state.now(),
    )
    .map_err(|e| RpcError::from_engine(&e))?;

    Ok(serde_json::json!({
        "completion_id": completion_id,
        "status": decision.completion.status,
    }))
}

/// List the tenant's pending completions.
pub async fn pending_completions(state: &Arc<DaemonState>, params: &Value) -> Result {
    let token = manager_token(params)?;

    let db = state.db.lock().await;
    let (actor, _) = resolver::resolve(&db, token)?;
    let pending = tasks::pending_for_tenant(&db, actor.tenant_id)
        .map_err(|e| RpcError::internal_error(&format!("db error: {e}")))?;

    let result: Vec<Value> = pending
        .iter()
        .map(|c| {
            serde_json::json!({
                "completion_id": c.id,
                "user_id": c.user_id,
                "task_id": c.task_id,
                "submitted_at": c.submitted_at,
            })
        })
        .collect();
    Ok(serde_json::json!(result))
}

/// Direct bonus grant.
pub async fn grant_bonus(state: &Arc<DaemonState>, params: &Value) -> Result {
    let token = manager_token(params)?;
    let user_id = params
        .get("user_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("user_id required"))?;
    let amount = params
        .get("amount")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| RpcError::invalid_params("amount required"))? as u32;
    let reason = params
        .get("reason")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("reason required"))?;

    let mut db = state.db.lock().await;
    let (_actor, manager_id) = resolver::resolve(&db, token)?;
    let manager_id =
        manager_id.ok_or_else(|| RpcError::invalid_params("manager token required"))?;
    let balance = engine::bonus::grant_bonus(
        &mut db,
        &LogSink,
        manager_id,
        user_id,
        amount,
        reason,
        state.now(),
    )
    .map_err(|e| RpcError::from_engine(&e))?;

    Ok(serde_json::json!({
        "user_id": balance.user_id,
        "granted_total": balance.granted_total,
    }))
}

/// Query the tenant's audit log.
pub async fn query_audit_logs(state: &Arc<DaemonState>, params: &Value) -> Result {
    let token = manager_token(params)?;
    let filter = AuditFilter {
        tenant_id: None, // pinned to the actor's tenant by the engine
        manager_id: params.get("manager_id").and_then(|v| v.as_i64()),
        action: params
            .get("action")
            .and_then(|v| v.as_str())
            .and_then(ManagerAction::parse),
        from: params.get("from").and_then(|v| v.as_u64()),
        to: params.get("to").and_then(|v| v.as_u64()),
    };
    let page = Page {
        limit: params.get("limit").and_then(|v| v.as_u64()).unwrap_or(50) as u32,
        offset: params.get("offset").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
    };

    let db = state.db.lock().await;
    let (actor, _) = resolver::resolve(&db, token)?;
    let rows = engine::audit::query_audit_logs(&db, &actor, &filter, &page)
        .map_err(|e| RpcError::from_engine(&e))?;
    let total = engine::audit::count_audit_logs(&db, &actor, &filter)
        .map_err(|e| RpcError::from_engine(&e))?;

    let result: Vec<Value> = rows
        .iter()
        .map(|r| {
            serde_json::json!({
                "id": r.id,
                "manager_id": r.manager_id,
                "action": r.action.as_str(),
                "task_completion_id": r.task_completion_id,
                "user_id": r.user_id,
                "bonus_spins_granted": r.bonus_spins_granted,
                "comment": r.comment,
                "created_at": r.created_at,
            })
        })
        .collect();
    Ok(serde_json::json!({ "rows": result, "total": total }))
}

/// Current-month usage counters for the actor's tenant.
pub async fn get_usage(state: &Arc<DaemonState>, params: &Value) -> Result {
    let token = manager_token(params)?;

    let db = state.db.lock().await;
    let (actor, _) = resolver::resolve(&db, token)?;
    let usage = engine::usage::ensure_current_month(&db, actor.tenant_id, state.now())
        .map_err(|e| RpcError::from_engine(&e))?;

    Ok(serde_json::json!({
        "month": usage.month,
        "campaigns_created": usage.campaigns_created,
        "spins_used": usage.spins_used,
    }))
}
