//! Voucher command handlers.

use std::sync::Arc;

use serde_json::Value;
use spindle_engine as engine;

use crate::resolver;
use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Redeem a voucher.
pub async fn redeem_voucher(state: &Arc<DaemonState>, params: &Value) -> Result {
    let token = params
        .get("token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("token required"))?;
    let voucher_id = params
        .get("voucher_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("voucher_id required"))?;

    let db = state.db.lock().await;
    let (actor, _) = resolver::resolve(&db, token)?;
    let voucher = engine::vouchers::redeem_voucher(&db, &actor, voucher_id, state.now())
        .map_err(|e| RpcError::from_engine(&e))?;

    Ok(serde_json::json!({
        "voucher_id": voucher.id,
        "code": voucher.code,
        "redeemed_at": voucher.redeemed_at,
    }))
}

/// Void a voucher (one-way).
pub async fn void_voucher(state: &Arc<DaemonState>, params: &Value) -> Result {
    let token = params
        .get("token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("token required"))?;
    let voucher_id = params
        .get("voucher_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("voucher_id required"))?;

    let db = state.db.lock().await;
    let (actor, _) = resolver::resolve(&db, token)?;
    let voucher = engine::vouchers::void_voucher(&db, &actor, voucher_id, state.now())
        .map_err(|e| RpcError::from_engine(&e))?;

    Ok(serde_json::json!({
        "voucher_id": voucher.id,
        "expires_at": voucher.expires_at,
    }))
}
