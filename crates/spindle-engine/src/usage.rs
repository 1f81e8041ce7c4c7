//! Monthly usage accounting.
//!
//! Usage rows materialize lazily: the first access in a month creates the
//! `(tenant_id, month)` row, and that is the entire reset. The upsert is
//! idempotent, so concurrent first-accesses agree on one row.

use rusqlite::Connection;
use spindle_db::queries::usage as db_usage;
use spindle_types::usage::UsageRecord;
use spindle_types::TenantId;

use crate::{EngineError, Result};

/// Calendar-month key (`YYYY-MM`) for a Unix timestamp.
pub fn month_key(now: u64) -> Result<String> {
    let dt = chrono::DateTime::from_timestamp(now as i64, 0)
        .ok_or_else(|| EngineError::Internal(format!("timestamp {now} out of range")))?;
    Ok(dt.format("%Y-%m").to_string())
}

/// Ensure the current month's usage row exists and return it.
pub fn ensure_current_month(conn: &Connection, tenant_id: TenantId, now: u64) -> Result<UsageRecord> {
    let month = month_key(now)?;
    Ok(db_usage::ensure(conn, tenant_id, &month)?)
}

/// Record one campaign creation against the current month.
pub fn increment_campaigns_created(conn: &Connection, tenant_id: TenantId, now: u64) -> Result<()> {
    let month = month_key(now)?;
    db_usage::increment_campaigns_created(conn, tenant_id, &month)?;
    Ok(())
}

/// Record one spin against the current month.
pub fn increment_spins_used(conn: &Connection, tenant_id: TenantId, now: u64) -> Result<()> {
    let month = month_key(now)?;
    db_usage::increment_spins_used(conn, tenant_id, &month)?;
    Ok(())
}
