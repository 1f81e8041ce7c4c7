//! Per-tenant monthly usage counters.
//!
//! Rows are created lazily by an idempotent upsert keyed on
//! `(tenant_id, month)`; the first access after a month boundary is the
//! entire reset. There is deliberately no scheduled sweep.

use rusqlite::{Connection, OptionalExtension};
use spindle_types::usage::UsageRecord;
use spindle_types::TenantId;

use crate::{DbError, Result};

/// Ensure the usage row for `(tenant_id, month)` exists and return it.
///
/// Concurrent first-accesses cannot create duplicates: the insert is a
/// no-op when the row is already present.
pub fn ensure(conn: &Connection, tenant_id: TenantId, month: &str) -> Result<UsageRecord> {
    conn.execute(
        "INSERT INTO tenant_usage (tenant_id, month) VALUES (?1, ?2)
         ON CONFLICT (tenant_id, month) DO NOTHING",
        rusqlite::params![tenant_id, month],
    )?;
    get(conn, tenant_id, month)?
        .ok_or_else(|| DbError::NotFound(format!("usage row for tenant {tenant_id} {month}")))
}

/// Fetch the usage row for `(tenant_id, month)` if it exists.
pub fn get(conn: &Connection, tenant_id: TenantId, month: &str) -> Result<Option<UsageRecord>> {
    Ok(conn
        .query_row(
            "SELECT tenant_id, month, campaigns_created, spins_used
             FROM tenant_usage WHERE tenant_id = ?1 AND month = ?2",
            rusqlite::params![tenant_id, month],
            |row| {
                Ok(UsageRecord {
                    tenant_id: row.get(0)?,
                    month: row.get(1)?,
                    campaigns_created: row.get::<_, i64>(2)? as u32,
                    spins_used: row.get::<_, i64>(3)? as u32,
                })
            },
        )
        .optional()?)
}

/// Ensure-then-increment `campaigns_created`.
pub fn increment_campaigns_created(
    conn: &Connection,
    tenant_id: TenantId,
    month: &str,
) -> Result<()> {
    ensure(conn, tenant_id, month)?;
    conn.execute(
        "UPDATE tenant_usage SET campaigns_created = campaigns_created + 1
         WHERE tenant_id = ?1 AND month = ?2",
        rusqlite::params![tenant_id, month],
    )?;
    Ok(())
}

/// Ensure-then-increment `spins_used`.
pub fn increment_spins_used(conn: &Connection, tenant_id: TenantId, month: &str) -> Result<()> {
    ensure(conn, tenant_id, month)?;
    conn.execute(
        "UPDATE tenant_usage SET spins_used = spins_used + 1
         WHERE tenant_id = ?1 AND month = ?2",
        rusqlite::params![tenant_id, month],
    )?;
    Ok(())
}
