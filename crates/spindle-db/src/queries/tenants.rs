//! Tenant query functions.

use rusqlite::{Connection, OptionalExtension};
use spindle_types::tenant::Tenant;
use spindle_types::TenantId;

use crate::{DbError, Result};

/// Insert a tenant. Returns the new row id.
pub fn insert(
    conn: &Connection,
    name: &str,
    plan_campaign_limit: Option<u32>,
    plan_spin_limit: Option<u32>,
    created_at: u64,
) -> Result<TenantId> {
    conn.execute(
        "INSERT INTO tenants (name, plan_campaign_limit, plan_spin_limit, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            name,
            plan_campaign_limit.map(i64::from),
            plan_spin_limit.map(i64::from),
            created_at as i64,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch a tenant by id.
pub fn get(conn: &Connection, id: TenantId) -> Result<Tenant> {
    conn.query_row(
        "SELECT id, name, is_active, is_locked, plan_campaign_limit, plan_spin_limit, created_at
         FROM tenants WHERE id = ?1",
        [id],
        |row| {
            Ok(Tenant {
                id: row.get(0)?,
                name: row.get(1)?,
                is_active: row.get::<_, i64>(2)? != 0,
                is_locked: row.get::<_, i64>(3)? != 0,
                plan_campaign_limit: row.get::<_, Option<i64>>(4)?.map(|v| v as u32),
                plan_spin_limit: row.get::<_, Option<i64>>(5)?.map(|v| v as u32),
                created_at: row.get::<_, i64>(6)? as u64,
            })
        },
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound(format!("tenant {id}")))
}

/// Set the security lockout flag.
pub fn set_locked(conn: &Connection, id: TenantId, locked: bool) -> Result<()> {
    let updated = conn.execute(
        "UPDATE tenants SET is_locked = ?2 WHERE id = ?1",
        rusqlite::params![id, locked as i64],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("tenant {id}")));
    }
    Ok(())
}

/// Set the active flag.
pub fn set_active(conn: &Connection, id: TenantId, active: bool) -> Result<()> {
    let updated = conn.execute(
        "UPDATE tenants SET is_active = ?2 WHERE id = ?1",
        rusqlite::params![id, active as i64],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("tenant {id}")));
    }
    Ok(())
}
