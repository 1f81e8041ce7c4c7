//! Manager query functions.

use rusqlite::{Connection, OptionalExtension, Row};
use spindle_types::staff::Manager;
use spindle_types::{ManagerId, TenantId};

use crate::{DbError, Result};

fn from_row(row: &Row<'_>) -> rusqlite::Result<Manager> {
    Ok(Manager {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        name: row.get(2)?,
        pin_hash: row.get(3)?,
        max_bonus_spins_per_approval: row.get::<_, i64>(4)? as u32,
        max_spins_per_user: row.get::<_, i64>(5)? as u32,
        is_active: row.get::<_, i64>(6)? != 0,
        created_at: row.get::<_, i64>(7)? as u64,
    })
}

const COLUMNS: &str = "id, tenant_id, name, pin_hash, max_bonus_spins_per_approval,
    max_spins_per_user, is_active, created_at";

/// Insert a manager. Returns the new row id.
pub fn insert(
    conn: &Connection,
    tenant_id: TenantId,
    name: &str,
    pin_hash: &str,
    max_bonus_spins_per_approval: u32,
    max_spins_per_user: u32,
    created_at: u64,
) -> Result<ManagerId> {
    conn.execute(
        "INSERT INTO managers
             (tenant_id, name, pin_hash, max_bonus_spins_per_approval, max_spins_per_user, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            tenant_id,
            name,
            pin_hash,
            i64::from(max_bonus_spins_per_approval),
            i64::from(max_spins_per_user),
            created_at as i64,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch a manager by id.
pub fn get(conn: &Connection, id: ManagerId) -> Result<Manager> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM managers WHERE id = ?1"),
        [id],
        from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound(format!("manager {id}")))
}

/// Deactivate a manager. Managers are never deleted: audit rows keep
/// referencing them.
pub fn deactivate(conn: &Connection, id: ManagerId) -> Result<()> {
    let updated = conn.execute("UPDATE managers SET is_active = 0 WHERE id = ?1", [id])?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("manager {id}")));
    }
    Ok(())
}
