//! Tenant limit-override query functions.

use rusqlite::{Connection, Row};
use spindle_types::tenant::LimitOverride;
use spindle_types::{OverrideId, TenantId};

use crate::{DbError, Result};

fn from_row(row: &Row<'_>) -> rusqlite::Result<LimitOverride> {
    Ok(LimitOverride {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        bonus_spins: row.get::<_, i64>(2)? as u32,
        bonus_vouchers: row.get::<_, i64>(3)? as u32,
        reason: row.get(4)?,
        granted_by: row.get(5)?,
        expires_at: row.get::<_, Option<i64>>(6)?.map(|v| v as u64),
        is_active: row.get::<_, i64>(7)? != 0,
        created_at: row.get::<_, i64>(8)? as u64,
    })
}

const COLUMNS: &str = "id, tenant_id, bonus_spins, bonus_vouchers, reason, granted_by,
    expires_at, is_active, created_at";

/// Insert an override. Returns the new row id.
#[allow(clippy::too_many_arguments)]
pub fn insert(
    conn: &Connection,
    tenant_id: TenantId,
    bonus_spins: u32,
    bonus_vouchers: u32,
    reason: &str,
    granted_by: &str,
    expires_at: Option<u64>,
    created_at: u64,
) -> Result<OverrideId> {
    conn.execute(
        "INSERT INTO tenant_limit_overrides
             (tenant_id, bonus_spins, bonus_vouchers, reason, granted_by, expires_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            tenant_id,
            i64::from(bonus_spins),
            i64::from(bonus_vouchers),
            reason,
            granted_by,
            expires_at.map(|v| v as i64),
            created_at as i64,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Sum of bonus spins from overrides effective at `now`.
pub fn active_bonus_spins(conn: &Connection, tenant_id: TenantId, now: u64) -> Result<u64> {
    let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(bonus_spins), 0) FROM tenant_limit_overrides
         WHERE tenant_id = ?1 AND is_active = 1
           AND (expires_at IS NULL OR expires_at > ?2)",
        rusqlite::params![tenant_id, now as i64],
        |row| row.get(0),
    )?;
    Ok(total as u64)
}

/// List all overrides for a tenant, newest first.
pub fn list_for_tenant(conn: &Connection, tenant_id: TenantId) -> Result<Vec<LimitOverride>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM tenant_limit_overrides WHERE tenant_id = ?1 ORDER BY id DESC"
    ))?;
    let rows = stmt
        .query_map([tenant_id], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Deactivate an override.
pub fn deactivate(conn: &Connection, id: OverrideId) -> Result<()> {
    let updated =
        conn.execute("UPDATE tenant_limit_overrides SET is_active = 0 WHERE id = ?1", [id])?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("override {id}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::tenants;

    fn setup() -> (Connection, TenantId) {
        let conn = crate::open_memory().expect("open");
        let tenant = tenants::insert(&conn, "acme", None, None, 0).expect("tenant");
        (conn, tenant)
    }

    #[test]
    fn test_active_sum_respects_expiry() {
        let (conn, tenant) = setup();
        insert(&conn, tenant, 100, 0, "outage credit", "support", Some(1_000), 0).expect("a");
        insert(&conn, tenant, 50, 0, "goodwill", "support", None, 0).expect("b");

        assert_eq!(active_bonus_spins(&conn, tenant, 500).expect("sum"), 150);
        assert_eq!(active_bonus_spins(&conn, tenant, 1_000).expect("sum"), 50, "expired override dropped");
    }

    #[test]
    fn test_deactivate() {
        let (conn, tenant) = setup();
        let id = insert(&conn, tenant, 100, 0, "credit", "support", None, 0).expect("insert");
        deactivate(&conn, id).expect("deactivate");
        assert_eq!(active_bonus_spins(&conn, tenant, 0).expect("sum"), 0);
        assert_eq!(list_for_tenant(&conn, tenant).expect("list").len(), 1);
    }
}
