//! Campaign query functions.

use rusqlite::{Connection, OptionalExtension, Row};
use spindle_types::campaign::Campaign;
use spindle_types::{CampaignId, TenantId};

use crate::{DbError, Result};

fn from_row(row: &Row<'_>) -> rusqlite::Result<Campaign> {
    Ok(Campaign {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        name: row.get(2)?,
        spin_limit: row.get::<_, i64>(3)? as u32,
        spin_cooldown_hours: row.get::<_, i64>(4)? as u32,
        referrals_required_for_spin: row.get::<_, i64>(5)? as u32,
        is_active: row.get::<_, i64>(6)? != 0,
        is_archived: row.get::<_, i64>(7)? != 0,
        created_at: row.get::<_, i64>(8)? as u64,
    })
}

const COLUMNS: &str = "id, tenant_id, name, spin_limit, spin_cooldown_hours,
    referrals_required_for_spin, is_active, is_archived, created_at";

/// Insert a campaign. Returns the new row id.
pub fn insert(
    conn: &Connection,
    tenant_id: TenantId,
    name: &str,
    spin_limit: u32,
    spin_cooldown_hours: u32,
    referrals_required_for_spin: u32,
    created_at: u64,
) -> Result<CampaignId> {
    conn.execute(
        "INSERT INTO campaigns
             (tenant_id, name, spin_limit, spin_cooldown_hours,
              referrals_required_for_spin, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            tenant_id,
            name,
            i64::from(spin_limit),
            i64::from(spin_cooldown_hours),
            i64::from(referrals_required_for_spin),
            created_at as i64,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch a campaign by id.
pub fn get(conn: &Connection, id: CampaignId) -> Result<Campaign> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM campaigns WHERE id = ?1"),
        [id],
        from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound(format!("campaign {id}")))
}

/// Archive a campaign. Archived campaigns admit no new spins.
pub fn archive(conn: &Connection, id: CampaignId) -> Result<()> {
    let updated = conn.execute("UPDATE campaigns SET is_archived = 1 WHERE id = ?1", [id])?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("campaign {id}")));
    }
    Ok(())
}

/// List campaigns for a tenant.
pub fn list_for_tenant(conn: &Connection, tenant_id: TenantId) -> Result<Vec<Campaign>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM campaigns WHERE tenant_id = ?1 ORDER BY id"
    ))?;
    let rows = stmt
        .query_map([tenant_id], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::tenants;

    fn db_with_tenant() -> (Connection, TenantId) {
        let conn = crate::open_memory().expect("open");
        let tenant = tenants::insert(&conn, "acme", None, None, 0).expect("tenant");
        (conn, tenant)
    }

    #[test]
    fn test_insert_and_get() {
        let (conn, tenant) = db_with_tenant();
        let id = insert(&conn, tenant, "launch", 1, 24, 3, 100).expect("insert");
        let c = get(&conn, id).expect("get");
        assert_eq!(c.spin_limit, 1);
        assert_eq!(c.spin_cooldown_hours, 24);
        assert!(c.admits_spins());
    }

    #[test]
    fn test_archive() {
        let (conn, tenant) = db_with_tenant();
        let id = insert(&conn, tenant, "launch", 1, 24, 3, 100).expect("insert");
        archive(&conn, id).expect("archive");
        assert!(!get(&conn, id).expect("get").admits_spins());
    }

    #[test]
    fn test_list_for_tenant() {
        let (conn, tenant) = db_with_tenant();
        insert(&conn, tenant, "a", 1, 24, 3, 0).expect("a");
        insert(&conn, tenant, "b", 2, 48, 0, 0).expect("b");
        let list = list_for_tenant(&conn, tenant).expect("list");
        assert_eq!(list.len(), 2);
    }
}
