//! Bonus-ledger query functions.
//!
//! Manager-side bonus spins are appended as tagged entries and summed on
//! read; there is no mutable balance column to drift.

use rusqlite::{Connection, Row};
use spindle_types::user::{BonusEntry, BonusSource};
use spindle_types::{CompletionId, ManagerId, TenantId, UserId};

use crate::Result;

/// Append one ledger entry. Returns the new row id.
#[allow(clippy::too_many_arguments)]
pub fn append_entry(
    conn: &Connection,
    tenant_id: TenantId,
    user_id: UserId,
    source: BonusSource,
    amount: u32,
    manager_id: Option<ManagerId>,
    task_completion_id: Option<CompletionId>,
    reason: Option<&str>,
    created_at: u64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO bonus_ledger
             (tenant_id, user_id, source, amount, manager_id, task_completion_id, reason, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            tenant_id,
            user_id,
            source.as_str(),
            i64::from(amount),
            manager_id,
            task_completion_id,
            reason,
            created_at as i64,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Total bonus spins granted to a user across all sources.
pub fn granted_total(conn: &Connection, user_id: UserId) -> Result<u64> {
    let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM bonus_ledger WHERE user_id = ?1",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(total as u64)
}

/// Total bonus spins granted to a user by managers (approvals and direct
/// grants), the quantity `max_spins_per_user` caps.
pub fn manager_granted_total(conn: &Connection, user_id: UserId) -> Result<u64> {
    let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM bonus_ledger
         WHERE user_id = ?1 AND source IN ('task_verification', 'direct_grant')",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(total as u64)
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<BonusEntry> {
    let source_raw: String = row.get(3)?;
    let source = BonusSource::parse(&source_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("bad bonus source: {source_raw}").into(),
        )
    })?;
    Ok(BonusEntry {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        user_id: row.get(2)?,
        source,
        amount: row.get::<_, i64>(4)? as u32,
        manager_id: row.get(5)?,
        task_completion_id: row.get(6)?,
        reason: row.get(7)?,
        created_at: row.get::<_, i64>(8)? as u64,
    })
}

/// List a user's ledger entries, oldest first.
pub fn entries_for_user(conn: &Connection, user_id: UserId) -> Result<Vec<BonusEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, tenant_id, user_id, source, amount, manager_id, task_completion_id,
                reason, created_at
         FROM bonus_ledger WHERE user_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map([user_id], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{managers, tenants, users};

    fn setup() -> (Connection, TenantId, UserId, ManagerId) {
        let conn = crate::open_memory().expect("open");
        let tenant = tenants::insert(&conn, "acme", None, None, 0).expect("tenant");
        let user = users::insert(&conn, tenant, "+601", "REF00001", None, 0).expect("user");
        let manager =
            managers::insert(&conn, tenant, "alice", "$argon2id$stub", 5, 20, 0).expect("manager");
        (conn, tenant, user, manager)
    }

    #[test]
    fn test_totals_sum_entries() {
        let (conn, tenant, user, manager) = setup();
        append_entry(&conn, tenant, user, BonusSource::DirectGrant, 3, Some(manager), None, Some("standee"), 100)
            .expect("grant");
        append_entry(&conn, tenant, user, BonusSource::TaskVerification, 2, Some(manager), None, None, 200)
            .expect("approval");
        append_entry(&conn, tenant, user, BonusSource::Override, 10, None, None, Some("goodwill"), 300)
            .expect("override");

        assert_eq!(granted_total(&conn, user).expect("total"), 15);
        assert_eq!(
            manager_granted_total(&conn, user).expect("manager total"),
            5,
            "override entries are not counted against manager caps"
        );
    }

    #[test]
    fn test_entries_round_trip() {
        let (conn, tenant, user, manager) = setup();
        append_entry(&conn, tenant, user, BonusSource::DirectGrant, 1, Some(manager), None, None, 100)
            .expect("grant");
        let entries = entries_for_user(&conn, user).expect("list");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source, BonusSource::DirectGrant);
        assert_eq!(entries[0].amount, 1);
        assert_eq!(entries[0].manager_id, Some(manager));
    }

    #[test]
    fn test_empty_total() {
        let (conn, _tenant, user, _manager) = setup();
        assert_eq!(granted_total(&conn, user).expect("total"), 0);
    }
}
