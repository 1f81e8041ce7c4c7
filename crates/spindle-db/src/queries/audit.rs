//! Audit-log query functions.
//!
//! The write path is append-only by contract and by trigger: no update or
//! delete function exists here, and raw SQL attempts abort.

use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use spindle_types::staff::{AuditRecord, ManagerAction};
use spindle_types::{AuditId, CompletionId, ManagerId, TenantId, UserId};

use crate::Result;

/// Append one audit row. Returns the new row id.
#[allow(clippy::too_many_arguments)]
pub fn append(
    conn: &Connection,
    tenant_id: TenantId,
    manager_id: ManagerId,
    action: ManagerAction,
    task_completion_id: Option<CompletionId>,
    user_id: Option<UserId>,
    bonus_spins_granted: u32,
    comment: Option<&str>,
    created_at: u64,
) -> Result<AuditId> {
    conn.execute(
        "INSERT INTO manager_audit_log
             (tenant_id, manager_id, action, task_completion_id, user_id,
              bonus_spins_granted, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            tenant_id,
            manager_id,
            action.as_str(),
            task_completion_id,
            user_id,
            i64::from(bonus_spins_granted),
            comment,
            created_at as i64,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Filter for audit queries. `None` fields match everything.
#[derive(Clone, Debug, Default)]
pub struct AuditFilter {
    pub tenant_id: Option<TenantId>,
    pub manager_id: Option<ManagerId>,
    pub action: Option<ManagerAction>,
    /// Inclusive lower bound on `created_at`.
    pub from: Option<u64>,
    /// Exclusive upper bound on `created_at`.
    pub to: Option<u64>,
}

/// Pagination window.
#[derive(Clone, Copy, Debug)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self { limit: 50, offset: 0 }
    }
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<AuditRecord> {
    let action_raw: String = row.get(3)?;
    let action = ManagerAction::parse(&action_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("bad audit action: {action_raw}").into(),
        )
    })?;
    Ok(AuditRecord {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        manager_id: row.get(2)?,
        action,
        task_completion_id: row.get(4)?,
        user_id: row.get(5)?,
        bonus_spins_granted: row.get::<_, i64>(6)? as u32,
        comment: row.get(7)?,
        created_at: row.get::<_, i64>(8)? as u64,
    })
}

fn build_where(filter: &AuditFilter, params: &mut Vec<Value>) -> String {
    let mut clauses = Vec::new();
    if let Some(tenant_id) = filter.tenant_id {
        params.push(Value::Integer(tenant_id));
        clauses.push(format!("tenant_id = ?{}", params.len()));
    }
    if let Some(manager_id) = filter.manager_id {
        params.push(Value::Integer(manager_id));
        clauses.push(format!("manager_id = ?{}", params.len()));
    }
    if let Some(action) = filter.action {
        params.push(Value::Text(action.as_str().to_string()));
        clauses.push(format!("action = ?{}", params.len()));
    }
    if let Some(from) = filter.from {
        params.push(Value::Integer(from as i64));
        clauses.push(format!("created_at >= ?{}", params.len()));
    }
    if let Some(to) = filter.to {
        params.push(Value::Integer(to as i64));
        clauses.push(format!("created_at < ?{}", params.len()));
    }
    if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    }
}

/// Query audit rows matching `filter`, newest first, paginated.
///
/// Returns a complete page or an error — never a partial page.
pub fn query(conn: &Connection, filter: &AuditFilter, page: &Page) -> Result<Vec<AuditRecord>> {
    let mut params: Vec<Value> = Vec::new();
    let where_clause = build_where(filter, &mut params);
    params.push(Value::Integer(i64::from(page.limit)));
    let limit_idx = params.len();
    params.push(Value::Integer(i64::from(page.offset)));
    let offset_idx = params.len();

    let sql = format!(
        "SELECT id, tenant_id, manager_id, action, task_completion_id, user_id,
                bonus_spins_granted, comment, created_at
         FROM manager_audit_log {where_clause}
         ORDER BY created_at DESC, id DESC
         LIMIT ?{limit_idx} OFFSET ?{offset_idx}"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params), from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Count rows matching `filter`.
pub fn count(conn: &Connection, filter: &AuditFilter) -> Result<u64> {
    let mut params: Vec<Value> = Vec::new();
    let where_clause = build_where(filter, &mut params);
    let sql = format!("SELECT COUNT(*) FROM manager_audit_log {where_clause}");
    let count: i64 =
        conn.query_row(&sql, rusqlite::params_from_iter(params), |row| row.get(0))?;
    Ok(count as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{managers, tenants};

    fn setup() -> (Connection, TenantId, ManagerId) {
        let conn = crate::open_memory().expect("open");
        let tenant = tenants::insert(&conn, "acme", None, None, 0).expect("tenant");
        let manager =
            managers::insert(&conn, tenant, "alice", "$argon2id$stub", 5, 20, 0).expect("manager");
        (conn, tenant, manager)
    }

    #[test]
    fn test_append_and_filter() {
        let (conn, tenant, manager) = setup();
        append(&conn, tenant, manager, ManagerAction::Grant, None, None, 3, Some("standee"), 100)
            .expect("grant");
        append(&conn, tenant, manager, ManagerAction::Reject, None, None, 0, None, 200)
            .expect("reject");

        let all = query(&conn, &AuditFilter::default(), &Page::default()).expect("query");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].action, ManagerAction::Reject, "newest first");

        let grants = query(
            &conn,
            &AuditFilter { action: Some(ManagerAction::Grant), ..Default::default() },
            &Page::default(),
        )
        .expect("query");
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].bonus_spins_granted, 3);
    }

    #[test]
    fn test_date_range_and_pagination() {
        let (conn, tenant, manager) = setup();
        for i in 0..5u32 {
            append(&conn, tenant, manager, ManagerAction::Grant, None, None, i, None, 100 + u64::from(i))
                .expect("append");
        }

        let windowed = query(
            &conn,
            &AuditFilter { from: Some(101), to: Some(104), ..Default::default() },
            &Page::default(),
        )
        .expect("query");
        assert_eq!(windowed.len(), 3, "from inclusive, to exclusive");

        let page = query(
            &conn,
            &AuditFilter::default(),
            &Page { limit: 2, offset: 2 },
        )
        .expect("query");
        assert_eq!(page.len(), 2);
        assert_eq!(count(&conn, &AuditFilter::default()).expect("count"), 5);
    }

    #[test]
    fn test_rows_are_append_only() {
        let (conn, tenant, manager) = setup();
        let id = append(&conn, tenant, manager, ManagerAction::Grant, None, None, 1, None, 100)
            .expect("append");

        let update =
            conn.execute("UPDATE manager_audit_log SET bonus_spins_granted = 99 WHERE id = ?1", [id]);
        assert!(update.is_err(), "audit rows must reject UPDATE");

        let delete = conn.execute("DELETE FROM manager_audit_log WHERE id = ?1", [id]);
        assert!(delete.is_err(), "audit rows must reject DELETE");
    }
}
