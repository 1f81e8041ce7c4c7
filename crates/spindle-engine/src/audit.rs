//! Tenant-scoped audit log reads.
//!
//! The write path lives with the mutations that produce audit rows; this
//! module only reads. Whatever filter the caller passes, results are
//! pinned to the actor's tenant.

use rusqlite::Connection;
use spindle_db::queries::audit as db_audit;
pub use spindle_db::queries::audit::{AuditFilter, Page};
use spindle_types::staff::AuditRecord;

use crate::actor::Actor;
use crate::{EngineError, Result};

/// Query audit rows visible to `actor`, newest first.
///
/// Returns a complete, consistently filtered page or an error — never a
/// partial page.
pub fn query_audit_logs(
    conn: &Connection,
    actor: &Actor,
    filter: &AuditFilter,
    page: &Page,
) -> Result<Vec<AuditRecord>> {
    if !actor.role.can_manage() {
        return Err(EngineError::AccessDenied);
    }
    let scoped = AuditFilter { tenant_id: Some(actor.tenant_id), ..filter.clone() };
    Ok(db_audit::query(conn, &scoped, page)?)
}

/// Count audit rows visible to `actor` under `filter`.
pub fn count_audit_logs(conn: &Connection, actor: &Actor, filter: &AuditFilter) -> Result<u64> {
    if !actor.role.can_manage() {
        return Err(EngineError::AccessDenied);
    }
    let scoped = AuditFilter { tenant_id: Some(actor.tenant_id), ..filter.clone() };
    Ok(db_audit::count(conn, &scoped)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorRole;
    use spindle_db::queries::{managers, tenants};
    use spindle_types::staff::ManagerAction;

    #[test]
    fn test_reads_are_tenant_scoped() {
        let conn = spindle_db::open_memory().expect("open");
        let tenant_a = tenants::insert(&conn, "a", None, None, 0).expect("tenant");
        let tenant_b = tenants::insert(&conn, "b", None, None, 0).expect("tenant");
        let mgr_a = managers::insert(&conn, tenant_a, "a1", "$argon2id$stub", 5, 20, 0).expect("m");
        let mgr_b = managers::insert(&conn, tenant_b, "b1", "$argon2id$stub", 5, 20, 0).expect("m");
        db_audit::append(&conn, tenant_a, mgr_a, ManagerAction::Grant, None, None, 1, None, 100)
            .expect("a row");
        db_audit::append(&conn, tenant_b, mgr_b, ManagerAction::Grant, None, None, 2, None, 100)
            .expect("b row");

        let actor = Actor { tenant_id: tenant_a, role: ActorRole::Manager };
        // A filter naming the other tenant cannot widen the scope.
        let sneaky = AuditFilter { tenant_id: Some(tenant_b), ..Default::default() };
        let rows = query_audit_logs(&conn, &actor, &sneaky, &Page::default()).expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tenant_id, tenant_a);
        assert_eq!(count_audit_logs(&conn, &actor, &AuditFilter::default()).expect("count"), 1);
    }

    #[test]
    fn test_end_user_cannot_read_audit() {
        let conn = spindle_db::open_memory().expect("open");
        let tenant = tenants::insert(&conn, "a", None, None, 0).expect("tenant");
        let actor = Actor { tenant_id: tenant, role: ActorRole::EndUser };
        let result = query_audit_logs(&conn, &actor, &AuditFilter::default(), &Page::default());
        assert!(matches!(result, Err(EngineError::AccessDenied)));
    }
}
