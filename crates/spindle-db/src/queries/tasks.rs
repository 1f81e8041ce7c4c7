//! Social tasks and task-completion query functions.

use rusqlite::{Connection, OptionalExtension, Row};
use spindle_types::staff::{CompletionStatus, SocialTask, TaskCompletion};
use spindle_types::{CampaignId, CompletionId, ManagerId, TaskId, TenantId, UserId};

use crate::{DbError, Result};

/// Insert a social task. Returns the new row id.
pub fn insert_task(
    conn: &Connection,
    tenant_id: TenantId,
    campaign_id: CampaignId,
    title: &str,
    reward_spins: u32,
) -> Result<TaskId> {
    conn.execute(
        "INSERT INTO social_tasks (tenant_id, campaign_id, title, reward_spins)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![tenant_id, campaign_id, title, i64::from(reward_spins)],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch a social task by id.
pub fn get_task(conn: &Connection, id: TaskId) -> Result<SocialTask> {
    conn.query_row(
        "SELECT id, tenant_id, campaign_id, title, reward_spins, is_active
         FROM social_tasks WHERE id = ?1",
        [id],
        |row| {
            Ok(SocialTask {
                id: row.get(0)?,
                tenant_id: row.get(1)?,
                campaign_id: row.get(2)?,
                title: row.get(3)?,
                reward_spins: row.get::<_, i64>(4)? as u32,
                is_active: row.get::<_, i64>(5)? != 0,
            })
        },
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound(format!("task {id}")))
}

fn completion_from_row(row: &Row<'_>) -> rusqlite::Result<TaskCompletion> {
    let status_raw: String = row.get(4)?;
    let status = CompletionStatus::parse(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("bad completion status: {status_raw}").into(),
        )
    })?;
    Ok(TaskCompletion {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        user_id: row.get(2)?,
        task_id: row.get(3)?,
        status,
        decided_by: row.get(5)?,
        decided_at: row.get::<_, Option<i64>>(6)?.map(|v| v as u64),
        submitted_at: row.get::<_, i64>(7)? as u64,
    })
}

const COMPLETION_COLUMNS: &str =
    "id, tenant_id, user_id, task_id, status, decided_by, decided_at, submitted_at";

/// Record an end-user's completion claim. Returns the new row id.
pub fn submit_completion(
    conn: &Connection,
    tenant_id: TenantId,
    user_id: UserId,
    task_id: TaskId,
    submitted_at: u64,
) -> Result<CompletionId> {
    conn.execute(
        "INSERT INTO task_completions (tenant_id, user_id, task_id, submitted_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![tenant_id, user_id, task_id, submitted_at as i64],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch a completion by id.
pub fn get_completion(conn: &Connection, id: CompletionId) -> Result<TaskCompletion> {
    conn.query_row(
        &format!("SELECT {COMPLETION_COLUMNS} FROM task_completions WHERE id = ?1"),
        [id],
        completion_from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound(format!("completion {id}")))
}

/// Move a completion out of `pending` into a terminal state.
///
/// The status guard makes the transition first-writer-wins: a second
/// decision sees zero updated rows and returns `false`.
pub fn transition_from_pending(
    conn: &Connection,
    id: CompletionId,
    to: CompletionStatus,
    decided_by: ManagerId,
    decided_at: u64,
) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE task_completions SET status = ?2, decided_by = ?3, decided_at = ?4
         WHERE id = ?1 AND status = 'pending'",
        rusqlite::params![id, to.as_str(), decided_by, decided_at as i64],
    )?;
    Ok(updated == 1)
}

/// List pending completions for a tenant, oldest first.
pub fn pending_for_tenant(conn: &Connection, tenant_id: TenantId) -> Result<Vec<TaskCompletion>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COMPLETION_COLUMNS} FROM task_completions
         WHERE tenant_id = ?1 AND status = 'pending' ORDER BY submitted_at, id"
    ))?;
    let rows = stmt
        .query_map([tenant_id], completion_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{campaigns, managers, tenants, users};

    fn setup() -> (Connection, TenantId, CompletionId, ManagerId) {
        let conn = crate::open_memory().expect("open");
        let tenant = tenants::insert(&conn, "acme", None, None, 0).expect("tenant");
        let campaign = campaigns::insert(&conn, tenant, "launch", 1, 24, 3, 0).expect("campaign");
        let user = users::insert(&conn, tenant, "+601", "REF00001", None, 0).expect("user");
        let manager =
            managers::insert(&conn, tenant, "alice", "$argon2id$stub", 5, 20, 0).expect("manager");
        let task = insert_task(&conn, tenant, campaign, "follow us", 2).expect("task");
        let completion = submit_completion(&conn, tenant, user, task, 50).expect("completion");
        (conn, tenant, completion, manager)
    }

    #[test]
    fn test_transition_once() {
        let (conn, _tenant, completion, manager) = setup();
        assert!(
            transition_from_pending(&conn, completion, CompletionStatus::Approved, manager, 100)
                .expect("approve")
        );
        assert!(
            !transition_from_pending(&conn, completion, CompletionStatus::Rejected, manager, 200)
                .expect("second decision"),
            "terminal completions must not transition again"
        );

        let c = get_completion(&conn, completion).expect("get");
        assert_eq!(c.status, CompletionStatus::Approved);
        assert_eq!(c.decided_by, Some(manager));
        assert_eq!(c.decided_at, Some(100));
    }

    #[test]
    fn test_pending_listing() {
        let (conn, tenant, completion, manager) = setup();
        assert_eq!(pending_for_tenant(&conn, tenant).expect("list").len(), 1);
        transition_from_pending(&conn, completion, CompletionStatus::Rejected, manager, 100)
            .expect("reject");
        assert!(pending_for_tenant(&conn, tenant).expect("list").is_empty());
    }
}
