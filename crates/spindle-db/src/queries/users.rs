//! End-user query functions.

use rusqlite::{Connection, OptionalExtension, Row};
use spindle_types::user::EndUser;
use spindle_types::{TenantId, UserId};

use crate::{DbError, Result};

fn from_row(row: &Row<'_>) -> rusqlite::Result<EndUser> {
    Ok(EndUser {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        phone: row.get(2)?,
        referral_code: row.get(3)?,
        referred_by_id: row.get(4)?,
        successful_referrals: row.get::<_, i64>(5)? as u32,
        created_at: row.get::<_, i64>(6)? as u64,
    })
}

const COLUMNS: &str =
    "id, tenant_id, phone, referral_code, referred_by_id, successful_referrals, created_at";

/// Insert an end-user. Returns the new row id.
pub fn insert(
    conn: &Connection,
    tenant_id: TenantId,
    phone: &str,
    referral_code: &str,
    referred_by_id: Option<UserId>,
    created_at: u64,
) -> Result<UserId> {
    conn.execute(
        "INSERT INTO end_users (tenant_id, phone, referral_code, referred_by_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![tenant_id, phone, referral_code, referred_by_id, created_at as i64],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch a user by id.
pub fn get(conn: &Connection, id: UserId) -> Result<EndUser> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM end_users WHERE id = ?1"),
        [id],
        from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound(format!("user {id}")))
}

/// Look up a user by phone within a tenant.
pub fn find_by_phone(conn: &Connection, tenant_id: TenantId, phone: &str) -> Result<Option<EndUser>> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM end_users WHERE tenant_id = ?1 AND phone = ?2"),
            rusqlite::params![tenant_id, phone],
            from_row,
        )
        .optional()?)
}

/// Look up a user by referral code within a tenant.
pub fn find_by_referral_code(
    conn: &Connection,
    tenant_id: TenantId,
    code: &str,
) -> Result<Option<EndUser>> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM end_users WHERE tenant_id = ?1 AND referral_code = ?2"),
            rusqlite::params![tenant_id, code],
            from_row,
        )
        .optional()?)
}
