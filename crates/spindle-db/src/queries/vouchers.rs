//! Voucher query functions.

use rusqlite::{Connection, OptionalExtension, Row};
use spindle_types::spin::Voucher;
use spindle_types::{PrizeId, SpinId, TenantId, UserId, VoucherId};

use crate::{DbError, Result};

fn from_row(row: &Row<'_>) -> rusqlite::Result<Voucher> {
    Ok(Voucher {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        user_id: row.get(2)?,
        spin_id: row.get(3)?,
        prize_id: row.get(4)?,
        code: row.get(5)?,
        is_redeemed: row.get::<_, i64>(6)? != 0,
        redeemed_at: row.get::<_, Option<i64>>(7)?.map(|v| v as u64),
        expires_at: row.get::<_, Option<i64>>(8)?.map(|v| v as u64),
        issued_at: row.get::<_, i64>(9)? as u64,
    })
}

const COLUMNS: &str =
    "id, tenant_id, user_id, spin_id, prize_id, code, is_redeemed, redeemed_at, expires_at, issued_at";

/// Issue a voucher for a winning spin. Returns the new row id.
#[allow(clippy::too_many_arguments)]
pub fn issue(
    conn: &Connection,
    tenant_id: TenantId,
    user_id: UserId,
    spin_id: SpinId,
    prize_id: PrizeId,
    code: &str,
    expires_at: Option<u64>,
    issued_at: u64,
) -> Result<VoucherId> {
    conn.execute(
        "INSERT INTO vouchers
             (tenant_id, user_id, spin_id, prize_id, code, expires_at, issued_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            tenant_id,
            user_id,
            spin_id,
            prize_id,
            code,
            expires_at.map(|v| v as i64),
            issued_at as i64,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch a voucher by id.
pub fn get(conn: &Connection, id: VoucherId) -> Result<Voucher> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM vouchers WHERE id = ?1"),
        [id],
        from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound(format!("voucher {id}")))
}

/// Look up a voucher by its redeem code within a tenant.
pub fn find_by_code(conn: &Connection, tenant_id: TenantId, code: &str) -> Result<Option<Voucher>> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM vouchers WHERE tenant_id = ?1 AND code = ?2"),
            rusqlite::params![tenant_id, code],
            from_row,
        )
        .optional()?)
}

/// Redeem a voucher. Succeeds at most once, and only while unexpired.
///
/// Returns `true` if this call performed the redemption.
pub fn redeem(conn: &Connection, id: VoucherId, now: u64) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE vouchers SET is_redeemed = 1, redeemed_at = ?2
         WHERE id = ?1 AND is_redeemed = 0
           AND (expires_at IS NULL OR expires_at > ?2)",
        rusqlite::params![id, now as i64],
    )?;
    Ok(updated == 1)
}

/// Administratively void a voucher by expiring it now. One-way: a voucher
/// that is already expired, voided, or redeemed is left untouched.
///
/// Returns `true` if this call performed the void.
pub fn void(conn: &Connection, id: VoucherId, now: u64) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE vouchers SET expires_at = ?2
         WHERE id = ?1 AND is_redeemed = 0
           AND (expires_at IS NULL OR expires_at > ?2)",
        rusqlite::params![id, now as i64],
    )?;
    Ok(updated == 1)
}
