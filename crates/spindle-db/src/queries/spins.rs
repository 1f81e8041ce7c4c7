//! Spin event query functions.
//!
//! Spin rows are the ground truth for quota accounting: inserted exactly
//! once per admitted attempt, never mutated (enforced by trigger).

use rusqlite::{Connection, OptionalExtension, Row};
use spindle_types::spin::SpinRecord;
use spindle_types::{CampaignId, PrizeId, SpinId, TenantId, UserId};

use crate::{DbError, Result};

fn from_row(row: &Row<'_>) -> rusqlite::Result<SpinRecord> {
    Ok(SpinRecord {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        user_id: row.get(2)?,
        campaign_id: row.get(3)?,
        spin_date: row.get::<_, i64>(4)? as u64,
        is_referral_bonus: row.get::<_, i64>(5)? != 0,
        won_prize: row.get::<_, i64>(6)? != 0,
        prize_id: row.get(7)?,
    })
}

const COLUMNS: &str =
    "id, tenant_id, user_id, campaign_id, spin_date, is_referral_bonus, won_prize, prize_id";

/// Insert a spin event. Returns the new row id.
#[allow(clippy::too_many_arguments)]
pub fn insert(
    conn: &Connection,
    tenant_id: TenantId,
    user_id: UserId,
    campaign_id: CampaignId,
    spin_date: u64,
    is_referral_bonus: bool,
    won_prize: bool,
    prize_id: Option<PrizeId>,
) -> Result<SpinId> {
    conn.execute(
        "INSERT INTO spins
             (tenant_id, user_id, campaign_id, spin_date, is_referral_bonus, won_prize, prize_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            tenant_id,
            user_id,
            campaign_id,
            spin_date as i64,
            is_referral_bonus as i64,
            won_prize as i64,
            prize_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch a spin by id.
pub fn get(conn: &Connection, id: SpinId) -> Result<SpinRecord> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM spins WHERE id = ?1"),
        [id],
        from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound(format!("spin {id}")))
}

/// Count regular (non-bonus) spins for a (user, campaign) pair at or after
/// `window_start`.
pub fn regular_used_since(
    conn: &Connection,
    user_id: UserId,
    campaign_id: CampaignId,
    window_start: u64,
) -> Result<u32> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM spins
         WHERE user_id = ?1 AND campaign_id = ?2
           AND is_referral_bonus = 0 AND spin_date >= ?3",
        rusqlite::params![user_id, campaign_id, window_start as i64],
        |row| row.get(0),
    )?;
    Ok(count as u32)
}

/// Count bonus spins for a (user, campaign) pair. The bonus pool is not
/// cooldown-bound, so there is no window parameter.
pub fn bonus_used(conn: &Connection, user_id: UserId, campaign_id: CampaignId) -> Result<u32> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM spins
         WHERE user_id = ?1 AND campaign_id = ?2 AND is_referral_bonus = 1",
        rusqlite::params![user_id, campaign_id],
        |row| row.get(0),
    )?;
    Ok(count as u32)
}

/// List spins for a (user, campaign) pair, oldest first.
pub fn list_for_user(
    conn: &Connection,
    user_id: UserId,
    campaign_id: CampaignId,
) -> Result<Vec<SpinRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM spins
         WHERE user_id = ?1 AND campaign_id = ?2 ORDER BY spin_date, id"
    ))?;
    let rows = stmt
        .query_map(rusqlite::params![user_id, campaign_id], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
