//! Prize query functions.

use rusqlite::{Connection, OptionalExtension, Row};
use spindle_types::spin::Prize;
use spindle_types::{CampaignId, PrizeId};

use crate::{DbError, Result};

fn from_row(row: &Row<'_>) -> rusqlite::Result<Prize> {
    Ok(Prize {
        id: row.get(0)?,
        campaign_id: row.get(1)?,
        label: row.get(2)?,
        weight: row.get::<_, i64>(3)? as u32,
        current_stock: row.get::<_, Option<i64>>(4)?.map(|v| v as u32),
        is_active: row.get::<_, i64>(5)? != 0,
    })
}

const COLUMNS: &str = "id, campaign_id, label, weight, current_stock, is_active";

/// Insert a prize. `current_stock = None` means unlimited.
pub fn insert(
    conn: &Connection,
    campaign_id: CampaignId,
    label: &str,
    weight: u32,
    current_stock: Option<u32>,
) -> Result<PrizeId> {
    conn.execute(
        "INSERT INTO prizes (campaign_id, label, weight, current_stock)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![campaign_id, label, i64::from(weight), current_stock.map(i64::from)],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch a prize by id.
pub fn get(conn: &Connection, id: PrizeId) -> Result<Prize> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM prizes WHERE id = ?1"),
        [id],
        from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound(format!("prize {id}")))
}

/// Active, in-stock prizes for a campaign.
pub fn available_for_campaign(conn: &Connection, campaign_id: CampaignId) -> Result<Vec<Prize>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM prizes
         WHERE campaign_id = ?1 AND is_active = 1
           AND (current_stock IS NULL OR current_stock > 0)
         ORDER BY id"
    ))?;
    let rows = stmt
        .query_map([campaign_id], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Consume one unit of stock.
///
/// Returns `true` on success. Unlimited-stock prizes always succeed; a
/// finite-stock prize succeeds only while stock remains, so two concurrent
/// admissions cannot oversell the last unit.
pub fn try_consume_stock(conn: &Connection, id: PrizeId) -> Result<bool> {
    let stock: Option<i64> = conn
        .query_row("SELECT current_stock FROM prizes WHERE id = ?1", [id], |row| row.get(0))
        .optional()?
        .ok_or_else(|| DbError::NotFound(format!("prize {id}")))?;

    if stock.is_none() {
        return Ok(true);
    }

    let updated = conn.execute(
        "UPDATE prizes SET current_stock = current_stock - 1
         WHERE id = ?1 AND current_stock > 0",
        [id],
    )?;
    Ok(updated == 1)
}

/// Deactivate a prize (remove it from the wheel without deleting history).
pub fn deactivate(conn: &Connection, id: PrizeId) -> Result<()> {
    let updated = conn.execute("UPDATE prizes SET is_active = 0 WHERE id = ?1", [id])?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("prize {id}")));
    }
    Ok(())
}
