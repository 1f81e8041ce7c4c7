//! Voucher redemption and voiding.

use rusqlite::Connection;
use spindle_db::queries::vouchers as db_vouchers;
use spindle_types::spin::Voucher;
use spindle_types::VoucherId;

use crate::actor::Actor;
use crate::{EngineError, Result};

/// Redeem a voucher within the actor's tenant. A voucher redeems at most
/// once and only while unexpired.
pub fn redeem_voucher(
    conn: &Connection,
    actor: &Actor,
    voucher_id: VoucherId,
    now: u64,
) -> Result<Voucher> {
    let voucher = db_vouchers::get(conn, voucher_id)?;
    if voucher.tenant_id != actor.tenant_id {
        return Err(EngineError::AccessDenied);
    }

    if !db_vouchers::redeem(conn, voucher_id, now)? {
        return Err(EngineError::InvalidTransition(format!(
            "voucher {voucher_id} already redeemed or expired"
        )));
    }
    tracing::info!(voucher_id, "voucher redeemed");
    Ok(db_vouchers::get(conn, voucher_id)?)
}

/// Administratively void a voucher by expiring it now. One-way; requires a
/// manager-capable actor in the voucher's tenant.
pub fn void_voucher(
    conn: &Connection,
    actor: &Actor,
    voucher_id: VoucherId,
    now: u64,
) -> Result<Voucher> {
    if !actor.role.can_manage() {
        return Err(EngineError::AccessDenied);
    }
    let voucher = db_vouchers::get(conn, voucher_id)?;
    if voucher.tenant_id != actor.tenant_id {
        return Err(EngineError::AccessDenied);
    }

    if !db_vouchers::void(conn, voucher_id, now)? {
        return Err(EngineError::InvalidTransition(format!(
            "voucher {voucher_id} already redeemed, voided, or expired"
        )));
    }
    tracing::info!(voucher_id, "voucher voided");
    Ok(db_vouchers::get(conn, voucher_id)?)
}
