//! Manager lifecycle and PIN handling.
//!
//! PINs are hashed with Argon2id in PHC string format. Verification
//! distinguishes a mismatch (`Ok(false)`) from a malformed stored hash
//! (an error).

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rusqlite::Connection;
use spindle_db::queries::managers as db_managers;
use spindle_types::staff::Manager;
use spindle_types::{ManagerId, TenantId};

use crate::actor::Actor;
use crate::{EngineError, Result};

/// Hash a PIN for storage.
pub fn hash_pin(pin: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| EngineError::Internal(format!("pin hashing failed: {e}")))
}

/// Verify a PIN against a stored PHC hash.
pub fn verify_pin(pin: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| EngineError::Internal(format!("malformed pin hash: {e}")))?;
    match Argon2::default().verify_password(pin.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(EngineError::Internal(format!("pin verification failed: {e}"))),
    }
}

/// Create a manager with a hashed PIN.
pub fn create_manager(
    conn: &Connection,
    tenant_id: TenantId,
    name: &str,
    pin: &str,
    max_bonus_spins_per_approval: u32,
    max_spins_per_user: u32,
    now: u64,
) -> Result<Manager> {
    let pin_hash = hash_pin(pin)?;
    let id = db_managers::insert(
        conn,
        tenant_id,
        name,
        &pin_hash,
        max_bonus_spins_per_approval,
        max_spins_per_user,
        now,
    )?;
    tracing::info!(manager_id = id, tenant_id, "manager created");
    Ok(db_managers::get(conn, id)?)
}

/// Check a manager's PIN. Inactive managers never authenticate.
pub fn authenticate_manager(conn: &Connection, manager_id: ManagerId, pin: &str) -> Result<bool> {
    let manager = db_managers::get(conn, manager_id)?;
    if !manager.is_active {
        return Ok(false);
    }
    verify_pin(pin, &manager.pin_hash)
}

/// Deactivate a manager within the actor's tenant. Deactivation preserves
/// the row so audit references stay valid.
pub fn deactivate_manager(conn: &Connection, actor: &Actor, manager_id: ManagerId) -> Result<()> {
    let manager = db_managers::get(conn, manager_id)?;
    if actor.tenant_id != manager.tenant_id || !actor.role.can_manage() {
        return Err(EngineError::AccessDenied);
    }
    db_managers::deactivate(conn, manager_id)?;
    tracing::info!(manager_id, "manager deactivated");
    Ok(())
}
