//! End-user enrollment.
//!
//! Users are created on their first interaction with a campaign. A valid
//! same-tenant referral code links the referrer and credits the referral
//! milestone in the same transaction; an unknown code enrolls without
//! credit rather than failing the interaction.

use rusqlite::{Connection, TransactionBehavior};
use spindle_db::queries::{referrals, tenants, users};
use spindle_types::user::EndUser;
use spindle_types::{TenantId, REFERRAL_CODE_LEN};

use crate::{store_err, with_retry, EngineError, Result};

/// Context string for referral-code derivation.
const REFERRAL_CODE_CONTEXT: &str = "spindle v1 referral-code";

/// Derive a user's referral code from their phone number.
pub fn referral_code_for_phone(phone: &str) -> String {
    let key = blake3::derive_key(REFERRAL_CODE_CONTEXT, phone.as_bytes());
    hex::encode(&key[..REFERRAL_CODE_LEN / 2]).to_uppercase()
}

/// Result of an enrollment call.
#[derive(Clone, Debug)]
pub struct Enrollment {
    pub user: EndUser,
    /// Whether this call credited a referral milestone.
    pub referral_credited: bool,
    /// Whether this call created the user (false = already enrolled).
    pub created: bool,
}

/// Enroll a user by phone, idempotently.
///
/// A second call with the same phone returns the existing user and
/// changes nothing — in particular it cannot re-credit a referral.
pub fn enroll_user(
    conn: &mut Connection,
    tenant_id: TenantId,
    phone: &str,
    referrer_code: Option<&str>,
    now: u64,
) -> Result<Enrollment> {
    with_retry(|| {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(store_err)?;

        let tenant = tenants::get(&tx, tenant_id)?;
        if !tenant.is_serving() {
            return Err(EngineError::AccessDenied);
        }

        if let Some(existing) = users::find_by_phone(&tx, tenant_id, phone)? {
            tx.commit().map_err(store_err)?;
            return Ok(Enrollment { user: existing, referral_credited: false, created: false });
        }

        let referrer = match referrer_code {
            Some(code) => users::find_by_referral_code(&tx, tenant_id, code)?,
            None => None,
        };

        let code = referral_code_for_phone(phone);
        let user_id = users::insert(
            &tx,
            tenant_id,
            phone,
            &code,
            referrer.as_ref().map(|r| r.id),
            now,
        )?;

        let credited = match &referrer {
            Some(r) => referrals::credit_once(&tx, tenant_id, r.id, user_id, now)?,
            None => false,
        };

        let user = users::get(&tx, user_id)?;
        tx.commit().map_err(store_err)?;

        tracing::info!(user_id, tenant_id, referred = credited, "user enrolled");
        Ok(Enrollment { user, referral_credited: credited, created: true })
    })
}
