//! Referral-credit ledger.
//!
//! One row per referred user. The primary key makes re-processing the same
//! referral registration a structural no-op, and the referrer's
//! `successful_referrals` counter only moves when a row is actually
//! inserted, in the same transaction.

use rusqlite::Connection;
use spindle_types::{TenantId, UserId};

use crate::Result;

/// Credit a referral exactly once.
///
/// Returns `true` if the credit was applied, `false` if this referred user
/// was already credited (no-op).
pub fn credit_once(
    conn: &Connection,
    tenant_id: TenantId,
    referrer_id: UserId,
    referred_user_id: UserId,
    credited_at: u64,
) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO referral_credits
             (referred_user_id, referrer_id, tenant_id, credited_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![referred_user_id, referrer_id, tenant_id, credited_at as i64],
    )?;
    if inserted == 0 {
        return Ok(false);
    }

    conn.execute(
        "UPDATE end_users SET successful_referrals = successful_referrals + 1 WHERE id = ?1",
        [referrer_id],
    )?;
    Ok(true)
}

/// Count credited referrals for a referrer, from the ledger itself.
pub fn count_for_referrer(conn: &Connection, referrer_id: UserId) -> Result<u32> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM referral_credits WHERE referrer_id = ?1",
        [referrer_id],
        |row| row.get(0),
    )?;
    Ok(count as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{tenants, users};

    fn setup() -> (Connection, TenantId, UserId, UserId) {
        let conn = crate::open_memory().expect("open");
        let tenant = tenants::insert(&conn, "acme", None, None, 0).expect("tenant");
        let referrer = users::insert(&conn, tenant, "+601", "REF00001", None, 0).expect("referrer");
        let referred =
            users::insert(&conn, tenant, "+602", "REF00002", Some(referrer), 10).expect("referred");
        (conn, tenant, referrer, referred)
    }

    #[test]
    fn test_credit_applied_once() {
        let (conn, tenant, referrer, referred) = setup();
        assert!(credit_once(&conn, tenant, referrer, referred, 10).expect("first"));
        assert!(!credit_once(&conn, tenant, referrer, referred, 20).expect("second"));

        let user = users::get(&conn, referrer).expect("get");
        assert_eq!(user.successful_referrals, 1, "counter must move exactly once");
        assert_eq!(count_for_referrer(&conn, referrer).expect("count"), 1);
    }

    #[test]
    fn test_counter_matches_ledger() {
        let (conn, tenant, referrer, referred) = setup();
        credit_once(&conn, tenant, referrer, referred, 10).expect("credit");
        let more = users::insert(&conn, tenant, "+603", "REF00003", Some(referrer), 11)
            .expect("third user");
        credit_once(&conn, tenant, referrer, more, 11).expect("credit");

        let user = users::get(&conn, referrer).expect("get");
        assert_eq!(user.successful_referrals, count_for_referrer(&conn, referrer).expect("count"));
        assert_eq!(user.successful_referrals, 2);
    }
}
