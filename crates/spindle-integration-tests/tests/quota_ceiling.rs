//! Integration test: the quota ceiling holds under concurrency.
//!
//! Many threads race `admit_spin` for the same (user, campaign) pair
//! against one shared on-disk database. However the races resolve, the
//! number of admitted spin rows inside one cooldown window must never
//! exceed the entitlement visible at admission time.

use spindle_db::queries::{campaigns, spins, tenants, users};
use spindle_engine::admission;
use spindle_engine::notify::NoopSink;
use spindle_engine::EngineError;
use spindle_types::{CampaignId, UserId};

const NOW: u64 = 1_785_974_400; // 2026-08-06

/// Seed a tenant, a campaign with the given spin limit, and one user.
/// Returns the database path plus the seeded ids.
fn seed(
    dir: &tempfile::TempDir,
    spin_limit: u32,
) -> (std::path::PathBuf, UserId, CampaignId) {
    let path = dir.path().join("spindle.db");
    let conn = spindle_db::open(&path).expect("open");
    let tenant = tenants::insert(&conn, "acme", None, None, 0).expect("tenant");
    let campaign =
        campaigns::insert(&conn, tenant, "launch", spin_limit, 24, 3, 0).expect("campaign");
    let user = users::insert(&conn, tenant, "+601", "REF00001", None, 0).expect("user");
    (path, user, campaign)
}

#[test]
fn quota_ceiling_holds_under_concurrent_admissions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (path, user, campaign) = seed(&dir, 1);

    let threads: Vec<_> = (0..8)
        .map(|i| {
            let path = path.clone();
            std::thread::spawn(move || {
                let mut conn = spindle_db::open(&path).expect("open");
                let mut rng = rand::thread_rng();
                admission::admit_spin(
                    &mut conn,
                    &NoopSink,
                    user,
                    campaign,
                    NOW + i, // distinct timestamps, same window
                    &mut rng,
                )
            })
        })
        .collect();

    let mut admitted = 0;
    let mut exhausted = 0;
    let mut conflicted = 0;
    for handle in threads {
        match handle.join().expect("thread") {
            Ok(_) => admitted += 1,
            Err(EngineError::QuotaExhausted) => exhausted += 1,
            Err(EngineError::TransientConflict) => conflicted += 1,
            Err(e) => panic!("unexpected admission error: {e}"),
        }
    }

    assert_eq!(admitted, 1, "exactly one spin admitted for limit 1");
    assert!(exhausted >= 1, "at least one racer must see QuotaExhausted");
    assert_eq!(admitted + exhausted + conflicted, 8);

    // The ledger agrees with the callers.
    let conn = spindle_db::open(&path).expect("open");
    let rows = spins::list_for_user(&conn, user, campaign).expect("list");
    assert_eq!(rows.len(), 1, "the store holds exactly one spin row");
}

#[test]
fn one_remaining_bonus_spin_admits_exactly_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (path, user, campaign) = seed(&dir, 0); // no regular quota at all

    {
        let conn = spindle_db::open(&path).expect("open");
        let tenant = users::get(&conn, user).expect("user").tenant_id;
        spindle_db::queries::bonus::append_entry(
            &conn,
            tenant,
            user,
            spindle_types::user::BonusSource::Override,
            1,
            None,
            None,
            Some("seeded"),
            0,
        )
        .expect("bonus entry");
    }

    let threads: Vec<_> = (0..4)
        .map(|i| {
            let path = path.clone();
            std::thread::spawn(move || {
                let mut conn = spindle_db::open(&path).expect("open");
                let mut rng = rand::thread_rng();
                admission::admit_spin(&mut conn, &NoopSink, user, campaign, NOW + i, &mut rng)
            })
        })
        .collect();

    let mut admitted = 0;
    for handle in threads {
        if let Ok(outcome) = handle.join().expect("thread") {
            assert!(outcome.spin.is_referral_bonus, "only the bonus pool was available");
            admitted += 1;
        }
    }
    assert_eq!(admitted, 1, "one bonus spin admits exactly once under racing");

    let conn = spindle_db::open(&path).expect("open");
    let rows = spins::list_for_user(&conn, user, campaign).expect("list");
    assert_eq!(rows.len(), 1);
}

#[test]
fn serial_admissions_stop_exactly_at_the_limit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (path, user, campaign) = seed(&dir, 3);

    let mut conn = spindle_db::open(&path).expect("open");
    let mut rng = rand::thread_rng();
    for i in 0..3 {
        admission::admit_spin(&mut conn, &NoopSink, user, campaign, NOW + i, &mut rng)
            .expect("within limit");
    }
    let over = admission::admit_spin(&mut conn, &NoopSink, user, campaign, NOW + 10, &mut rng);
    assert!(matches!(over, Err(EngineError::QuotaExhausted)));

    let rows = spins::list_for_user(&conn, user, campaign).expect("list");
    assert_eq!(rows.len(), 3);
}
