//! Integration test: manager grant caps and audit atomicity.
//!
//! 1. A grant over the per-approval cap fails, mutating nothing
//! 2. Cumulative grants across managers respect the per-user ceiling
//! 3. Every successful grant writes exactly one audit row; failures none
//! 4. Granted bonus is immediately spendable through admission

use spindle_db::queries::audit::{AuditFilter, Page};
use spindle_db::queries::{audit, bonus as db_bonus, campaigns, tenants, users};
use spindle_engine::notify::NoopSink;
use spindle_engine::{admission, bonus, managers, EngineError};
use spindle_types::staff::ManagerAction;
use spindle_types::{ManagerId, TenantId, UserId};

const NOW: u64 = 1_785_974_400; // 2026-08-06

fn setup() -> (rusqlite::Connection, TenantId, UserId, ManagerId) {
    let conn = spindle_db::open_memory().expect("open");
    let tenant = tenants::insert(&conn, "acme", None, None, 0).expect("tenant");
    let user = users::insert(&conn, tenant, "+601", "REF00001", None, 0).expect("user");
    let manager = managers::create_manager(&conn, tenant, "alice", "4321", 5, 12, 0)
        .expect("manager");
    (conn, tenant, user, manager.id)
}

#[test]
fn over_cap_grant_fails_with_no_side_effects() {
    let (conn, _tenant, user, manager) = setup();
    let mut conn = conn;

    // max_bonus_spins_per_approval = 5; amount 6 must fail.
    let result = bonus::grant_bonus(&mut conn, &NoopSink, manager, user, 6, "too much", NOW);
    assert!(matches!(
        result,
        Err(EngineError::CapExceeded { limit: 5, requested: 6 })
    ));

    assert_eq!(db_bonus::granted_total(&conn, user).expect("total"), 0, "balance unchanged");
    assert_eq!(
        audit::count(&conn, &AuditFilter::default()).expect("count"),
        0,
        "failed grants write no audit row"
    );
}

#[test]
fn cumulative_cap_spans_all_managers() {
    let (conn, tenant, user, first) = setup();
    let second = managers::create_manager(&conn, tenant, "bob", "9999", 5, 12, 0)
        .expect("manager")
        .id;
    let mut conn = conn;

    bonus::grant_bonus(&mut conn, &NoopSink, first, user, 5, "batch 1", NOW).expect("grant");
    bonus::grant_bonus(&mut conn, &NoopSink, second, user, 5, "batch 2", NOW + 1).expect("grant");

    // 10 of 12 used; 3 more would cross the per-user ceiling.
    let result = bonus::grant_bonus(&mut conn, &NoopSink, first, user, 3, "batch 3", NOW + 2);
    assert!(matches!(
        result,
        Err(EngineError::CapExceeded { limit: 12, requested: 13 })
    ));

    // 2 more exactly fills it.
    bonus::grant_bonus(&mut conn, &NoopSink, second, user, 2, "batch 3", NOW + 3).expect("fill");
    assert_eq!(db_bonus::granted_total(&conn, user).expect("total"), 12);
}

#[test]
fn each_successful_grant_audits_exactly_once() {
    let (conn, _tenant, user, manager) = setup();
    let mut conn = conn;

    for i in 0..3 {
        bonus::grant_bonus(&mut conn, &NoopSink, manager, user, 1, "standee", NOW + i)
            .expect("grant");
    }

    let rows = audit::query(&conn, &AuditFilter::default(), &Page::default()).expect("rows");
    assert_eq!(rows.len(), 3);
    for row in &rows {
        assert_eq!(row.action, ManagerAction::Grant);
        assert_eq!(row.bonus_spins_granted, 1);
        assert_eq!(row.user_id, Some(user));
        assert_eq!(row.task_completion_id, None, "direct grants carry no completion id");
    }
}

#[test]
fn granted_bonus_is_spendable_immediately() {
    let (conn, tenant, user, manager) = setup();
    let campaign = campaigns::insert(&conn, tenant, "launch", 0, 24, 3, 0).expect("campaign");
    let mut conn = conn;

    bonus::grant_bonus(&mut conn, &NoopSink, manager, user, 2, "promo", NOW).expect("grant");

    let mut rng = rand::thread_rng();
    let first =
        admission::admit_spin(&mut conn, &NoopSink, user, campaign, NOW + 1, &mut rng)
            .expect("first bonus spin");
    assert!(first.spin.is_referral_bonus);

    admission::admit_spin(&mut conn, &NoopSink, user, campaign, NOW + 2, &mut rng)
        .expect("second bonus spin");
    let third = admission::admit_spin(&mut conn, &NoopSink, user, campaign, NOW + 3, &mut rng);
    assert!(matches!(third, Err(EngineError::QuotaExhausted)));
}
