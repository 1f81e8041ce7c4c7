//! Integration test: the approval state machine end to end.
//!
//! 1. Submit a completion, approve it, verify reward + single audit row
//! 2. Re-decide a terminal completion and verify nothing changes
//! 3. Reject leaves the balance untouched
//! 4. Cross-tenant managers are refused, with no audit trace
//! 5. Approved rewards flow into admission

use spindle_db::queries::audit::{AuditFilter, Page};
use spindle_db::queries::{audit, bonus as db_bonus, campaigns, tasks, tenants, users};
use spindle_engine::actor::{Actor, ActorRole};
use spindle_engine::notify::NoopSink;
use spindle_engine::{admission, approval, managers, EngineError};
use spindle_types::staff::CompletionStatus;
use spindle_types::{CampaignId, CompletionId, ManagerId, TenantId, UserId};

const NOW: u64 = 1_785_974_400; // 2026-08-06

struct Fixture {
    conn: rusqlite::Connection,
    tenant: TenantId,
    campaign: CampaignId,
    user: UserId,
    manager: ManagerId,
    completion: CompletionId,
}

fn setup(reward_spins: u32) -> Fixture {
    let conn = spindle_db::open_memory().expect("open");
    let tenant = tenants::insert(&conn, "acme", None, None, 0).expect("tenant");
    let campaign = campaigns::insert(&conn, tenant, "launch", 0, 24, 3, 0).expect("campaign");
    let user = users::insert(&conn, tenant, "+601", "REF00001", None, 0).expect("user");
    let manager =
        managers::create_manager(&conn, tenant, "alice", "4321", 5, 20, 0).expect("manager").id;
    let task =
        tasks::insert_task(&conn, tenant, campaign, "share the campaign", reward_spins)
            .expect("task");
    let completion = tasks::submit_completion(&conn, tenant, user, task, NOW - 100)
        .expect("completion");
    Fixture { conn, tenant, campaign, user, manager, completion }
}

fn staff(tenant: TenantId) -> Actor {
    Actor { tenant_id: tenant, role: ActorRole::Manager }
}

#[test]
fn approve_credits_reward_and_audits_once() {
    let mut f = setup(2);
    let decision = approval::approve_task(
        &mut f.conn,
        &NoopSink,
        &staff(f.tenant),
        f.manager,
        f.completion,
        "verified on instagram",
        NOW,
    )
    .expect("approve");

    assert_eq!(decision.completion.status, CompletionStatus::Approved);
    assert_eq!(decision.bonus_spins_granted, 2);
    assert_eq!(db_bonus::granted_total(&f.conn, f.user).expect("total"), 2);

    let rows = audit::query(&f.conn, &AuditFilter::default(), &Page::default()).expect("rows");
    assert_eq!(rows.len(), 1, "exactly one audit row per decision");
    assert_eq!(rows[0].task_completion_id, Some(f.completion));
    assert_eq!(rows[0].comment.as_deref(), Some("verified on instagram"));
}

#[test]
fn terminal_completion_rejects_further_decisions() {
    let mut f = setup(2);
    approval::approve_task(
        &mut f.conn,
        &NoopSink,
        &staff(f.tenant),
        f.manager,
        f.completion,
        "ok",
        NOW,
    )
    .expect("first decision");

    let re_approve = approval::approve_task(
        &mut f.conn,
        &NoopSink,
        &staff(f.tenant),
        f.manager,
        f.completion,
        "again",
        NOW + 10,
    );
    assert!(matches!(re_approve, Err(EngineError::InvalidTransition(_))));

    let re_reject = approval::reject_task(
        &mut f.conn,
        &staff(f.tenant),
        f.manager,
        f.completion,
        "flip",
        NOW + 20,
    );
    assert!(matches!(re_reject, Err(EngineError::InvalidTransition(_))));

    // One decision, one audit row, one reward.
    assert_eq!(audit::count(&f.conn, &AuditFilter::default()).expect("count"), 1);
    assert_eq!(db_bonus::granted_total(&f.conn, f.user).expect("total"), 2);
}

#[test]
fn reject_changes_no_balance() {
    let mut f = setup(4);
    let decision = approval::reject_task(
        &mut f.conn,
        &staff(f.tenant),
        f.manager,
        f.completion,
        "screenshot doctored",
        NOW,
    )
    .expect("reject");

    assert_eq!(decision.completion.status, CompletionStatus::Rejected);
    assert_eq!(decision.bonus_spins_granted, 0);
    assert_eq!(db_bonus::granted_total(&f.conn, f.user).expect("total"), 0);

    let rows = audit::query(&f.conn, &AuditFilter::default(), &Page::default()).expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].bonus_spins_granted, 0);
}

#[test]
fn cross_tenant_manager_is_denied_without_trace() {
    let mut f = setup(2);
    let other = tenants::insert(&f.conn, "rival", None, None, 0).expect("tenant");
    let outsider =
        managers::create_manager(&f.conn, other, "mallory", "0000", 5, 20, 0).expect("manager").id;

    let result = approval::approve_task(
        &mut f.conn,
        &NoopSink,
        &staff(other),
        outsider,
        f.completion,
        "mine",
        NOW,
    );
    assert!(
        matches!(result, Err(EngineError::AccessDenied)),
        "cross-tenant access is denied, never NotFound"
    );

    let completion = tasks::get_completion(&f.conn, f.completion).expect("get");
    assert_eq!(completion.status, CompletionStatus::Pending, "state untouched");
    assert_eq!(audit::count(&f.conn, &AuditFilter::default()).expect("count"), 0);
}

#[test]
fn approved_reward_is_spendable_via_admission() {
    let mut f = setup(1);
    approval::approve_task(
        &mut f.conn,
        &NoopSink,
        &staff(f.tenant),
        f.manager,
        f.completion,
        "ok",
        NOW,
    )
    .expect("approve");

    let mut rng = rand::thread_rng();
    let outcome =
        admission::admit_spin(&mut f.conn, &NoopSink, f.user, f.campaign, NOW + 10, &mut rng)
            .expect("bonus spin");
    assert!(outcome.spin.is_referral_bonus);

    let next =
        admission::admit_spin(&mut f.conn, &NoopSink, f.user, f.campaign, NOW + 20, &mut rng);
    assert!(matches!(next, Err(EngineError::QuotaExhausted)));
}
