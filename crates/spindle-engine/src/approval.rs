//! Manager approval workflow.
//!
//! A task completion moves `pending -> approved | rejected` exactly once.
//! The transition is a guarded UPDATE on the pending status, so a
//! concurrent second decision loses the race and sees `InvalidTransition`.
//! Each decision writes exactly one audit row, atomically with the
//! transition and any bonus accrual.

use rusqlite::{Connection, TransactionBehavior};
use spindle_db::queries::{audit as db_audit, managers, tasks};
use spindle_types::staff::{CompletionStatus, ManagerAction, TaskCompletion};
use spindle_types::{CompletionId, ManagerId};

use crate::actor::Actor;
use crate::bonus;
use crate::notify::{self, NotificationSink, NotifyEvent};
use crate::{store_err, with_retry, EngineError, Result};

/// Outcome of an approval decision.
#[derive(Clone, Debug)]
pub struct Decision {
    pub completion: TaskCompletion,
    /// Bonus spins actually granted (zero for rejections and clamped-out
    /// approvals).
    pub bonus_spins_granted: u32,
}

/// Approve a pending completion, crediting the task's configured reward
/// clamped to the manager's caps.
pub fn approve_task(
    conn: &mut Connection,
    sink: &dyn NotificationSink,
    actor: &Actor,
    manager_id: ManagerId,
    completion_id: CompletionId,
    comment: &str,
    now: u64,
) -> Result<Decision> {
    let decision = with_retry(|| {
        decide(conn, actor, manager_id, completion_id, comment, now, CompletionStatus::Approved)
    })?;

    if decision.bonus_spins_granted > 0 {
        notify::dispatch(
            sink,
            decision.completion.user_id,
            NotifyEvent::BonusGranted,
            serde_json::json!({
                "amount": decision.bonus_spins_granted,
                "task_completion_id": completion_id,
            }),
        );
    }
    Ok(decision)
}

/// Reject a pending completion. No balance change.
pub fn reject_task(
    conn: &mut Connection,
    actor: &Actor,
    manager_id: ManagerId,
    completion_id: CompletionId,
    comment: &str,
    now: u64,
) -> Result<Decision> {
    with_retry(|| {
        decide(conn, actor, manager_id, completion_id, comment, now, CompletionStatus::Rejected)
    })
}

fn decide(
    conn: &mut Connection,
    actor: &Actor,
    manager_id: ManagerId,
    completion_id: CompletionId,
    comment: &str,
    now: u64,
    verdict: CompletionStatus,
) -> Result<Decision> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(store_err)?;

    let manager = managers::get(&tx, manager_id)?;
    if !manager.is_active
        || !actor.role.can_manage()
        || actor.tenant_id != manager.tenant_id
    {
        return Err(EngineError::AccessDenied);
    }

    let completion = tasks::get_completion(&tx, completion_id)?;
    // Cross-tenant completions are refused outright, not reported missing.
    if completion.tenant_id != manager.tenant_id {
        return Err(EngineError::AccessDenied);
    }
    if completion.status.is_terminal() {
        return Err(EngineError::InvalidTransition(format!(
            "completion {completion_id} already {}",
            completion.status.as_str()
        )));
    }

    let transitioned = tasks::transition_from_pending(&tx, completion_id, verdict, manager_id, now)?;
    if !transitioned {
        return Err(EngineError::InvalidTransition(format!(
            "completion {completion_id} decided concurrently"
        )));
    }

    let granted = match verdict {
        CompletionStatus::Approved => {
            let task = tasks::get_task(&tx, completion.task_id)?;
            bonus::apply_task_reward(
                &tx,
                &manager,
                completion.user_id,
                completion_id,
                task.reward_spins,
                now,
            )?
        }
        _ => 0,
    };

    let action = match verdict {
        CompletionStatus::Approved => ManagerAction::Approve,
        _ => ManagerAction::Reject,
    };
    db_audit::append(
        &tx,
        manager.tenant_id,
        manager_id,
        action,
        Some(completion_id),
        Some(completion.user_id),
        granted,
        Some(comment),
        now,
    )?;

    let updated = tasks::get_completion(&tx, completion_id)?;
    tx.commit().map_err(store_err)?;

    tracing::info!(
        manager_id,
        completion_id,
        verdict = verdict.as_str(),
        granted,
        "completion decided"
    );
    Ok(Decision { completion: updated, bonus_spins_granted: granted })
}
