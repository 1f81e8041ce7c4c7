//! Managers, social tasks, task completions, and the audit log.

use serde::{Deserialize, Serialize};

use crate::{AuditId, CampaignId, CompletionId, ManagerId, TaskId, TenantId, UserId};

/// A tenant staff account. Deactivated, never deleted, so audit rows keep
/// a valid reference.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Manager {
    pub id: ManagerId,
    pub tenant_id: TenantId,
    pub name: String,
    /// Argon2id PHC-format hash of the manager's PIN.
    pub pin_hash: String,
    /// Ceiling on a single approval or direct grant.
    pub max_bonus_spins_per_approval: u32,
    /// Ceiling on cumulative manager-granted bonus spins per user.
    pub max_spins_per_user: u32,
    pub is_active: bool,
    pub created_at: u64,
}

/// A social task end-users can complete for bonus spins.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SocialTask {
    pub id: TaskId,
    pub tenant_id: TenantId,
    pub campaign_id: CampaignId,
    pub title: String,
    /// Bonus spins awarded on approval, before cap clamping.
    pub reward_spins: u32,
    pub is_active: bool,
}

/// Lifecycle of a task-completion submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Pending,
    Approved,
    Rejected,
}

impl CompletionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Terminal states accept no further transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// An end-user's claim to have completed a social task.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskCompletion {
    pub id: CompletionId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub task_id: TaskId,
    pub status: CompletionStatus,
    pub decided_by: Option<ManagerId>,
    pub decided_at: Option<u64>,
    pub submitted_at: u64,
}

/// Privileged actions recorded in the audit log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerAction {
    Approve,
    Reject,
    Grant,
}

impl ManagerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::Reject => "REJECT",
            Self::Grant => "GRANT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "APPROVE" => Some(Self::Approve),
            "REJECT" => Some(Self::Reject),
            "GRANT" => Some(Self::Grant),
            _ => None,
        }
    }
}

/// One immutable audit row. The write path is append-only; no update or
/// delete operation exists anywhere in the public contract.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: AuditId,
    pub tenant_id: TenantId,
    pub manager_id: ManagerId,
    pub action: ManagerAction,
    /// `None` for direct grants.
    pub task_completion_id: Option<CompletionId>,
    pub user_id: Option<UserId>,
    pub bonus_spins_granted: u32,
    pub comment: Option<String>,
    pub created_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_status_terminality() {
        assert!(!CompletionStatus::Pending.is_terminal());
        assert!(CompletionStatus::Approved.is_terminal());
        assert!(CompletionStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_status_round_trip() {
        for s in [
            CompletionStatus::Pending,
            CompletionStatus::Approved,
            CompletionStatus::Rejected,
        ] {
            assert_eq!(CompletionStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(CompletionStatus::parse("cancelled"), None);
    }

    #[test]
    fn test_action_round_trip() {
        for a in [
            ManagerAction::Approve,
            ManagerAction::Reject,
            ManagerAction::Grant,
        ] {
            assert_eq!(ManagerAction::parse(a.as_str()), Some(a));
        }
        assert_eq!(ManagerAction::parse("REVOKE"), None);
    }
}
