//! # spindle-engine
//!
//! The quota, accounting, and audit engine: decides how many spins a
//! (user, campaign) pair has left, applies bonus accrual from its three
//! independent sources, runs the manager approval workflow under enforced
//! caps, and keeps the append-only audit trail and monthly usage counters.
//!
//! Every mutating operation runs inside one `BEGIN IMMEDIATE` transaction
//! against the [`spindle_db`] ledger, so the validation read and the write
//! it guards can never be split. Transient lock conflicts are retried once
//! with fresh reads, then surfaced as [`EngineError::TransientConflict`].
//!
//! ## Modules
//!
//! - [`admission`] — spin admission and entitlement reads
//! - [`approval`] — manager approve/reject state machine
//! - [`audit`] — tenant-scoped audit log reads
//! - [`bonus`] — referral credits and bonus grants
//! - [`campaigns`] — campaign creation against plan limits
//! - [`enroll`] — first-interaction user enrollment
//! - [`managers`] — manager lifecycle and PIN hashing
//! - [`prize`] — weighted prize selection
//! - [`usage`] — lazy monthly usage accounting
//! - [`vouchers`] — voucher redemption and voiding
//! - [`actor`] / [`notify`] — collaborator traits (auth, delivery)

pub mod actor;
pub mod admission;
pub mod approval;
pub mod audit;
pub mod bonus;
pub mod campaigns;
pub mod enroll;
pub mod managers;
pub mod notify;
pub mod prize;
pub mod usage;
pub mod vouchers;

use spindle_db::DbError;

/// Error taxonomy for engine operations.
///
/// Validation failures are returned to the caller as typed results and
/// never escape as faults. A store-level fault is surfaced as [`Store`]
/// and must never be read as `QuotaExhausted`.
///
/// [`Store`]: EngineError::Store
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The user's entitlement (or the tenant's monthly budget) is spent.
    #[error("quota exhausted")]
    QuotaExhausted,

    /// A finite-stock prize has no units left.
    #[error("prize out of stock")]
    OutOfStock,

    /// The campaign is inactive, archived, or its tenant is not serving.
    #[error("campaign inactive")]
    CampaignInactive,

    /// A manager cap would be breached.
    #[error("cap exceeded: requested {requested}, limit {limit}")]
    CapExceeded { limit: u64, requested: u64 },

    /// Illegal state-machine transition.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Cross-tenant access or insufficient role.
    #[error("access denied")]
    AccessDenied,

    #[error("not found: {0}")]
    NotFound(String),

    /// Transaction conflict that persisted past the internal retry.
    #[error("transient conflict, retry the operation")]
    TransientConflict,

    /// Opaque store fault.
    #[error("store error: {0}")]
    Store(DbError),

    /// Unexpected internal fault.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Stable machine-readable code for the RPC surface.
    pub fn code(&self) -> &'static str {
        match self {
            Self::QuotaExhausted => "QUOTA_EXHAUSTED",
            Self::OutOfStock => "OUT_OF_STOCK",
            Self::CampaignInactive => "CAMPAIGN_INACTIVE",
            Self::CapExceeded { .. } => "CAP_EXCEEDED",
            Self::InvalidTransition(_) => "INVALID_TRANSITION",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::TransientConflict => "TRANSIENT_CONFLICT",
            Self::Store(_) => "STORE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DbError> for EngineError {
    fn from(e: DbError) -> Self {
        if e.is_transient() {
            return EngineError::TransientConflict;
        }
        match e {
            DbError::NotFound(what) => EngineError::NotFound(what),
            other => EngineError::Store(other),
        }
    }
}

/// Convenience result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Wrap a raw SQLite error from transaction plumbing.
pub(crate) fn store_err(e: rusqlite::Error) -> EngineError {
    EngineError::from(DbError::Sqlite(e))
}

/// Run `attempt`, retrying exactly once on a transient conflict.
pub(crate) fn with_retry<T>(mut attempt: impl FnMut() -> Result<T>) -> Result<T> {
    match attempt() {
        Err(EngineError::TransientConflict) => {
            tracing::debug!("transient conflict, retrying once with fresh reads");
            attempt()
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_maps_to_conflict() {
        let busy = DbError::Sqlite(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ));
        assert!(matches!(EngineError::from(busy), EngineError::TransientConflict));
    }

    #[test]
    fn test_not_found_passthrough() {
        let e = EngineError::from(DbError::NotFound("campaign 3".into()));
        assert!(matches!(e, EngineError::NotFound(_)));
        assert_eq!(e.code(), "NOT_FOUND");
    }

    #[test]
    fn test_retry_runs_twice_then_surfaces() {
        let mut calls = 0;
        let result: Result<()> = with_retry(|| {
            calls += 1;
            Err(EngineError::TransientConflict)
        });
        assert_eq!(calls, 2);
        assert!(matches!(result, Err(EngineError::TransientConflict)));
    }

    #[test]
    fn test_retry_passes_success_through() {
        let mut calls = 0;
        let result = with_retry(|| {
            calls += 1;
            Ok(41 + 1)
        });
        assert_eq!(calls, 1);
        assert_eq!(result.expect("ok"), 42);
    }

    #[test]
    fn test_no_retry_on_validation_errors() {
        let mut calls = 0;
        let result: Result<()> = with_retry(|| {
            calls += 1;
            Err(EngineError::QuotaExhausted)
        });
        assert_eq!(calls, 1, "validation failures are not retried");
        assert!(matches!(result, Err(EngineError::QuotaExhausted)));
    }
}
