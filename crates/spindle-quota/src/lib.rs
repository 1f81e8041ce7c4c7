//! # spindle-quota
//!
//! Spin entitlement arithmetic.
//!
//! The calculator is pure: it consumes a [`entitlement::QuotaSnapshot`] of
//! ledger facts read inside the caller's transaction and produces the
//! remaining entitlement. All time handling is explicit — callers pass
//! `now` and pre-compute the window themselves.
//!
//! ## Modules
//!
//! - [`entitlement`] — snapshot, entitlement, and source-preference rules

pub mod entitlement;

/// Error types for quota arithmetic.
#[derive(Debug, thiserror::Error)]
pub enum QuotaError {
    /// Arithmetic overflow.
    #[error("arithmetic overflow in entitlement calculation")]
    Overflow,
}

/// Convenience result type for quota operations.
pub type Result<T> = std::result::Result<T, QuotaError>;
