//! # spindle-types
//!
//! Shared domain types used across the Spindle workspace.
//! All timestamps are Unix epoch seconds (`u64`); row identifiers are
//! SQLite rowids (`i64`).

pub mod campaign;
pub mod spin;
pub mod staff;
pub mod tenant;
pub mod usage;
pub mod user;

/// Common row-id aliases.
pub type TenantId = i64;
pub type CampaignId = i64;
pub type UserId = i64;
pub type ManagerId = i64;
pub type SpinId = i64;
pub type PrizeId = i64;
pub type VoucherId = i64;
pub type TaskId = i64;
pub type CompletionId = i64;
pub type AuditId = i64;
pub type OverrideId = i64;

/// Seconds per hour, used to convert cooldown hours into window spans.
pub const SECONDS_PER_HOUR: u64 = 3600;

/// Default regular spins per cooldown window for new campaigns.
pub const DEFAULT_SPIN_LIMIT: u32 = 1;

/// Default cooldown window in hours.
pub const DEFAULT_COOLDOWN_HOURS: u32 = 24;

/// Default referrals required to earn one bonus spin.
pub const DEFAULT_REFERRALS_PER_SPIN: u32 = 3;

/// Length of derived referral codes (hex characters).
pub const REFERRAL_CODE_LEN: usize = 8;
