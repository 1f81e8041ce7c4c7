//! RPC command handlers, grouped by caller.

pub mod admin;
pub mod spins;
pub mod staff;
pub mod vouchers;
