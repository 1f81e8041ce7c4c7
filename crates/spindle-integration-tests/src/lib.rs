//! Integration test crate for the Spindle engine.
//!
//! This crate has no library code — it only contains integration tests
//! that exercise quota, accrual, approval, and audit flows across
//! multiple workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p spindle-integration-tests
//! ```
