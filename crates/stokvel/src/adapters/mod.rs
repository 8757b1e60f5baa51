// Rust guideline compliant 2026-10-19

//! Adapters (secondary ports) for the stokvel binary.
//!
//! Each sub-module implements a port trait defined in the `domain` crate, or
//! stands in for the storage layer the core never touches.

pub mod roster;
pub mod secure_random;
pub mod system_clock;
