//! Asset Supply Contracts (ASC)
//!
//! This crate re-exports all the components of the ASC system.

pub use asc_core::*;
pub use asc_ledger::*;
pub use asc_programs::*;
