//! Authorization programs governing the lifecycle of a single token
//!
//! Every program is a deterministic decision function: given a call and the
//! application's stored state it approves (optionally issuing one sub-action),
//! hard-rejects, or returns a soft verdict for lifecycle phases.

pub mod burn;
pub mod context;
pub mod custody;
pub mod holdings;
pub mod host;
pub mod mint;
pub mod outcome;
pub mod program;
pub mod security;

#[cfg(test)]
mod testing;

// Re-export the main types for convenience
pub use burn::{BurnOp, BurnProgram};
pub use context::{btoi, CallContext};
pub use holdings::{HoldingsOp, HoldingsProgram};
pub use host::{Host, MockHost};
pub use mint::{CustodianRole, MintOp, MintProgram};
pub use outcome::{Outcome, Verdict};
pub use program::{Program, Programs};
pub use security::{check, CallShape, EntryPoint};
