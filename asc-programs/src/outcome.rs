use asc_core::{Rejection, SubAction};
use serde::{Deserialize, Serialize};

/// Result of evaluating one application call.
///
/// `HardReject` aborts the call and its whole group. `SoftDecision` is the
/// computed verdict of the lifecycle phases (close-out, delete, update and the
/// creator-gated opt-ins) after every hard check has already passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    HardReject(Rejection),
    Approve(Option<SubAction>),
    SoftDecision(bool),
}

/// Observable verdict of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Approved,
    Rejected,
}

impl Outcome {
    /// Lift a business rule's result into an outcome
    pub fn from_rule(result: Result<Option<SubAction>, Rejection>) -> Self {
        match result {
            Ok(action) => Outcome::Approve(action),
            Err(rejection) => Outcome::HardReject(rejection),
        }
    }

    /// Lift a lifecycle rule's result: hard checks first, then the soft verdict
    pub fn from_decision(result: Result<bool, Rejection>) -> Self {
        match result {
            Ok(decision) => Outcome::SoftDecision(decision),
            Err(rejection) => Outcome::HardReject(rejection),
        }
    }

    pub fn verdict(&self) -> Verdict {
        if self.is_approved() {
            Verdict::Approved
        } else {
            Verdict::Rejected
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Outcome::Approve(_) | Outcome::SoftDecision(true))
    }

    pub fn is_hard_reject(&self) -> bool {
        matches!(self, Outcome::HardReject(_))
    }

    /// The sub-action issued by an approved call, if any
    pub fn sub_action(&self) -> Option<&SubAction> {
        match self {
            Outcome::Approve(action) => action.as_ref(),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::HardReject(rejection) => Some(rejection),
            _ => None,
        }
    }
}
