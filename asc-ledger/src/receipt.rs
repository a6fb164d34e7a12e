use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use asc_core::{AppId, AssetId, CommitmentLevel, GroupId, Phase, SubAction, Transaction};
use asc_programs::Verdict;

/// How one application call inside a group was judged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Position of the call inside its group
    pub group_index: usize,
    pub app_id: AppId,
    pub phase: Phase,
    pub verdict: Verdict,
    /// Sub-action issued by the call, if it was approved and issued one
    pub sub_action: Option<SubAction>,
    /// Rejection reason, for diagnostics only
    pub reason: Option<String>,
}

/// Result of executing an atomic group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReceipt {
    /// Position of the group among every group the ledger has processed,
    /// committed or not. Unique per ledger, unlike `group_id`.
    pub sequence: u64,

    /// SHA-256 of the bincode-encoded group. Identical groups share it.
    pub group_id: GroupId,

    /// Round in which the group was committed; failed groups keep the current round
    pub round: u64,

    /// Whether every transaction of the group was applied
    pub success: bool,

    pub commitment_level: CommitmentLevel,

    /// Milliseconds since the Unix epoch when the group was processed
    pub timestamp: i64,

    /// Why the group failed, if it did
    pub error_message: Option<String>,

    /// Every application call that was evaluated, in order
    pub calls: Vec<CallRecord>,

    /// Application created by the group, if any
    pub created_application: Option<AppId>,

    /// Asset created by a sub-action of the group, if any
    pub created_asset: Option<AssetId>,
}

impl GroupReceipt {
    pub fn new(sequence: u64, group_id: GroupId, round: u64) -> Self {
        Self {
            sequence,
            group_id,
            round,
            success: false,
            commitment_level: CommitmentLevel::Processing,
            timestamp: chrono::Utc::now().timestamp_millis(),
            error_message: None,
            calls: Vec::new(),
            created_application: None,
            created_asset: None,
        }
    }

    /// Mark the group as applied
    pub fn commit(&mut self) {
        self.success = true;
        self.commitment_level = CommitmentLevel::Committed;
        self.error_message = None;
    }

    /// Mark the group as rolled back. Nothing it created survives.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.success = false;
        self.commitment_level = CommitmentLevel::Failed;
        self.error_message = Some(message.into());
        self.created_application = None;
        self.created_asset = None;
    }

    /// The record of the call at `group_index`, if that transaction was an
    /// evaluated application call
    pub fn call(&self, group_index: usize) -> Option<&CallRecord> {
        self.calls.iter().find(|call| call.group_index == group_index)
    }

    /// Sub-actions issued by the group, in order
    pub fn sub_actions(&self) -> impl Iterator<Item = &SubAction> {
        self.calls.iter().filter_map(|call| call.sub_action.as_ref())
    }
}

/// Identify a group by the hash of its encoding
pub fn group_id(group: &[Transaction]) -> GroupId {
    let encoded = bincode::serialize(group).unwrap_or_default();
    Sha256::digest(&encoded).into()
}
