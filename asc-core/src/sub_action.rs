use crate::id::{Address, AssetId};
use serde::{Deserialize, Serialize};

/// A ledger action issued by an application as the side effect of an approved call.
///
/// At most one sub-action is issued per call, and it commits or rolls back
/// together with the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubAction {
    /// Create a new asset whose full supply is held by the issuing application
    AssetConfig {
        total: u64,
        decimals: u32,
        name: String,
        unit: String,
    },

    /// Move units of an asset out of the issuing application's account.
    /// A zero-amount transfer to the application itself registers custody.
    AssetTransfer {
        asset: AssetId,
        receiver: Address,
        amount: u64,
    },
}

/// What the ledger reports back after executing a sub-action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubActionEffect {
    /// An asset was created with this id
    AssetCreated(AssetId),
    /// Units were moved
    Transferred,
}

impl SubActionEffect {
    pub fn created_asset(&self) -> Option<AssetId> {
        match self {
            SubActionEffect::AssetCreated(id) => Some(*id),
            SubActionEffect::Transferred => None,
        }
    }
}
