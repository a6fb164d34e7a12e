pub mod config;
pub mod error;
pub mod id;
pub mod state;
pub mod sub_action;
pub mod transaction;

// Re-export the main types for convenience
pub use config::{AscConfig, SaleConfig, TokenConfig};
pub use error::{LedgerError, Rejection, StorageError};
pub use id::{Address, AppId, AssetId};
pub use state::{
    BurnState, GlobalState, HoldingsState, MintState, StateValue, StateView, STATE_SCHEMA_VERSION,
};
pub use sub_action::{SubAction, SubActionEffect};
pub use transaction::{
    itob, CommitmentLevel, GroupId, OnCompletion, Phase, ProgramKind, Transaction, TxnKind,
    TxnType, MAX_GROUP_SIZE, MIN_TXN_FEE,
};
