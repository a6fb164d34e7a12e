use crate::id::{Address, AppId, AssetId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hash identifying an atomic transaction group (32-byte array)
pub type GroupId = [u8; 32];

/// Minimum fee, in micro-units of the payment currency, for any transaction
/// including sub-actions issued by applications.
pub const MIN_TXN_FEE: u64 = 1_000;

/// Maximum number of transactions in an atomic group
pub const MAX_GROUP_SIZE: usize = 16;

/// Represents the commitment level of a transaction group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CommitmentLevel {
    /// Group is being evaluated and can still be rolled back
    #[default]
    Processing,
    /// Group has been committed; all of its effects are final
    Committed,
    /// Group was rejected; none of its effects were applied
    Failed,
}

/// What an application call asks the application to do with itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OnCompletion {
    #[default]
    NoOp,
    OptIn,
    CloseOut,
    DeleteApplication,
    UpdateApplication,
}

/// Which authorization program an application runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramKind {
    Mint,
    Holdings,
    Burn,
}

impl fmt::Display for ProgramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramKind::Mint => write!(f, "mint"),
            ProgramKind::Holdings => write!(f, "holdings"),
            ProgramKind::Burn => write!(f, "burn"),
        }
    }
}

/// Lifecycle phase of an application call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Creation,
    NoOp,
    OptIn,
    CloseOut,
    Update,
    Delete,
}

impl Phase {
    /// Application id zero always means creation, regardless of on-completion
    pub fn of(app_id: AppId, on_completion: OnCompletion) -> Self {
        if app_id == 0 {
            return Phase::Creation;
        }
        match on_completion {
            OnCompletion::NoOp => Phase::NoOp,
            OnCompletion::OptIn => Phase::OptIn,
            OnCompletion::CloseOut => Phase::CloseOut,
            OnCompletion::DeleteApplication => Phase::Delete,
            OnCompletion::UpdateApplication => Phase::Update,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Creation => "creation",
            Phase::NoOp => "noop",
            Phase::OptIn => "optin",
            Phase::CloseOut => "closeout",
            Phase::Update => "update",
            Phase::Delete => "delete",
        }
    }
}

/// The type-specific part of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxnKind {
    /// Move payment currency between accounts
    Payment { receiver: Address, amount: u64 },

    /// Move asset units between accounts. A zero transfer to oneself opts the
    /// sender in to the asset.
    AssetTransfer {
        asset: AssetId,
        receiver: Address,
        amount: u64,
    },

    /// Invoke an application. `app_id == 0` creates a new application running
    /// `program`.
    ApplicationCall {
        app_id: AppId,
        on_completion: OnCompletion,
        args: Vec<Vec<u8>>,
        accounts: Vec<Address>,
        assets: Vec<AssetId>,
        program: Option<ProgramKind>,
    },
}

/// Discriminant of a transaction, as seen by programs inspecting the group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxnType {
    Payment,
    AssetTransfer,
    ApplicationCall,
}

/// A single ledger transaction.
///
/// Safety fields (`rekey_to`, `close_remainder_to`, `asset_close_to`) live in the
/// header like every other field of the flat ledger transaction; for types they
/// do not apply to they stay at the zero address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: Address,
    pub fee: u64,
    pub rekey_to: Address,
    pub close_remainder_to: Address,
    pub asset_close_to: Address,
    pub kind: TxnKind,
}

impl Transaction {
    fn with_kind(sender: Address, kind: TxnKind) -> Self {
        Self {
            sender,
            fee: MIN_TXN_FEE,
            rekey_to: Address::ZERO,
            close_remainder_to: Address::ZERO,
            asset_close_to: Address::ZERO,
            kind,
        }
    }

    /// Create a payment transaction
    pub fn payment(sender: Address, receiver: Address, amount: u64) -> Self {
        Self::with_kind(sender, TxnKind::Payment { receiver, amount })
    }

    /// Create an asset transfer transaction
    pub fn asset_transfer(sender: Address, asset: AssetId, receiver: Address, amount: u64) -> Self {
        Self::with_kind(
            sender,
            TxnKind::AssetTransfer {
                asset,
                receiver,
                amount,
            },
        )
    }

    /// Opt the sender in to an asset (zero transfer to self)
    pub fn asset_opt_in(sender: Address, asset: AssetId) -> Self {
        Self::asset_transfer(sender, asset, sender, 0)
    }

    /// Create an application that runs `program`
    pub fn create_application(sender: Address, program: ProgramKind, assets: Vec<AssetId>) -> Self {
        Self::with_kind(
            sender,
            TxnKind::ApplicationCall {
                app_id: 0,
                on_completion: OnCompletion::NoOp,
                args: Vec::new(),
                accounts: Vec::new(),
                assets,
                program: Some(program),
            },
        )
    }

    /// Call an existing application
    pub fn app_call(
        sender: Address,
        app_id: AppId,
        on_completion: OnCompletion,
        args: Vec<Vec<u8>>,
        accounts: Vec<Address>,
        assets: Vec<AssetId>,
    ) -> Self {
        Self::with_kind(
            sender,
            TxnKind::ApplicationCall {
                app_id,
                on_completion,
                args,
                accounts,
                assets,
                program: None,
            },
        )
    }

    /// Request that the sender's authority be delegated to `to`
    pub fn rekeyed_to(mut self, to: Address) -> Self {
        self.rekey_to = to;
        self
    }

    /// Request that the sender's remaining balance be sent to `to`
    pub fn closing_remainder_to(mut self, to: Address) -> Self {
        self.close_remainder_to = to;
        self
    }

    /// Request that the sender's remaining asset units be sent to `to`
    pub fn closing_asset_to(mut self, to: Address) -> Self {
        self.asset_close_to = to;
        self
    }

    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }

    pub fn txn_type(&self) -> TxnType {
        match self.kind {
            TxnKind::Payment { .. } => TxnType::Payment,
            TxnKind::AssetTransfer { .. } => TxnType::AssetTransfer,
            TxnKind::ApplicationCall { .. } => TxnType::ApplicationCall,
        }
    }

    /// Receiver of a payment, zero for every other type
    pub fn receiver(&self) -> Address {
        match &self.kind {
            TxnKind::Payment { receiver, .. } => *receiver,
            _ => Address::ZERO,
        }
    }

    /// Amount of a payment, zero for every other type
    pub fn amount(&self) -> u64 {
        match &self.kind {
            TxnKind::Payment { amount, .. } => *amount,
            _ => 0,
        }
    }
}

/// Encode an unsigned integer argument the way the ledger expects it
pub fn itob(value: u64) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_of() {
        assert_eq!(Phase::of(0, OnCompletion::NoOp), Phase::Creation);
        assert_eq!(Phase::of(0, OnCompletion::DeleteApplication), Phase::Creation);
        assert_eq!(Phase::of(5, OnCompletion::NoOp), Phase::NoOp);
        assert_eq!(Phase::of(5, OnCompletion::OptIn), Phase::OptIn);
        assert_eq!(Phase::of(5, OnCompletion::CloseOut), Phase::CloseOut);
        assert_eq!(Phase::of(5, OnCompletion::UpdateApplication), Phase::Update);
        assert_eq!(Phase::of(5, OnCompletion::DeleteApplication), Phase::Delete);
    }

    #[test]
    fn test_builders_keep_safety_fields_zero() {
        let alice = Address::from_seed(b"alice");
        let bob = Address::from_seed(b"bob");
        let txn = Transaction::payment(alice, bob, 10);

        assert!(txn.rekey_to.is_zero());
        assert!(txn.close_remainder_to.is_zero());
        assert!(txn.asset_close_to.is_zero());
        assert_eq!(txn.fee, MIN_TXN_FEE);
        assert_eq!(txn.txn_type(), TxnType::Payment);
        assert_eq!(txn.receiver(), bob);
        assert_eq!(txn.amount(), 10);

        let rekeyed = txn.rekeyed_to(bob);
        assert_eq!(rekeyed.rekey_to, bob);
    }

    #[test]
    fn test_non_payment_has_no_amount() {
        let alice = Address::from_seed(b"alice");
        let txn = Transaction::asset_opt_in(alice, 7);
        assert_eq!(txn.txn_type(), TxnType::AssetTransfer);
        assert_eq!(txn.amount(), 0);
        assert!(txn.receiver().is_zero());
    }

    #[test]
    fn test_itob() {
        assert_eq!(itob(3), vec![0, 0, 0, 0, 0, 0, 0, 3]);
        assert_eq!(itob(u64::MAX), vec![0xff; 8]);
    }
}
