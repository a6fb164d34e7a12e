use std::io;
use thiserror::Error;

use crate::id::{Address, AppId, AssetId};

/// Why a call was hard-rejected.
///
/// Only "rejected" is observable to the submitter of a call; the variant exists
/// so the reason can be logged and asserted on in tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("rekey requested to {0}")]
    RekeyRequested(Address),

    #[error("close remainder requested to {0}")]
    CloseRemainderRequested(Address),

    #[error("asset close requested to {0}")]
    AssetCloseRequested(Address),

    #[error("group size mismatch: expected {expected}, got {actual}")]
    GroupSize { expected: usize, actual: usize },

    #[error("argument count mismatch: expected {expected}, got {actual}")]
    ArgCount { expected: usize, actual: usize },

    #[error("caller {0} is not the creator")]
    NotCreator(Address),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("unknown account role: {0}")]
    UnknownRole(String),

    #[error("missing application argument at index {0}")]
    MissingArgument(usize),

    #[error("missing referenced account at index {0}")]
    MissingAccount(usize),

    #[error("missing referenced asset at index {0}")]
    MissingAsset(usize),

    #[error("missing group transaction at index {0}")]
    MissingGroupTransaction(usize),

    #[error("integer argument is {0} bytes, at most 8 allowed")]
    IntegerTooLong(usize),

    #[error("token already minted with id {0}")]
    AlreadyMinted(AssetId),

    #[error("asset mismatch: recorded {recorded}, referenced {referenced}")]
    AssetMismatch { recorded: AssetId, referenced: AssetId },

    #[error("recipient {0} is not the authorized custodian")]
    RecipientNotAllowed(Address),

    #[error("amount {0} is out of bounds")]
    AmountOutOfBounds(u64),

    #[error("insufficient asset balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    #[error("asset {0} already held")]
    AlreadyOptedIn(AssetId),

    #[error("caller {0} is not opted in to the application")]
    NotOptedIn(Address),

    #[error("unexpected group layout: {0}")]
    GroupLayout(String),

    #[error("payment receiver {0} is not this application")]
    PaymentReceiver(Address),

    #[error("payment mismatch: expected {expected}, got {actual}")]
    PaymentAmount { expected: u64, actual: u64 },

    #[error("arithmetic overflow computing {0}")]
    Overflow(&'static str),

    #[error("operation explicitly rejected in phase {0}")]
    PhaseRejected(&'static str),

    #[error("state error: {0}")]
    State(String),

    #[error("sub-action failed: {0}")]
    SubAction(#[from] LedgerError),
}

/// Failures raised by the ledger while looking up or executing actions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("unknown application: {0}")]
    UnknownApplication(AppId),

    #[error("unknown asset: {0}")]
    UnknownAsset(AssetId),

    #[error("account {account} does not hold asset {asset}")]
    NotHolding { account: Address, asset: AssetId },

    #[error("account {account} already holds asset {asset}")]
    AlreadyHolding { account: Address, asset: AssetId },

    #[error("insufficient units of asset {asset}: requested {requested}, available {available}")]
    InsufficientUnits {
        asset: AssetId,
        requested: u64,
        available: u64,
    },

    #[error("insufficient funds in {account}: requested {requested}, available {available}")]
    InsufficientFunds {
        account: Address,
        requested: u64,
        available: u64,
    },

    #[error("account {account} is already opted in to application {app_id}")]
    AlreadyOptedIn { account: Address, app_id: AppId },

    #[error("account {account} is not opted in to application {app_id}")]
    NotOptedIn { account: Address, app_id: AppId },

    #[error("fee {fee} is below the minimum {minimum}")]
    FeeTooLow { fee: u64, minimum: u64 },

    #[error("empty transaction group")]
    EmptyGroup,

    #[error("group of {0} transactions exceeds the maximum of 16")]
    GroupTooLarge(usize),

    #[error("operation not supported: {0}")]
    Unsupported(String),

    #[error("call to application {app_id} rejected: {reason}")]
    CallRejected { app_id: AppId, reason: String },

    #[error("ledger counter overflow")]
    Overflow,
}

/// Errors that occur when persisting or loading ledger state
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO errors that occur when reading/writing files
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Errors that occur during journal operations
    #[error("Journal error: {0}")]
    Journal(String),

    /// Anyhow error wrapper for error context
    #[error(transparent)]
    Context(#[from] anyhow::Error),
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
