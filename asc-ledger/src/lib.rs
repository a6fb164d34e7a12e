//! Reference ledger for the ASC programs
//!
//! Holds accounts, assets and applications in memory, executes atomic groups
//! with all-or-nothing rollback, applies the sub-actions issued by approved
//! calls and optionally journals every committed state change to disk.

pub mod accounts;
pub mod journal;
pub mod ledger;
pub mod ledger_host;
pub mod receipt;

// Re-export the main types for convenience
pub use accounts::{Account, Application, AssetParams, LedgerState};
pub use journal::{FileStateJournal, JournalBatch, JournalEntry, StateJournal};
pub use ledger::{Ledger, RECEIPT_RETENTION};
pub use ledger_host::LedgerHost;
pub use receipt::{group_id, CallRecord, GroupReceipt};
