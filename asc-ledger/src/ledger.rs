use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use asc_core::{
    Address, AppId, AscConfig, AssetId, GlobalState, GroupId, LedgerError, OnCompletion, Phase,
    ProgramKind, StorageError, Transaction, TxnKind, MAX_GROUP_SIZE,
};
use asc_programs::{CallContext, Programs};

use crate::accounts::{Account, Application, AssetParams, LedgerState};
use crate::ledger_host::LedgerHost;
use crate::journal::{JournalBatch, JournalEntry, StateJournal};
use crate::receipt::{group_id, CallRecord, GroupReceipt};

/// Why a group was rolled back
#[derive(Error, Debug)]
enum GroupError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("failed to journal committed state: {0}")]
    Journal(#[from] StorageError),
}

/// Receipts kept for lookup; older ones are evicted first
pub const RECEIPT_RETENTION: usize = 1024;

/// In-memory ledger executing atomic groups against the three programs
pub struct Ledger {
    config: AscConfig,
    programs: Programs,
    state: LedgerState,
    round: u64,
    /// Sequence number handed to the next processed group
    next_sequence: u64,
    /// Most recent receipts by sequence number
    receipts: BTreeMap<u64, GroupReceipt>,
    journal: Option<Arc<dyn StateJournal>>,
}

impl Ledger {
    pub fn new(config: AscConfig) -> Self {
        Self {
            programs: Programs::from_config(&config),
            config,
            state: LedgerState::default(),
            round: 0,
            next_sequence: 1,
            receipts: BTreeMap::new(),
            journal: None,
        }
    }

    /// Record every committed change of application state in `journal`
    pub fn with_journal(mut self, journal: Arc<dyn StateJournal>) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn config(&self) -> &AscConfig {
        &self.config
    }

    /// Number of groups committed so far
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Credit an account out of thin air, for genesis balances and tests
    pub fn fund(&mut self, address: Address, amount: u64) -> Result<(), LedgerError> {
        self.state.credit(address, amount)
    }

    /// Execute a single transaction as a group of one
    pub fn execute(&mut self, txn: Transaction) -> GroupReceipt {
        self.execute_group(vec![txn])
    }

    /// Execute an atomic group: either every transaction applies or none does
    pub fn execute_group(&mut self, group: Vec<Transaction>) -> GroupReceipt {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let mut receipt = GroupReceipt::new(sequence, group_id(&group), self.round + 1);

        // Snapshot state so the whole group can be rolled back
        let snapshot = self.state.clone();

        // Apply every member, then journal what changed before committing
        let result = self
            .apply_group(&group, &mut receipt)
            .and_then(|_| self.journal_changes(&snapshot, receipt.round));

        match result {
            Ok(()) => {
                self.round = receipt.round;
                receipt.commit();
                info!(
                    "Committed group {} of {} transactions in round {}",
                    hex_prefix(&receipt.group_id),
                    group.len(),
                    receipt.round
                );
            }
            Err(e) => {
                // Restore the snapshot; the failed group keeps the current round
                self.state = snapshot;
                receipt.round = self.round;
                receipt.fail(e.to_string());
                warn!("Rolled back group {}: {}", hex_prefix(&receipt.group_id), e);
            }
        }

        // Store the receipt, dropping the oldest beyond the retention limit
        self.receipts.insert(receipt.sequence, receipt.clone());
        while self.receipts.len() > RECEIPT_RETENTION {
            self.receipts.pop_first();
        }
        receipt
    }

    fn apply_group(&mut self, group: &[Transaction], receipt: &mut GroupReceipt) -> Result<(), GroupError> {
        if group.is_empty() {
            return Err(LedgerError::EmptyGroup.into());
        }
        if group.len() > MAX_GROUP_SIZE {
            return Err(LedgerError::GroupTooLarge(group.len()).into());
        }

        // Apply members in order; the first failure aborts the group
        for index in 0..group.len() {
            self.apply(group, index, receipt)?;
        }
        Ok(())
    }

    fn apply(&mut self, group: &[Transaction], index: usize, receipt: &mut GroupReceipt) -> Result<(), LedgerError> {
        let txn = &group[index];

        // Charge the fee before the transaction takes effect
        if txn.fee < self.config.min_fee {
            return Err(LedgerError::FeeTooLow {
                fee: txn.fee,
                minimum: self.config.min_fee,
            });
        }
        self.state.debit(txn.sender, txn.fee)?;

        match &txn.kind {
            TxnKind::Payment { receiver, amount } => {
                self.state.pay(txn.sender, *receiver, *amount)?;
                if !txn.close_remainder_to.is_zero() {
                    self.state.close_remainder(txn.sender, txn.close_remainder_to)?;
                }
            }
            TxnKind::AssetTransfer {
                asset,
                receiver,
                amount,
            } => {
                self.state
                    .transfer_asset(txn.sender, *asset, *receiver, *amount)?;
                if !txn.asset_close_to.is_zero() {
                    self.state.close_asset(txn.sender, *asset, txn.asset_close_to)?;
                }
            }
            TxnKind::ApplicationCall {
                app_id,
                on_completion,
                program,
                ..
            } => self.apply_call(group, index, *app_id, *on_completion, *program, receipt)?,
        }

        // Rekeying applies after everything else the transaction does
        if !txn.rekey_to.is_zero() {
            self.state.accounts.entry(txn.sender).or_default().auth_addr = Some(txn.rekey_to);
        }
        Ok(())
    }

    fn apply_call(
        &mut self,
        group: &[Transaction],
        index: usize,
        called: AppId,
        on_completion: OnCompletion,
        program: Option<ProgramKind>,
        receipt: &mut GroupReceipt,
    ) -> Result<(), LedgerError> {
        let sender = group[index].sender;
        let phase = Phase::of(called, on_completion);

        // Allocate a new application or load the called one
        let (app_id, kind, creator, mut global) = if phase == Phase::Creation {
            let kind = program.ok_or_else(|| {
                LedgerError::Unsupported("application creation without a program".to_string())
            })?;
            (self.state.allocate_id()?, kind, sender, GlobalState::new())
        } else {
            let app = self
                .state
                .applications
                .get(&called)
                .ok_or(LedgerError::UnknownApplication(called))?;
            (app.id, app.program, app.creator, app.global.clone())
        };

        // Programs see the caller as opted in while judging the opt-in itself
        match phase {
            Phase::OptIn => self.state.opt_in_app(sender, app_id)?,
            Phase::CloseOut if !self.state.is_opted_in(&sender, app_id) => {
                return Err(LedgerError::NotOptedIn {
                    account: sender,
                    app_id,
                })
            }
            _ => {}
        }

        // Let the program judge the call; sub-actions hit the ledger through the host
        let ctx = CallContext::new(app_id, creator, group, index).map_err(|rejection| {
            LedgerError::CallRejected {
                app_id,
                reason: rejection.to_string(),
            }
        })?;
        let mut host = LedgerHost::new(&mut self.state, self.config.min_fee);
        let outcome = self.programs.approve(kind, &ctx, &mut global, &mut host);
        let created_asset = host.created_asset();

        // Record the verdict whether or not the call was approved
        let reason = match outcome.rejection() {
            Some(rejection) => Some(rejection.to_string()),
            None if !outcome.is_approved() => Some(format!("{} call declined", phase.name())),
            None => None,
        };
        receipt.calls.push(CallRecord {
            group_index: index,
            app_id,
            phase,
            verdict: outcome.verdict(),
            sub_action: outcome.sub_action().cloned(),
            reason: reason.clone(),
        });
        if let Some(reason) = reason {
            return Err(LedgerError::CallRejected { app_id, reason });
        }
        if created_asset.is_some() {
            receipt.created_asset = created_asset;
        }

        // Apply the approved call to the application itself
        match phase {
            Phase::Creation => {
                self.state.applications.insert(
                    app_id,
                    Application {
                        id: app_id,
                        program: kind,
                        creator,
                        address: Address::for_application(app_id),
                        global,
                    },
                );
                receipt.created_application = Some(app_id);
                info!("Created {} application {} for {}", kind, app_id, creator);
            }
            Phase::Delete => {
                self.state.applications.remove(&app_id);
                info!("Deleted {} application {}", kind, app_id);
            }
            _ => {
                if phase == Phase::CloseOut {
                    self.state.close_out_app(sender, app_id);
                }
                if let Some(app) = self.state.applications.get_mut(&app_id) {
                    app.global = global;
                }
            }
        }
        Ok(())
    }

    fn journal_changes(&self, before: &LedgerState, round: u64) -> Result<(), GroupError> {
        let Some(journal) = &self.journal else {
            return Ok(());
        };

        // Applications alive before or after the group
        let mut ids: Vec<AppId> = self
            .state
            .applications
            .keys()
            .chain(before.applications.keys())
            .copied()
            .collect();
        ids.sort_unstable();
        ids.dedup();

        // Collect every changed application before writing anything
        let mut entries = Vec::new();
        for app_id in ids {
            let after = self.state.applications.get(&app_id).map(|app| &app.global);
            let prior = before.applications.get(&app_id).map(|app| &app.global);
            if after != prior {
                entries.push(JournalEntry::new(app_id, after.cloned(), round));
            }
        }
        if entries.is_empty() {
            return Ok(());
        }

        // Write the group's changes as one batch so a failure leaves none behind
        let count = entries.len();
        journal.record_batch(&JournalBatch { round, entries })?;
        debug!("Journaled {} application states in round {}", count, round);
        Ok(())
    }

    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.state.accounts.get(address)
    }

    /// Payment balance of `address`; zero for unknown accounts
    pub fn balance(&self, address: &Address) -> u64 {
        self.state.balance(address)
    }

    /// Units of `asset` held by `address`, `None` when not opted in
    pub fn asset_holding(&self, address: &Address, asset: AssetId) -> Option<u64> {
        self.state.holding(address, asset)
    }

    pub fn asset_params(&self, asset: AssetId) -> Option<&AssetParams> {
        self.state.assets.get(&asset)
    }

    pub fn application(&self, app_id: AppId) -> Option<&Application> {
        self.state.applications.get(&app_id)
    }

    pub fn global_state(&self, app_id: AppId) -> Option<&GlobalState> {
        self.application(app_id).map(|app| &app.global)
    }

    pub fn is_opted_in(&self, address: &Address, app_id: AppId) -> bool {
        self.state.is_opted_in(address, app_id)
    }

    /// Receipt of the group processed with `sequence`, if still retained
    pub fn receipt(&self, sequence: u64) -> Option<&GroupReceipt> {
        self.receipts.get(&sequence)
    }

    /// Retained receipts of every submission of the group `group_id`, oldest first
    pub fn receipts_for_group<'a>(
        &'a self,
        group_id: &'a GroupId,
    ) -> impl Iterator<Item = &'a GroupReceipt> + 'a {
        self.receipts
            .values()
            .filter(move |receipt| &receipt.group_id == group_id)
    }
}

fn hex_prefix(id: &GroupId) -> String {
    hex::encode(&id[..4])
}
