//! Host interface between the programs and the ledger evaluating them

use std::collections::{HashMap, HashSet};

use asc_core::{Address, AppId, AssetId, LedgerError, SubAction, SubActionEffect};

/// Ledger capabilities available to a program while it evaluates a call
pub trait Host {
    /// Units of `asset` held by `account`, `None` when the account has not
    /// opted in to the asset
    fn asset_holding(&self, account: &Address, asset: AssetId) -> Option<u64>;

    /// Whether `account` is opted in to application `app_id`
    fn is_opted_in(&self, account: &Address, app_id: AppId) -> bool;

    /// Execute a sub-action on behalf of application `app_id`
    fn submit(&mut self, app_id: AppId, action: &SubAction) -> Result<SubActionEffect, LedgerError>;
}

/// In-memory host for exercising programs without a ledger
#[derive(Debug, Default, Clone)]
pub struct MockHost {
    holdings: HashMap<(Address, AssetId), u64>,
    opted_in: HashSet<(Address, AppId)>,
    submitted: Vec<(AppId, SubAction)>,
    next_asset_id: AssetId,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            next_asset_id: 1,
            ..Default::default()
        }
    }

    /// Give `account` a holding of `amount` units of `asset`
    pub fn set_holding(&mut self, account: Address, asset: AssetId, amount: u64) {
        self.holdings.insert((account, asset), amount);
    }

    pub fn opt_in_app(&mut self, account: Address, app_id: AppId) {
        self.opted_in.insert((account, app_id));
    }

    /// Sub-actions submitted so far, in order
    pub fn submitted(&self) -> &[(AppId, SubAction)] {
        &self.submitted
    }
}

impl Host for MockHost {
    fn asset_holding(&self, account: &Address, asset: AssetId) -> Option<u64> {
        self.holdings.get(&(*account, asset)).copied()
    }

    fn is_opted_in(&self, account: &Address, app_id: AppId) -> bool {
        self.opted_in.contains(&(*account, app_id))
    }

    fn submit(&mut self, app_id: AppId, action: &SubAction) -> Result<SubActionEffect, LedgerError> {
        let app_address = Address::for_application(app_id);
        let effect = match action {
            SubAction::AssetConfig { total, .. } => {
                let id = self.next_asset_id;
                self.next_asset_id += 1;
                self.holdings.insert((app_address, id), *total);
                SubActionEffect::AssetCreated(id)
            }
            SubAction::AssetTransfer {
                asset,
                receiver,
                amount,
            } => {
                if *receiver == app_address && *amount == 0 {
                    if self.holdings.contains_key(&(app_address, *asset)) {
                        return Err(LedgerError::AlreadyHolding {
                            account: app_address,
                            asset: *asset,
                        });
                    }
                    self.holdings.insert((app_address, *asset), 0);
                } else {
                    let available = self.asset_holding(&app_address, *asset).ok_or(
                        LedgerError::NotHolding {
                            account: app_address,
                            asset: *asset,
                        },
                    )?;
                    if available < *amount {
                        return Err(LedgerError::InsufficientUnits {
                            asset: *asset,
                            requested: *amount,
                            available,
                        });
                    }
                    self.holdings.insert((app_address, *asset), available - amount);
                    *self.holdings.entry((*receiver, *asset)).or_insert(0) += amount;
                }
                SubActionEffect::Transferred
            }
        };
        self.submitted.push((app_id, action.clone()));
        Ok(effect)
    }
}
