use log::debug;

use asc_core::{Address, AppId, AssetId, LedgerError, SubAction, SubActionEffect};
use asc_programs::Host;

use crate::accounts::{AssetParams, LedgerState};

/// Host handed to a program while the ledger evaluates one of its calls.
///
/// Sub-actions are applied to the ledger state immediately; the enclosing
/// group rolls them back if anything later fails.
pub struct LedgerHost<'a> {
    state: &'a mut LedgerState,
    sub_action_fee: u64,
    created_asset: Option<AssetId>,
}

impl<'a> LedgerHost<'a> {
    pub fn new(state: &'a mut LedgerState, sub_action_fee: u64) -> Self {
        Self {
            state,
            sub_action_fee,
            created_asset: None,
        }
    }

    /// Asset created by a sub-action during this call, if any
    pub fn created_asset(&self) -> Option<AssetId> {
        self.created_asset
    }
}

impl Host for LedgerHost<'_> {
    fn asset_holding(&self, account: &Address, asset: AssetId) -> Option<u64> {
        self.state.holding(account, asset)
    }

    fn is_opted_in(&self, account: &Address, app_id: AppId) -> bool {
        self.state.is_opted_in(account, app_id)
    }

    fn submit(&mut self, app_id: AppId, action: &SubAction) -> Result<SubActionEffect, LedgerError> {
        let app_address = Address::for_application(app_id);
        self.state.debit(app_address, self.sub_action_fee)?;

        match action {
            SubAction::AssetConfig {
                total,
                decimals,
                name,
                unit,
            } => {
                let id = self.state.create_asset(
                    app_address,
                    AssetParams {
                        creator: app_address,
                        total: *total,
                        decimals: *decimals,
                        name: name.clone(),
                        unit: unit.clone(),
                    },
                )?;
                debug!("Application {} created asset {} ({})", app_id, id, unit);
                self.created_asset = Some(id);
                Ok(SubActionEffect::AssetCreated(id))
            }
            SubAction::AssetTransfer {
                asset,
                receiver,
                amount,
            } => {
                self.state
                    .transfer_asset(app_address, *asset, *receiver, *amount)?;
                Ok(SubActionEffect::Transferred)
            }
        }
    }
}
