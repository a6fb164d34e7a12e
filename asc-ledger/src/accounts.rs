//! Account, asset and application records held by the reference ledger

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use asc_core::{Address, AppId, AssetId, GlobalState, LedgerError, ProgramKind};

/// Balances and registrations of one account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Payment currency, in micro-units
    pub balance: u64,
    /// Asset holdings; presence of a key means the account opted in
    pub assets: BTreeMap<AssetId, u64>,
    /// Applications the account has opted in to
    pub apps_opted_in: BTreeSet<AppId>,
    /// Account authorized to sign for this one after a rekey
    pub auth_addr: Option<Address>,
}

/// Parameters of a created asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetParams {
    pub creator: Address,
    pub total: u64,
    pub decimals: u32,
    pub name: String,
    pub unit: String,
}

/// A deployed application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: AppId,
    pub program: ProgramKind,
    pub creator: Address,
    pub address: Address,
    pub global: GlobalState,
}

/// Everything the ledger knows. Cloned wholesale to snapshot a group.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    pub accounts: HashMap<Address, Account>,
    pub assets: HashMap<AssetId, AssetParams>,
    pub applications: HashMap<AppId, Application>,
    last_id: u64,
}

impl LedgerState {
    /// Assets and applications share one id counter
    pub fn allocate_id(&mut self) -> Result<u64, LedgerError> {
        self.last_id = self.last_id.checked_add(1).ok_or(LedgerError::Overflow)?;
        Ok(self.last_id)
    }

    pub fn balance(&self, address: &Address) -> u64 {
        self.accounts.get(address).map(|a| a.balance).unwrap_or(0)
    }

    pub fn holding(&self, address: &Address, asset: AssetId) -> Option<u64> {
        self.accounts
            .get(address)
            .and_then(|account| account.assets.get(&asset))
            .copied()
    }

    pub fn credit(&mut self, address: Address, amount: u64) -> Result<(), LedgerError> {
        let account = self.accounts.entry(address).or_default();
        account.balance = account.balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    pub fn debit(&mut self, address: Address, amount: u64) -> Result<(), LedgerError> {
        let available = self.balance(&address);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                account: address,
                requested: amount,
                available,
            });
        }
        self.accounts.entry(address).or_default().balance = available - amount;
        Ok(())
    }

    /// Move payment currency between accounts
    pub fn pay(&mut self, from: Address, to: Address, amount: u64) -> Result<(), LedgerError> {
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    /// Create an asset whose entire supply is held by `creator`
    pub fn create_asset(&mut self, creator: Address, params: AssetParams) -> Result<AssetId, LedgerError> {
        let id = self.allocate_id()?;
        let total = params.total;
        self.assets.insert(id, params);
        self.accounts.entry(creator).or_default().assets.insert(id, total);
        Ok(id)
    }

    /// Move asset units. A zero-unit transfer to oneself registers a holding.
    pub fn transfer_asset(
        &mut self,
        from: Address,
        asset: AssetId,
        to: Address,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if !self.assets.contains_key(&asset) {
            return Err(LedgerError::UnknownAsset(asset));
        }

        if from == to && amount == 0 {
            self.accounts
                .entry(from)
                .or_default()
                .assets
                .entry(asset)
                .or_insert(0);
            return Ok(());
        }

        let available = self
            .holding(&from, asset)
            .ok_or(LedgerError::NotHolding { account: from, asset })?;
        if self.holding(&to, asset).is_none() {
            return Err(LedgerError::NotHolding { account: to, asset });
        }
        if available < amount {
            return Err(LedgerError::InsufficientUnits {
                asset,
                requested: amount,
                available,
            });
        }

        self.set_holding(from, asset, available - amount);
        let received = self.holding(&to, asset).unwrap_or(0);
        self.set_holding(
            to,
            asset,
            received.checked_add(amount).ok_or(LedgerError::Overflow)?,
        );
        Ok(())
    }

    /// Send every remaining unit of `asset` to `to` and drop the holding
    pub fn close_asset(&mut self, from: Address, asset: AssetId, to: Address) -> Result<(), LedgerError> {
        let remaining = self
            .holding(&from, asset)
            .ok_or(LedgerError::NotHolding { account: from, asset })?;
        if remaining > 0 {
            self.transfer_asset(from, asset, to, remaining)?;
        }
        if let Some(account) = self.accounts.get_mut(&from) {
            account.assets.remove(&asset);
        }
        Ok(())
    }

    /// Send the remaining payment balance of `from` to `to`
    pub fn close_remainder(&mut self, from: Address, to: Address) -> Result<(), LedgerError> {
        let remaining = self.balance(&from);
        self.pay(from, to, remaining)
    }

    fn set_holding(&mut self, address: Address, asset: AssetId, amount: u64) {
        self.accounts
            .entry(address)
            .or_default()
            .assets
            .insert(asset, amount);
    }

    pub fn is_opted_in(&self, address: &Address, app_id: AppId) -> bool {
        self.accounts
            .get(address)
            .map(|account| account.apps_opted_in.contains(&app_id))
            .unwrap_or(false)
    }

    pub fn opt_in_app(&mut self, address: Address, app_id: AppId) -> Result<(), LedgerError> {
        let account = self.accounts.entry(address).or_default();
        if !account.apps_opted_in.insert(app_id) {
            return Err(LedgerError::AlreadyOptedIn {
                account: address,
                app_id,
            });
        }
        Ok(())
    }

    pub fn close_out_app(&mut self, address: Address, app_id: AppId) {
        if let Some(account) = self.accounts.get_mut(&address) {
            account.apps_opted_in.remove(&app_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(total: u64) -> AssetParams {
        AssetParams {
            creator: Address::from_seed(b"creator"),
            total,
            decimals: 0,
            name: "Tesla".to_string(),
            unit: "TSLA".to_string(),
        }
    }

    #[test]
    fn test_ids_are_shared_and_increasing() {
        let mut state = LedgerState::default();
        assert_eq!(state.allocate_id().unwrap(), 1);
        let asset = state.create_asset(Address::from_seed(b"creator"), params(10)).unwrap();
        assert_eq!(asset, 2);
        assert_eq!(state.allocate_id().unwrap(), 3);
    }

    #[test]
    fn test_payments() {
        let mut state = LedgerState::default();
        let alice = Address::from_seed(b"alice");
        let bob = Address::from_seed(b"bob");

        state.credit(alice, 100).unwrap();
        state.pay(alice, bob, 40).unwrap();
        assert_eq!(state.balance(&alice), 60);
        assert_eq!(state.balance(&bob), 40);

        assert_eq!(
            state.pay(alice, bob, 61),
            Err(LedgerError::InsufficientFunds {
                account: alice,
                requested: 61,
                available: 60
            })
        );

        state.close_remainder(alice, bob).unwrap();
        assert_eq!(state.balance(&alice), 0);
        assert_eq!(state.balance(&bob), 100);
    }

    #[test]
    fn test_asset_transfers_require_opt_in() {
        let mut state = LedgerState::default();
        let creator = Address::from_seed(b"creator");
        let holder = Address::from_seed(b"holder");
        let asset = state.create_asset(creator, params(1_000)).unwrap();

        assert_eq!(
            state.transfer_asset(creator, asset, holder, 10),
            Err(LedgerError::NotHolding {
                account: holder,
                asset
            })
        );

        state.transfer_asset(holder, asset, holder, 0).unwrap();
        assert_eq!(state.holding(&holder, asset), Some(0));

        state.transfer_asset(creator, asset, holder, 10).unwrap();
        assert_eq!(state.holding(&creator, asset), Some(990));
        assert_eq!(state.holding(&holder, asset), Some(10));

        assert!(matches!(
            state.transfer_asset(holder, asset, creator, 11),
            Err(LedgerError::InsufficientUnits { .. })
        ));
        assert_eq!(
            state.transfer_asset(holder, asset + 1, creator, 1),
            Err(LedgerError::UnknownAsset(asset + 1))
        );

        state.close_asset(holder, asset, creator).unwrap();
        assert_eq!(state.holding(&holder, asset), None);
        assert_eq!(state.holding(&creator, asset), Some(1_000));
    }

    #[test]
    fn test_application_opt_in() {
        let mut state = LedgerState::default();
        let alice = Address::from_seed(b"alice");

        state.opt_in_app(alice, 4).unwrap();
        assert!(state.is_opted_in(&alice, 4));
        assert!(matches!(
            state.opt_in_app(alice, 4),
            Err(LedgerError::AlreadyOptedIn { .. })
        ));

        state.close_out_app(alice, 4);
        assert!(!state.is_opted_in(&alice, 4));
    }
}
