//! Durable key/value state owned by each application

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Rejection;
use crate::id::{Address, AssetId};

/// Current layout version of application global state
pub const STATE_SCHEMA_VERSION: u16 = 1;

/// Key holding the token's asset id
pub const KEY_TOKEN_ID: &str = "TeslaCoinID";
/// Key holding the holdings custodian address
pub const KEY_HOLDINGS_ADDR: &str = "HoldingsAddr";
/// Key holding the burn custodian address
pub const KEY_BURN_ADDR: &str = "BurnAddr";
/// Key holding the per-unit sale price
pub const KEY_PRICE: &str = "Price";

/// A single stored value. The ledger only knows integers and byte strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateValue {
    Uint(u64),
    Bytes(Vec<u8>),
}

/// Global state of one application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalState {
    pub schema_version: u16,
    entries: BTreeMap<String, StateValue>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalState {
    pub fn new() -> Self {
        Self {
            schema_version: STATE_SCHEMA_VERSION,
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.entries.get(key)
    }

    pub fn put(&mut self, key: &str, value: StateValue) {
        self.entries.insert(key.to_string(), value);
    }

    pub fn put_uint(&mut self, key: &str, value: u64) {
        self.put(key, StateValue::Uint(value));
    }

    pub fn put_bytes(&mut self, key: &str, value: Vec<u8>) {
        self.put(key, StateValue::Bytes(value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StateValue)> {
        self.entries.iter()
    }

    /// Reject state written by an unknown layout version
    pub fn check_schema(&self) -> Result<(), Rejection> {
        if self.schema_version != STATE_SCHEMA_VERSION {
            return Err(Rejection::State(format!(
                "unsupported schema version {}",
                self.schema_version
            )));
        }
        Ok(())
    }

    pub fn uint(&self, key: &str) -> Result<u64, Rejection> {
        match self.entries.get(key) {
            Some(StateValue::Uint(value)) => Ok(*value),
            Some(StateValue::Bytes(_)) => Err(Rejection::State(format!("{} is not an integer", key))),
            None => Err(Rejection::State(format!("{} is missing", key))),
        }
    }

    pub fn bytes(&self, key: &str) -> Result<&[u8], Rejection> {
        match self.entries.get(key) {
            Some(StateValue::Bytes(value)) => Ok(value),
            Some(StateValue::Uint(_)) => Err(Rejection::State(format!("{} is not a byte string", key))),
            None => Err(Rejection::State(format!("{} is missing", key))),
        }
    }

    /// Read an optional address: the empty byte string means "unset"
    pub fn optional_address(&self, key: &str) -> Result<Option<Address>, Rejection> {
        let raw = self.bytes(key)?;
        if raw.is_empty() {
            return Ok(None);
        }
        Address::from_slice(raw)
            .map(Some)
            .ok_or_else(|| Rejection::State(format!("{} holds {} bytes, not an address", key, raw.len())))
    }

    pub fn put_optional_address(&mut self, key: &str, address: Option<Address>) {
        let raw = address.map(|a| a.bytes().to_vec()).unwrap_or_default();
        self.put_bytes(key, raw);
    }
}

/// Typed view of the mint application's state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintState {
    /// Zero until the token has been created
    pub token_id: AssetId,
    pub holdings_addr: Option<Address>,
    pub burn_addr: Option<Address>,
}

/// Typed view of the holdings application's state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingsState {
    pub token_id: AssetId,
    pub price: u64,
}

/// Typed view of the burn application's state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnState {
    pub token_id: AssetId,
}

/// Conversion between a typed state view and the stored key/value map
pub trait StateView: Sized {
    fn load(state: &GlobalState) -> Result<Self, Rejection>;
    fn store(&self, state: &mut GlobalState);
}

impl StateView for MintState {
    fn load(state: &GlobalState) -> Result<Self, Rejection> {
        state.check_schema()?;
        Ok(Self {
            token_id: state.uint(KEY_TOKEN_ID)?,
            holdings_addr: state.optional_address(KEY_HOLDINGS_ADDR)?,
            burn_addr: state.optional_address(KEY_BURN_ADDR)?,
        })
    }

    fn store(&self, state: &mut GlobalState) {
        state.put_uint(KEY_TOKEN_ID, self.token_id);
        state.put_optional_address(KEY_HOLDINGS_ADDR, self.holdings_addr);
        state.put_optional_address(KEY_BURN_ADDR, self.burn_addr);
    }
}

impl StateView for HoldingsState {
    fn load(state: &GlobalState) -> Result<Self, Rejection> {
        state.check_schema()?;
        Ok(Self {
            token_id: state.uint(KEY_TOKEN_ID)?,
            price: state.uint(KEY_PRICE)?,
        })
    }

    fn store(&self, state: &mut GlobalState) {
        state.put_uint(KEY_TOKEN_ID, self.token_id);
        state.put_uint(KEY_PRICE, self.price);
    }
}

impl StateView for BurnState {
    fn load(state: &GlobalState) -> Result<Self, Rejection> {
        state.check_schema()?;
        Ok(Self {
            token_id: state.uint(KEY_TOKEN_ID)?,
        })
    }

    fn store(&self, state: &mut GlobalState) {
        state.put_uint(KEY_TOKEN_ID, self.token_id);
    }
}
