//! Deployment configuration for the token and its retail sale

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::transaction::MIN_TXN_FEE;

/// Parameters of the asset created by the mint program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub name: String,
    pub unit: String,
    pub total: u64,
    pub decimals: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: "Tesla".to_string(),
            unit: "TSLA".to_string(),
            total: 1_000_000,
            decimals: 0,
        }
    }
}

/// Parameters of the holdings program's retail sale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleConfig {
    /// Price per unit set at creation, in micro-units of the payment currency
    pub initial_price: u64,
    /// Flat amount added to every sale payment, covering the transfer fee
    pub fee: u64,
    /// Exclusive upper bound on units sold per call
    pub max_units_exclusive: u64,
}

impl Default for SaleConfig {
    fn default() -> Self {
        Self {
            initial_price: 5_000_000,
            fee: MIN_TXN_FEE,
            max_units_exclusive: 1_000,
        }
    }
}

/// Top-level configuration shared by the programs and the reference ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AscConfig {
    pub token: TokenConfig,
    pub sale: SaleConfig,
    /// Minimum fee charged for every transaction and sub-action
    pub min_fee: u64,
}

impl Default for AscConfig {
    fn default() -> Self {
        Self {
            token: TokenConfig::default(),
            sale: SaleConfig::default(),
            min_fee: MIN_TXN_FEE,
        }
    }
}

impl AscConfig {
    /// Parse a JSON document; missing fields fall back to their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AscConfig =
            serde_json::from_str(json).context("Failed to parse ASC configuration")?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;
        let config = Self::from_json_str(&raw)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
