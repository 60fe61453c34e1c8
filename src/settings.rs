//! Simulator settings file.
//!
//! ## Format
//!
//! ```toml
//! [auction]
//! token_decimals = 18
//! num_tokens_to_sell = "100000"
//! minimum_proceeds = "100"
//! maximum_proceeds = "10000"
//! starting_time = 1000
//! ending_time = 87400
//! starting_tick = 1600
//! ending_tick = -171200
//! epoch_length = 400
//! gamma = 800
//! is_token0 = true
//! num_price_discovery_slugs = 3
//!
//! [pool]
//! fee = 3000
//! tick_spacing = 8
//!
//! [logging]
//! filter = "info,gda_engine=debug"
//!
//! [simulation]
//! swaps_per_epoch = 2
//! buy_amount = "5"
//! sell_probability = 0.25
//! seed = 7
//! ```
//!
//! Amounts are human decimals, converted to atomic units with
//! `token_decimals` (truncating extra digits).

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::types::price::to_atomic;
use crate::types::AuctionConfig;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{field} = {value:?} is not a valid amount with {decimals} decimals")]
    InvalidAmount {
        field: &'static str,
        value: String,
        decimals: u32,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub auction: AuctionSettings,
    pub pool: PoolSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuctionSettings {
    #[serde(default = "default_decimals")]
    pub token_decimals: u32,
    pub num_tokens_to_sell: String,
    pub minimum_proceeds: String,
    pub maximum_proceeds: String,
    pub starting_time: u64,
    pub ending_time: u64,
    pub starting_tick: i32,
    pub ending_tick: i32,
    pub epoch_length: u64,
    pub gamma: i32,
    pub is_token0: bool,
    pub num_price_discovery_slugs: usize,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PoolSettings {
    /// LP fee in pips
    pub fee: u32,
    pub tick_spacing: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive; `RUST_LOG` wins when set
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default = "default_true")]
    pub ansi: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            ansi: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "default_swaps_per_epoch")]
    pub swaps_per_epoch: u32,
    /// Numeraire spent per buy (human decimal)
    #[serde(default = "default_buy_amount")]
    pub buy_amount: String,
    /// Chance that a swap sells back part of the asset bought so far
    #[serde(default)]
    pub sell_probability: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            swaps_per_epoch: default_swaps_per_epoch(),
            buy_amount: default_buy_amount(),
            sell_probability: 0.0,
            seed: default_seed(),
        }
    }
}

fn default_decimals() -> u32 {
    18
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_swaps_per_epoch() -> u32 {
    1
}

fn default_buy_amount() -> String {
    "1".to_string()
}

fn default_seed() -> u64 {
    7
}

impl Settings {
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// Auction parameters in atomic units
    pub fn auction_config(&self) -> Result<AuctionConfig, SettingsError> {
        let a = &self.auction;
        Ok(AuctionConfig {
            num_tokens_to_sell: self.amount("num_tokens_to_sell", &a.num_tokens_to_sell)?,
            minimum_proceeds: self.amount("minimum_proceeds", &a.minimum_proceeds)?,
            maximum_proceeds: self.amount("maximum_proceeds", &a.maximum_proceeds)?,
            starting_time: a.starting_time,
            ending_time: a.ending_time,
            starting_tick: a.starting_tick,
            ending_tick: a.ending_tick,
            epoch_length: a.epoch_length,
            gamma: a.gamma,
            is_token0: a.is_token0,
            num_price_discovery_slugs: a.num_price_discovery_slugs,
        })
    }

    /// Numeraire spent per simulated buy, in atomic units
    pub fn buy_amount(&self) -> Result<u128, SettingsError> {
        self.amount("buy_amount", &self.simulation.buy_amount)
    }

    fn amount(&self, field: &'static str, value: &str) -> Result<u128, SettingsError> {
        let decimals = self.auction.token_decimals;
        to_atomic(value, decimals).ok_or_else(|| SettingsError::InvalidAmount {
            field,
            value: value.to_string(),
            decimals,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
