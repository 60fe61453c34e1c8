//! Mutable per-auction state and its deterministic snapshot.
//!
//! ## State Root
//!
//! [`AuctionState::state_root`] SSZ-encodes a [`StateSnapshot`] and hashes it
//! with SHA-256. Two auctions that saw the same calls in the same order
//! always produce the same root.

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

use super::pool::TokenAmounts;

/// Accounting state of one auction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionState {
    /// Last epoch a rebalance ran for (starts at 1)
    pub last_epoch: u64,
    /// Accumulated tick move, WAD-scaled, AMM orientation
    pub tick_accumulator: i128,
    /// Net asset sold (negative if sells exceeded buys)
    pub total_tokens_sold: i128,
    /// Net numeraire raised, never below zero
    pub total_proceeds: u128,
    /// `total_tokens_sold` as of the last rebalance
    pub total_tokens_sold_last_epoch: i128,
    /// LP fees collected from the auction's positions
    pub fees_accrued: TokenAmounts,
    /// Balances held by the auction outside the pool
    pub reserves: TokenAmounts,
    pub migrated: bool,
}

impl AuctionState {
    /// Fresh state holding the full supply of the asset.
    pub fn new(num_tokens_to_sell: u128, is_token0: bool) -> Self {
        let reserves = if is_token0 {
            TokenAmounts::new(num_tokens_to_sell, 0)
        } else {
            TokenAmounts::new(0, num_tokens_to_sell)
        };
        Self {
            last_epoch: 1,
            tick_accumulator: 0,
            total_tokens_sold: 0,
            total_proceeds: 0,
            total_tokens_sold_last_epoch: 0,
            fees_accrued: TokenAmounts::default(),
            reserves,
            migrated: false,
        }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            last_epoch: self.last_epoch,
            tick_accumulator_raw: self.tick_accumulator as u128,
            total_tokens_sold_raw: self.total_tokens_sold as u128,
            total_proceeds: self.total_proceeds,
            total_tokens_sold_last_epoch_raw: self.total_tokens_sold_last_epoch as u128,
            fees_accrued0: self.fees_accrued.amount0,
            fees_accrued1: self.fees_accrued.amount1,
            reserve0: self.reserves.amount0,
            reserve1: self.reserves.amount1,
            migrated: self.migrated,
        }
    }

    /// SHA-256 of the SSZ-encoded snapshot
    pub fn state_root(&self) -> Result<[u8; 32], ssz_rs::SerializeError> {
        let bytes = ssz_rs::serialize(&self.snapshot())?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);

        let mut root = [0u8; 32];
        root.copy_from_slice(&hasher.finalize());
        Ok(root)
    }
}

/// SSZ view of [`AuctionState`].
///
/// Signed fields are stored as two's-complement `u128` (`_raw` suffix).
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct StateSnapshot {
    pub last_epoch: u64,
    pub tick_accumulator_raw: u128,
    pub total_tokens_sold_raw: u128,
    pub total_proceeds: u128,
    pub total_tokens_sold_last_epoch_raw: u128,
    pub fees_accrued0: u128,
    pub fees_accrued1: u128,
    pub reserve0: u128,
    pub reserve1: u128,
    pub migrated: bool,
}

impl StateSnapshot {
    #[inline]
    pub fn tick_accumulator(&self) -> i128 {
        self.tick_accumulator_raw as i128
    }

    #[inline]
    pub fn total_tokens_sold(&self) -> i128 {
        self.total_tokens_sold_raw as i128
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
