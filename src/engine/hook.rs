//! Liquidity initializer interface.
//!
//! ## Two-Phase Swaps
//!
//! The host drives every swap as
//!
//! ```text
//! before_swap(params, now) ─► SwapContext ─► pool.swap(params) ─► after_swap(ctx, delta)
//! ```
//!
//! The context carries what `before_swap` decided so `after_swap` does not
//! re-derive it from a state that the swap has since changed.

use super::error::AuctionError;
use super::gate::{AuctionPhase, SwapDirection};
use super::ledger::LedgerEntry;
use crate::amm::{PoolManager, SwapParams};
use crate::types::{Address, BalanceDelta, MigrationReceipt, PoolId, PoolKey};

/// Decisions taken before a swap executes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapContext {
    pub now: u64,
    pub phase: AuctionPhase,
    pub direction: SwapDirection,
    /// Epoch the swap falls in
    pub epoch: u64,
    /// Whether this swap triggered the epoch's rebalance
    pub rebalanced: bool,
}

/// Totals after a swap was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapReport {
    pub entry: LedgerEntry,
    /// Pool tick after the swap
    pub tick: i32,
    pub total_tokens_sold: i128,
    pub total_proceeds: u128,
}

/// Capability set of a liquidity initializer attached to one pool.
///
/// Implementations own their per-pool state. Every method either fully
/// applies or returns an error; rolling back pool side effects of a failed
/// call is the host's job (see [`crate::AuctionRegistry`]).
pub trait LiquidityHook: Clone + Sized {
    type Config;

    /// Reject a config before anything is created
    fn validate(config: &Self::Config, key: &PoolKey, creation_time: u64) -> Result<(), AuctionError>;

    /// Initialize the pool and place the initial liquidity
    fn create<P: PoolManager>(
        pool: &mut P,
        key: PoolKey,
        config: Self::Config,
        authority: Address,
        now: u64,
    ) -> Result<Self, AuctionError>;

    fn before_swap<P: PoolManager>(
        &mut self,
        pool: &mut P,
        params: &SwapParams,
        now: u64,
    ) -> Result<SwapContext, AuctionError>;

    fn after_swap<P: PoolManager>(
        &mut self,
        pool: &mut P,
        context: &SwapContext,
        delta: BalanceDelta,
    ) -> Result<SwapReport, AuctionError>;

    /// Tear down and release everything to `recipient`
    fn migrate<P: PoolManager>(
        &mut self,
        pool: &mut P,
        caller: Address,
        recipient: Address,
        now: u64,
    ) -> Result<MigrationReceipt, AuctionError>;

    fn pool_id(&self) -> PoolId;
}
