//! Auction arena and transactional host.
//!
//! ## Architecture
//!
//! - **Slab**: auction storage, O(1) insert and lookup
//! - **HashMap**: pool id to slab key
//! - **Pool manager**: owned, so a call can be rolled back as a whole
//!
//! ## Atomicity
//!
//! `create`, `swap` and `migrate` snapshot the pool manager and the
//! affected auction before running. Any error restores both, so a failed
//! call leaves no trace.

use std::collections::HashMap;

use slab::Slab;
use tracing::warn;

use crate::amm::{PoolManager, SwapParams};
use crate::engine::{AuctionError, DutchAuction, LiquidityHook, SwapContext, SwapReport};
use crate::types::{Address, BalanceDelta, MigrationReceipt, PoolId, PoolKey};

/// Result of a swap routed through an auction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    pub context: SwapContext,
    /// Swapper-side delta returned by the pool
    pub delta: BalanceDelta,
    pub report: SwapReport,
}

/// All auctions of one host, keyed by pool.
#[derive(Debug)]
pub struct AuctionRegistry<P, H = DutchAuction> {
    pool_manager: P,
    auctions: Slab<H>,
    index: HashMap<PoolId, usize>,
    /// Account allowed to create auctions; also their migration authority
    authority: Address,
}

impl<P, H> AuctionRegistry<P, H>
where
    P: PoolManager + Clone,
    H: LiquidityHook,
{
    pub fn new(pool_manager: P, authority: Address) -> Self {
        Self::with_capacity(pool_manager, authority, 0)
    }

    /// Create a registry with room for `capacity` auctions
    pub fn with_capacity(pool_manager: P, authority: Address, capacity: usize) -> Self {
        Self {
            pool_manager,
            auctions: Slab::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            authority,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn authority(&self) -> Address {
        self.authority
    }

    #[inline]
    pub fn pool_manager(&self) -> &P {
        &self.pool_manager
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.auctions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.auctions.is_empty()
    }

    #[inline]
    pub fn contains(&self, pool_id: &PoolId) -> bool {
        self.index.contains_key(pool_id)
    }

    pub fn get(&self, pool_id: &PoolId) -> Option<&H> {
        self.index.get(pool_id).and_then(|slot| self.auctions.get(*slot))
    }

    fn slot(&self, pool_id: &PoolId) -> Result<usize, AuctionError> {
        self.index
            .get(pool_id)
            .copied()
            .ok_or(AuctionError::UnknownPool(*pool_id))
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// Create an auction for `key`.
    ///
    /// # Returns
    ///
    /// The pool id the auction is registered under
    pub fn create(&mut self, caller: Address, key: PoolKey, config: H::Config, now: u64) -> Result<PoolId, AuctionError> {
        if caller != self.authority {
            return Err(AuctionError::Unauthorized {
                caller,
                expected: self.authority,
            });
        }
        let pool_id = key.id();
        if self.index.contains_key(&pool_id) {
            return Err(AuctionError::AlreadyInitialized(pool_id));
        }

        let backup = self.pool_manager.clone();
        match H::create(&mut self.pool_manager, key, config, self.authority, now) {
            Ok(auction) => {
                let pool_id = auction.pool_id();
                let slot = self.auctions.insert(auction);
                self.index.insert(pool_id, slot);
                Ok(pool_id)
            }
            Err(err) => {
                self.pool_manager = backup;
                warn!(pool = %pool_id, error = %err, "create reverted");
                Err(err)
            }
        }
    }

    /// Route a swap through the auction attached to `pool_id`.
    pub fn swap(&mut self, pool_id: &PoolId, params: &SwapParams, now: u64) -> Result<SwapOutcome, AuctionError> {
        let slot = self.slot(pool_id)?;
        let pool_backup = self.pool_manager.clone();
        let auction_backup = self.auctions[slot].clone();

        let result = Self::run_swap(&mut self.pool_manager, &mut self.auctions[slot], pool_id, params, now);
        if let Err(err) = &result {
            self.pool_manager = pool_backup;
            self.auctions[slot] = auction_backup;
            warn!(
                pool = %pool_id,
                zero_for_one = params.zero_for_one,
                amount_in = %params.amount_in,
                now,
                error = %err,
                "swap reverted"
            );
        }
        result
    }

    fn run_swap(
        pool: &mut P,
        auction: &mut H,
        pool_id: &PoolId,
        params: &SwapParams,
        now: u64,
    ) -> Result<SwapOutcome, AuctionError> {
        let context = auction.before_swap(pool, params, now)?;
        let delta = pool.swap(pool_id, params)?;
        let report = auction.after_swap(pool, &context, delta)?;
        Ok(SwapOutcome { context, delta, report })
    }

    /// Migrate the auction attached to `pool_id`.
    pub fn migrate(
        &mut self,
        pool_id: &PoolId,
        caller: Address,
        recipient: Address,
        now: u64,
    ) -> Result<MigrationReceipt, AuctionError> {
        let slot = self.slot(pool_id)?;
        let pool_backup = self.pool_manager.clone();
        let auction_backup = self.auctions[slot].clone();

        let result = self.auctions[slot].migrate(&mut self.pool_manager, caller, recipient, now);
        if let Err(err) = &result {
            self.pool_manager = pool_backup;
            self.auctions[slot] = auction_backup;
            warn!(pool = %pool_id, caller = %caller, error = %err, "migrate reverted");
        }
        result
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
