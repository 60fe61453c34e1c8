//! End-of-auction teardown.

use super::allocator::SlugAllocator;
use super::error::AuctionError;
use crate::amm::PoolManager;
use crate::types::{Address, AuctionState, MigrationReceipt, PoolKey, SlugSet};

/// Pulls every slug out of the pool and hands the balances over.
///
/// Callers check authorization and phase first; this only moves funds.
pub struct MigrationCoordinator;

impl MigrationCoordinator {
    /// Withdraw all liquidity and settle to `recipient`.
    ///
    /// # Arguments
    ///
    /// * `pool` - Pool manager holding the auction's positions
    /// * `key` - Auction pool
    /// * `allocator` - Allocator that registered `slugs`
    /// * `state` - Auction state; reserves are zeroed and `migrated` set
    /// * `slugs` - Registered slugs; drained in place
    /// * `recipient` - Receiver of principal and fees
    /// * `now` - Migration time
    ///
    /// # Returns
    ///
    /// A receipt with the post-withdrawal price and the settled amounts
    pub fn execute<P: PoolManager>(
        pool: &mut P,
        key: &PoolKey,
        allocator: &SlugAllocator,
        state: &mut AuctionState,
        slugs: &mut SlugSet,
        recipient: Address,
        now: u64,
    ) -> Result<MigrationReceipt, AuctionError> {
        let pool_id = key.id();
        *slugs = allocator.withdraw(pool, &pool_id, key.hooks, slugs, state)?;
        let slot0 = pool.slot0(&pool_id)?;

        let settle = |currency0: bool| {
            let held = state.reserves.get(currency0);
            let fees = state.fees_accrued.get(currency0).min(held);
            (held - fees, fees)
        };
        let currency0 = settle(true);
        let currency1 = settle(false);

        state.reserves = Default::default();
        state.migrated = true;
        let state_root = state.state_root()?;

        Ok(MigrationReceipt::new(
            pool_id,
            recipient,
            &slot0.sqrt_price_x96,
            currency0,
            currency1,
            state_root,
            now,
        ))
    }
}
