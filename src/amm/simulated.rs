//! In-memory pool manager.

use std::collections::HashMap;

use num_bigint::BigUint;

use super::pool::{Pool, PositionKey};
use super::{AmmError, ModifyLiquidityOutcome, ModifyLiquidityParams, PoolManager, PositionInfo, Slot0, SwapParams};
use crate::types::{Address, BalanceDelta, PoolId, PoolKey};

/// Pools keyed by id. Cloning snapshots every pool.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPoolManager {
    pools: HashMap<PoolId, Pool>,
}

impl SimulatedPoolManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(&self, pool_id: &PoolId) -> Option<&Pool> {
        self.pools.get(pool_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    fn pool_mut(&mut self, pool_id: &PoolId) -> Result<&mut Pool, AmmError> {
        self.pools.get_mut(pool_id).ok_or(AmmError::PoolNotInitialized(*pool_id))
    }

    fn pool_ref(&self, pool_id: &PoolId) -> Result<&Pool, AmmError> {
        self.pools.get(pool_id).ok_or(AmmError::PoolNotInitialized(*pool_id))
    }
}

impl PoolManager for SimulatedPoolManager {
    fn initialize(&mut self, key: &PoolKey, sqrt_price_x96: &BigUint) -> Result<i32, AmmError> {
        let id = key.id();
        if self.pools.contains_key(&id) {
            return Err(AmmError::PoolAlreadyInitialized(id));
        }
        let pool = Pool::new(*key, sqrt_price_x96.clone())?;
        let tick = pool.slot0().tick;
        self.pools.insert(id, pool);
        Ok(tick)
    }

    fn modify_liquidity(
        &mut self,
        pool_id: &PoolId,
        owner: Address,
        params: &ModifyLiquidityParams,
    ) -> Result<ModifyLiquidityOutcome, AmmError> {
        self.pool_mut(pool_id)?.modify_liquidity(owner, params)
    }

    fn swap(&mut self, pool_id: &PoolId, params: &SwapParams) -> Result<BalanceDelta, AmmError> {
        self.pool_mut(pool_id)?.swap(params)
    }

    fn slot0(&self, pool_id: &PoolId) -> Result<Slot0, AmmError> {
        Ok(self.pool_ref(pool_id)?.slot0())
    }

    fn position_info(
        &self,
        pool_id: &PoolId,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        salt: u32,
    ) -> Result<PositionInfo, AmmError> {
        let key = PositionKey {
            owner,
            tick_lower,
            tick_upper,
            salt,
        };
        Ok(self.pool_ref(pool_id)?.position(&key))
    }
}
