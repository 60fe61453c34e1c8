//! Concentrated-liquidity venue interface.
//!
//! ## Overview
//!
//! The auction never trades on its own. It registers liquidity positions
//! with a pool manager, moves the pool price with zero-liquidity swaps, and
//! reads the spot price back. [`PoolManager`] is that seam.
//!
//! [`SimulatedPoolManager`] is an in-memory implementation with standard
//! concentrated-liquidity semantics (tick crossing, per-position fee growth)
//! used by the tests, the benchmarks and the `gda-sim` binary.

mod pool;
mod simulated;

use num_bigint::{BigInt, BigUint};
use thiserror::Error;

use crate::math::{self, MathError};
use crate::types::{Address, BalanceDelta, PoolId, PoolKey};

pub use pool::{Pool, PositionKey, TickInfo};
pub use simulated::SimulatedPoolManager;

/// Largest tick spacing the venue accepts
pub const MAX_POOL_TICK_SPACING: i32 = 32_767;

// ============================================================================
// Errors
// ============================================================================

/// Venue failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    #[error("pool {0} is not initialized")]
    PoolNotInitialized(PoolId),

    #[error("pool {0} is already initialized")]
    PoolAlreadyInitialized(PoolId),

    #[error("tick spacing {0} is not supported")]
    InvalidTickSpacing(i32),

    #[error("fee {0} pips is not supported")]
    InvalidFee(u32),

    #[error("invalid position range [{tick_lower}, {tick_upper}]")]
    InvalidPositionRange { tick_lower: i32, tick_upper: i32 },

    #[error("position holds {available} liquidity, cannot remove {requested}")]
    InsufficientPositionLiquidity { requested: u128, available: u128 },

    #[error("price limit {limit} is not on the swap side of the current price {current}")]
    InvalidPriceLimit { current: BigUint, limit: BigUint },

    #[error("swap amount must be positive")]
    ZeroAmount,

    #[error("liquidity overflow")]
    LiquidityOverflow,

    #[error("pool reserves cannot cover an outflow of {needed} (currency0: {currency0})")]
    InsufficientPoolReserves { currency0: bool, needed: u128 },

    #[error(transparent)]
    Math(#[from] MathError),
}

// ============================================================================
// Call Parameters
// ============================================================================

/// Add (positive delta) or remove (negative delta) liquidity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifyLiquidityParams {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity_delta: i128,
    pub salt: u32,
}

/// Result of a liquidity change.
///
/// `delta` is what the owner pays (negative) or receives (positive),
/// including any fees collected. `fees_accrued` is the fee part alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifyLiquidityOutcome {
    pub delta: BalanceDelta,
    pub fees_accrued: BalanceDelta,
}

impl ModifyLiquidityOutcome {
    /// Principal part of `delta`
    #[inline]
    pub fn principal(&self) -> BalanceDelta {
        self.delta - self.fees_accrued
    }
}

/// Exact-input swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    /// `currency0` in, `currency1` out
    pub zero_for_one: bool,
    pub amount_in: u128,
    /// Price at which the swap stops even with input left
    pub sqrt_price_limit_x96: BigUint,
}

impl SwapParams {
    /// Exact-input swap bounded only by the price range of the venue
    pub fn exact_in(zero_for_one: bool, amount_in: u128) -> Self {
        let sqrt_price_limit_x96 = if zero_for_one {
            math::min_sqrt_ratio() + 1u32
        } else {
            math::max_sqrt_ratio() - 1u32
        };
        Self {
            zero_for_one,
            amount_in,
            sqrt_price_limit_x96,
        }
    }

    /// Exact-input swap that stops at `sqrt_price_limit_x96`
    pub fn with_limit(zero_for_one: bool, amount_in: u128, sqrt_price_limit_x96: BigUint) -> Self {
        Self {
            zero_for_one,
            amount_in,
            sqrt_price_limit_x96,
        }
    }
}

/// Current price state of a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot0 {
    pub sqrt_price_x96: BigUint,
    pub tick: i32,
    pub lp_fee: u32,
}

/// A registered position
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PositionInfo {
    pub liquidity: u128,
    pub fee_growth_inside0_last_x128: BigInt,
    pub fee_growth_inside1_last_x128: BigInt,
}

// ============================================================================
// PoolManager
// ============================================================================

/// Operations the auction needs from a concentrated-liquidity venue.
pub trait PoolManager {
    /// Create a pool at `sqrt_price_x96`; returns the initial tick
    fn initialize(&mut self, key: &PoolKey, sqrt_price_x96: &BigUint) -> Result<i32, AmmError>;

    /// Change `owner`'s position and collect its accrued fees
    fn modify_liquidity(
        &mut self,
        pool_id: &PoolId,
        owner: Address,
        params: &ModifyLiquidityParams,
    ) -> Result<ModifyLiquidityOutcome, AmmError>;

    /// Execute a swap; the delta is from the swapper's point of view
    fn swap(&mut self, pool_id: &PoolId, params: &SwapParams) -> Result<BalanceDelta, AmmError>;

    fn slot0(&self, pool_id: &PoolId) -> Result<Slot0, AmmError>;

    fn position_info(
        &self,
        pool_id: &PoolId,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        salt: u32,
    ) -> Result<PositionInfo, AmmError>;
}
