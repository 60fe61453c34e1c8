//! Single concentrated-liquidity pool.
//!
//! ## Data Structure
//!
//! ```text
//! Pool
//! ├── sqrt_price_x96, tick, liquidity      (active band)
//! ├── ticks: BTreeMap<i32, TickInfo>       (initialized ticks, ordered)
//! ├── positions: HashMap<PositionKey, PositionInfo>
//! ├── fee_growth_global{0,1}_x128          (Q128, per unit of liquidity)
//! └── reserves                             (tokens held by the pool)
//! ```
//!
//! ## Swap Loop
//!
//! Each iteration swaps up to the next initialized tick (or the price
//! limit), crosses the tick if reached and continues while input remains.
//! Bands without liquidity are jumped over for free.
//!
//! ## Fee Growth
//!
//! Fee growth is tracked as signed integers instead of wrapping 256-bit
//! words. Outside/inside values may go negative; only differences are
//! meaningful.

use std::collections::{BTreeMap, HashMap};

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;

use super::{AmmError, ModifyLiquidityOutcome, ModifyLiquidityParams, PositionInfo, Slot0, SwapParams};
use super::MAX_POOL_TICK_SPACING;
use crate::math::full_math::{fee_growth_to_amount, to_i128};
use crate::math::{
    compute_swap_step, get_amount0_delta, get_amount1_delta, get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio,
    max_sqrt_ratio, min_sqrt_ratio, FEE_DENOMINATOR, MAX_TICK, MIN_TICK,
};
use crate::types::{Address, BalanceDelta, PoolKey, TokenAmounts};

/// Per-tick bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInfo {
    pub liquidity_gross: u128,
    pub liquidity_net: i128,
    pub fee_growth_outside0_x128: BigInt,
    pub fee_growth_outside1_x128: BigInt,
}

/// Identifies one position: owner, range, salt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionKey {
    pub owner: Address,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub salt: u32,
}

#[derive(Debug, Clone)]
pub struct Pool {
    key: PoolKey,
    sqrt_price_x96: BigUint,
    tick: i32,
    liquidity: u128,
    fee_growth_global0_x128: BigInt,
    fee_growth_global1_x128: BigInt,
    ticks: BTreeMap<i32, TickInfo>,
    positions: HashMap<PositionKey, PositionInfo>,
    reserves: TokenAmounts,
}

impl Pool {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Create a pool at `sqrt_price_x96`
    pub fn new(key: PoolKey, sqrt_price_x96: BigUint) -> Result<Self, AmmError> {
        if key.tick_spacing <= 0 || key.tick_spacing > MAX_POOL_TICK_SPACING {
            return Err(AmmError::InvalidTickSpacing(key.tick_spacing));
        }
        if key.fee >= FEE_DENOMINATOR {
            return Err(AmmError::InvalidFee(key.fee));
        }
        let tick = get_tick_at_sqrt_ratio(&sqrt_price_x96)?;

        Ok(Self {
            key,
            sqrt_price_x96,
            tick,
            liquidity: 0,
            fee_growth_global0_x128: BigInt::zero(),
            fee_growth_global1_x128: BigInt::zero(),
            ticks: BTreeMap::new(),
            positions: HashMap::new(),
            reserves: TokenAmounts::default(),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn key(&self) -> &PoolKey {
        &self.key
    }

    pub fn slot0(&self) -> Slot0 {
        Slot0 {
            sqrt_price_x96: self.sqrt_price_x96.clone(),
            tick: self.tick,
            lp_fee: self.key.fee,
        }
    }

    /// Liquidity active at the current price
    #[inline]
    pub fn liquidity(&self) -> u128 {
        self.liquidity
    }

    /// Tokens held by the pool
    #[inline]
    pub fn reserves(&self) -> TokenAmounts {
        self.reserves
    }

    /// Number of initialized ticks
    #[inline]
    pub fn tick_count(&self) -> usize {
        self.ticks.len()
    }

    #[inline]
    pub fn tick_info(&self, tick: i32) -> Option<&TickInfo> {
        self.ticks.get(&tick)
    }

    pub fn position(&self, key: &PositionKey) -> PositionInfo {
        self.positions.get(key).cloned().unwrap_or_default()
    }

    // ========================================================================
    // Liquidity
    // ========================================================================

    /// Add or remove liquidity for `owner`, collecting accrued fees.
    pub fn modify_liquidity(
        &mut self,
        owner: Address,
        params: &ModifyLiquidityParams,
    ) -> Result<ModifyLiquidityOutcome, AmmError> {
        let ModifyLiquidityParams {
            tick_lower,
            tick_upper,
            liquidity_delta,
            salt,
        } = *params;
        self.check_ticks(tick_lower, tick_upper)?;

        let key = PositionKey {
            owner,
            tick_lower,
            tick_upper,
            salt,
        };
        let held = self.positions.get(&key).map(|p| p.liquidity).unwrap_or(0);
        let new_liquidity = apply_liquidity_delta(held, liquidity_delta).map_err(|_| {
            AmmError::InsufficientPositionLiquidity {
                requested: liquidity_delta.unsigned_abs(),
                available: held,
            }
        })?;

        let mut flipped_lower = false;
        let mut flipped_upper = false;
        if liquidity_delta != 0 {
            flipped_lower = self.update_tick(tick_lower, liquidity_delta, false)?;
            flipped_upper = self.update_tick(tick_upper, liquidity_delta, true)?;
        }

        // Collect fees owed since the last touch
        let (inside0, inside1) = self.fee_growth_inside(tick_lower, tick_upper);
        let position = self.positions.entry(key).or_default();
        let fees0 = fee_growth_to_amount(&(&inside0 - &position.fee_growth_inside0_last_x128), position.liquidity);
        let fees1 = fee_growth_to_amount(&(&inside1 - &position.fee_growth_inside1_last_x128), position.liquidity);
        position.fee_growth_inside0_last_x128 = inside0;
        position.fee_growth_inside1_last_x128 = inside1;
        position.liquidity = new_liquidity;
        if new_liquidity == 0 {
            self.positions.remove(&key);
        }

        if liquidity_delta < 0 {
            if flipped_lower {
                self.ticks.remove(&tick_lower);
            }
            if flipped_upper {
                self.ticks.remove(&tick_upper);
            }
        }

        let principal = self.principal_delta(tick_lower, tick_upper, liquidity_delta)?;
        if (tick_lower..tick_upper).contains(&self.tick) {
            self.liquidity = apply_liquidity_delta(self.liquidity, liquidity_delta)?;
        }

        let fees = BalanceDelta::new(fees0 as i128, fees1 as i128);
        let delta = principal + fees;
        self.settle(delta)?;

        Ok(ModifyLiquidityOutcome {
            delta,
            fees_accrued: fees,
        })
    }

    /// Owner-side principal for a liquidity change: adding pays (rounded
    /// up), removing receives (rounded down).
    fn principal_delta(&self, tick_lower: i32, tick_upper: i32, liquidity_delta: i128) -> Result<BalanceDelta, AmmError> {
        if liquidity_delta == 0 {
            return Ok(BalanceDelta::ZERO);
        }
        let sqrt_lower = get_sqrt_ratio_at_tick(tick_lower)?;
        let sqrt_upper = get_sqrt_ratio_at_tick(tick_upper)?;
        let amount = liquidity_delta.unsigned_abs();
        let round_up = liquidity_delta > 0;

        let (amount0, amount1) = if self.tick < tick_lower {
            (get_amount0_delta(&sqrt_lower, &sqrt_upper, amount, round_up), BigUint::zero())
        } else if self.tick < tick_upper {
            (
                get_amount0_delta(&self.sqrt_price_x96, &sqrt_upper, amount, round_up),
                get_amount1_delta(&sqrt_lower, &self.sqrt_price_x96, amount, round_up),
            )
        } else {
            (BigUint::zero(), get_amount1_delta(&sqrt_lower, &sqrt_upper, amount, round_up))
        };

        let (amount0, amount1) = (to_i128(&amount0)?, to_i128(&amount1)?);
        if round_up {
            Ok(BalanceDelta::new(-amount0, -amount1))
        } else {
            Ok(BalanceDelta::new(amount0, amount1))
        }
    }

    /// Returns whether the tick flipped between initialized and empty
    fn update_tick(&mut self, tick: i32, liquidity_delta: i128, upper: bool) -> Result<bool, AmmError> {
        let current = self.tick;
        let global0 = self.fee_growth_global0_x128.clone();
        let global1 = self.fee_growth_global1_x128.clone();

        let info = self.ticks.entry(tick).or_default();
        let gross_before = info.liquidity_gross;
        let gross_after = apply_liquidity_delta(gross_before, liquidity_delta)?;

        if gross_before == 0 && tick <= current {
            // Growth below an initialized tick is assumed to have happened below it
            info.fee_growth_outside0_x128 = global0;
            info.fee_growth_outside1_x128 = global1;
        }
        info.liquidity_gross = gross_after;
        info.liquidity_net = if upper {
            info.liquidity_net - liquidity_delta
        } else {
            info.liquidity_net + liquidity_delta
        };

        Ok((gross_before == 0) != (gross_after == 0))
    }

    fn fee_growth_inside(&self, tick_lower: i32, tick_upper: i32) -> (BigInt, BigInt) {
        let empty = TickInfo::default();
        let lower = self.ticks.get(&tick_lower).unwrap_or(&empty);
        let upper = self.ticks.get(&tick_upper).unwrap_or(&empty);
        let global0 = &self.fee_growth_global0_x128;
        let global1 = &self.fee_growth_global1_x128;

        let (below0, below1) = if self.tick >= tick_lower {
            (lower.fee_growth_outside0_x128.clone(), lower.fee_growth_outside1_x128.clone())
        } else {
            (global0 - &lower.fee_growth_outside0_x128, global1 - &lower.fee_growth_outside1_x128)
        };
        let (above0, above1) = if self.tick < tick_upper {
            (upper.fee_growth_outside0_x128.clone(), upper.fee_growth_outside1_x128.clone())
        } else {
            (global0 - &upper.fee_growth_outside0_x128, global1 - &upper.fee_growth_outside1_x128)
        };

        (global0 - below0 - above0, global1 - below1 - above1)
    }

    fn check_ticks(&self, tick_lower: i32, tick_upper: i32) -> Result<(), AmmError> {
        let spacing = self.key.tick_spacing;
        let valid = tick_lower < tick_upper
            && tick_lower >= MIN_TICK
            && tick_upper <= MAX_TICK
            && tick_lower % spacing == 0
            && tick_upper % spacing == 0;
        if valid {
            Ok(())
        } else {
            Err(AmmError::InvalidPositionRange { tick_lower, tick_upper })
        }
    }

    // ========================================================================
    // Swap
    // ========================================================================

    /// Exact-input swap. Returns the swapper's delta (input negative,
    /// output positive).
    pub fn swap(&mut self, params: &SwapParams) -> Result<BalanceDelta, AmmError> {
        if params.amount_in == 0 {
            return Err(AmmError::ZeroAmount);
        }
        let zero_for_one = params.zero_for_one;
        let limit = &params.sqrt_price_limit_x96;
        let limit_ok = if zero_for_one {
            *limit < self.sqrt_price_x96 && *limit > min_sqrt_ratio()
        } else {
            *limit > self.sqrt_price_x96 && *limit < max_sqrt_ratio()
        };
        if !limit_ok {
            return Err(AmmError::InvalidPriceLimit {
                current: self.sqrt_price_x96.clone(),
                limit: limit.clone(),
            });
        }

        let mut remaining = BigUint::from(params.amount_in);
        let mut total_in = BigUint::zero();
        let mut total_out = BigUint::zero();

        while !remaining.is_zero() && self.sqrt_price_x96 != *limit {
            let (next_tick, initialized) = self.next_initialized_tick(zero_for_one);
            let sqrt_next = get_sqrt_ratio_at_tick(next_tick)?;
            let target = if zero_for_one {
                (&sqrt_next).max(limit)
            } else {
                (&sqrt_next).min(limit)
            };

            let step = compute_swap_step(&self.sqrt_price_x96, target, self.liquidity, &remaining, self.key.fee)?;
            let consumed = &step.amount_in + &step.fee_amount;
            remaining = if consumed >= remaining {
                BigUint::zero()
            } else {
                &remaining - &consumed
            };
            total_in += consumed;
            total_out += &step.amount_out;

            if self.liquidity > 0 && !step.fee_amount.is_zero() {
                let growth = BigInt::from((&step.fee_amount << 128) / BigUint::from(self.liquidity));
                if zero_for_one {
                    self.fee_growth_global0_x128 += growth;
                } else {
                    self.fee_growth_global1_x128 += growth;
                }
            }

            self.sqrt_price_x96 = step.sqrt_price_next;
            if self.sqrt_price_x96 == sqrt_next {
                if initialized {
                    self.cross(next_tick, zero_for_one)?;
                }
                self.tick = if zero_for_one { next_tick - 1 } else { next_tick };
            } else {
                self.tick = get_tick_at_sqrt_ratio(&self.sqrt_price_x96)?;
            }
        }

        let total_in = to_i128(&total_in)?;
        let total_out = to_i128(&total_out)?;
        let delta = if zero_for_one {
            BalanceDelta::new(-total_in, total_out)
        } else {
            BalanceDelta::new(total_out, -total_in)
        };
        self.settle(delta)?;
        Ok(delta)
    }

    /// Next initialized tick in the swap direction, or the price bound
    fn next_initialized_tick(&self, zero_for_one: bool) -> (i32, bool) {
        if zero_for_one {
            match self.ticks.range(..=self.tick).next_back() {
                Some((tick, _)) => (*tick, true),
                None => (MIN_TICK, false),
            }
        } else {
            match self.ticks.range(self.tick + 1..).next() {
                Some((tick, _)) => (*tick, true),
                None => (MAX_TICK, false),
            }
        }
    }

    fn cross(&mut self, tick: i32, zero_for_one: bool) -> Result<(), AmmError> {
        let global0 = self.fee_growth_global0_x128.clone();
        let global1 = self.fee_growth_global1_x128.clone();
        let net = match self.ticks.get_mut(&tick) {
            Some(info) => {
                info.fee_growth_outside0_x128 = &global0 - &info.fee_growth_outside0_x128;
                info.fee_growth_outside1_x128 = &global1 - &info.fee_growth_outside1_x128;
                info.liquidity_net
            }
            None => return Ok(()),
        };

        let net = if zero_for_one { -net } else { net };
        self.liquidity = apply_liquidity_delta(self.liquidity, net)?;
        Ok(())
    }

    // ========================================================================
    // Reserves
    // ========================================================================

    /// Apply a caller-side delta to the pool's own balances (mirror image)
    fn settle(&mut self, caller_delta: BalanceDelta) -> Result<(), AmmError> {
        self.reserves
            .apply(-caller_delta)
            .map_err(|shortfall| AmmError::InsufficientPoolReserves {
                currency0: shortfall.currency0,
                needed: shortfall.needed,
            })
    }
}

fn apply_liquidity_delta(liquidity: u128, delta: i128) -> Result<u128, AmmError> {
    let result = if delta < 0 {
        liquidity.checked_sub(delta.unsigned_abs())
    } else {
        liquidity.checked_add(delta as u128)
    };
    result.ok_or(AmmError::LiquidityOverflow)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const E18: u128 = 1_000_000_000_000_000_000;
    const OWNER: Address = Address::repeat_byte(0xAA);

    fn key() -> PoolKey {
        PoolKey::new(Address::repeat_byte(1), Address::repeat_byte(2), 3_000, 8, OWNER)
    }

    fn pool_at(tick: i32) -> Pool {
        Pool::new(key(), get_sqrt_ratio_at_tick(tick).unwrap()).unwrap()
    }

    fn add(pool: &mut Pool, lower: i32, upper: i32, liquidity: u128, salt: u32) -> ModifyLiquidityOutcome {
        let params = ModifyLiquidityParams {
            tick_lower: lower,
            tick_upper: upper,
            liquidity_delta: liquidity as i128,
            salt,
        };
        pool.modify_liquidity(OWNER, &params).unwrap()
    }

    fn remove(pool: &mut Pool, lower: i32, upper: i32, liquidity: u128, salt: u32) -> ModifyLiquidityOutcome {
        let params = ModifyLiquidityParams {
            tick_lower: lower,
            tick_upper: upper,
            liquidity_delta: -(liquidity as i128),
            salt,
        };
        pool.modify_liquidity(OWNER, &params).unwrap()
    }

    #[test]
    fn test_new_pool() {
        let pool = pool_at(1_600);
        assert_eq!(pool.slot0().tick, 1_600);
        assert_eq!(pool.liquidity(), 0);
        assert_eq!(pool.tick_count(), 0);
    }

    #[test]
    fn test_invalid_tick_spacing() {
        let bad = PoolKey { tick_spacing: 0, ..key() };
        assert!(matches!(
            Pool::new(bad, get_sqrt_ratio_at_tick(0).unwrap()),
            Err(AmmError::InvalidTickSpacing(0))
        ));
    }

    #[test]
    fn test_add_liquidity_above_price_is_currency0_only() {
        let mut pool = pool_at(0);
        let outcome = add(&mut pool, 8, 80, E18, 1);

        assert!(outcome.delta.amount0 < 0);
        assert_eq!(outcome.delta.amount1, 0);
        assert_eq!(pool.liquidity(), 0);
        assert_eq!(pool.tick_count(), 2);
        assert_eq!(pool.reserves().amount0, outcome.delta.amount0.unsigned_abs());
    }

    #[test]
    fn test_add_liquidity_in_range_is_active() {
        let mut pool = pool_at(0);
        let outcome = add(&mut pool, -80, 80, E18, 1);

        assert!(outcome.delta.amount0 < 0);
        assert!(outcome.delta.amount1 < 0);
        assert_eq!(pool.liquidity(), E18);
    }

    #[test]
    fn test_misaligned_range_rejected() {
        let mut pool = pool_at(0);
        let params = ModifyLiquidityParams {
            tick_lower: 3,
            tick_upper: 80,
            liquidity_delta: 1,
            salt: 0,
        };
        assert_eq!(
            pool.modify_liquidity(OWNER, &params),
            Err(AmmError::InvalidPositionRange { tick_lower: 3, tick_upper: 80 })
        );
    }

    #[test]
    fn test_remove_more_than_held() {
        let mut pool = pool_at(0);
        add(&mut pool, 8, 80, 100, 1);
        let params = ModifyLiquidityParams {
            tick_lower: 8,
            tick_upper: 80,
            liquidity_delta: -101,
            salt: 1,
        };
        assert_eq!(
            pool.modify_liquidity(OWNER, &params),
            Err(AmmError::InsufficientPositionLiquidity { requested: 101, available: 100 })
        );
    }

    #[test]
    fn test_add_remove_returns_dust_only() {
        let mut pool = pool_at(0);
        let added = add(&mut pool, -80, 80, E18, 1);
        let removed = remove(&mut pool, -80, 80, E18, 1);

        assert!(removed.delta.amount0 <= -added.delta.amount0);
        assert!(removed.delta.amount0 >= -added.delta.amount0 - 2);
        assert_eq!(pool.tick_count(), 0);
        assert_eq!(pool.liquidity(), 0);
        assert!(pool.reserves().amount0 <= 2);
        assert!(pool.reserves().amount1 <= 2);
    }

    #[test]
    fn test_swap_one_for_zero_moves_price_up() {
        let mut pool = pool_at(0);
        add(&mut pool, 0, 800, 1_000 * E18, 1);

        let delta = pool.swap(&SwapParams::exact_in(false, E18)).unwrap();

        assert_eq!(delta.amount1, -(E18 as i128));
        assert!(delta.amount0 > 0);
        assert!(pool.slot0().tick > 0);
    }

    #[test]
    fn test_swap_crosses_out_of_liquidity() {
        let mut pool = pool_at(0);
        add(&mut pool, 0, 8, E18, 1);

        // Far more input than the band can absorb
        let limit = get_sqrt_ratio_at_tick(100).unwrap();
        let delta = pool.swap(&SwapParams::with_limit(false, 1_000 * E18, limit.clone())).unwrap();

        assert_eq!(pool.slot0().sqrt_price_x96, limit);
        assert_eq!(pool.liquidity(), 0);
        // Only the band's worth was paid in
        assert!(delta.amount1.unsigned_abs() < E18);
    }

    #[test]
    fn test_swap_without_liquidity_moves_to_limit_for_free() {
        let mut pool = pool_at(0);
        let limit = get_sqrt_ratio_at_tick(-400).unwrap();

        let delta = pool.swap(&SwapParams::with_limit(true, 1, limit.clone())).unwrap();

        assert_eq!(delta, BalanceDelta::ZERO);
        assert_eq!(pool.slot0().sqrt_price_x96, limit);
        assert_eq!(pool.slot0().tick, -400);
    }

    #[test]
    fn test_swap_invalid_limit() {
        let mut pool = pool_at(0);
        let limit = get_sqrt_ratio_at_tick(10).unwrap();
        assert!(matches!(
            pool.swap(&SwapParams::with_limit(true, 1, limit)),
            Err(AmmError::InvalidPriceLimit { .. })
        ));
        assert_eq!(pool.swap(&SwapParams::exact_in(true, 0)), Err(AmmError::ZeroAmount));
    }

    #[test]
    fn test_fees_collected_on_removal() {
        let mut pool = pool_at(0);
        add(&mut pool, -800, 800, 1_000 * E18, 7);

        pool.swap(&SwapParams::exact_in(false, 10 * E18)).unwrap();
        pool.swap(&SwapParams::exact_in(true, 5 * E18)).unwrap();

        let removed = remove(&mut pool, -800, 800, 1_000 * E18, 7);
        // 0.3% of each input, less rounding
        let fee1 = 10 * E18 * 3 / 1_000;
        let fee0 = 5 * E18 * 3 / 1_000;
        assert!(removed.fees_accrued.amount1 as u128 <= fee1 + 10);
        assert!(removed.fees_accrued.amount1 as u128 >= fee1 - 10);
        assert!(removed.fees_accrued.amount0 as u128 <= fee0 + 10);
        assert!(removed.fees_accrued.amount0 as u128 >= fee0 - 10);
        assert_eq!(removed.principal() + removed.fees_accrued, removed.delta);
    }

    #[test]
    fn test_fees_only_for_positions_in_range() {
        let mut pool = pool_at(0);
        add(&mut pool, -80, 80, E18, 1);
        add(&mut pool, 800, 880, E18, 2);

        pool.swap(&SwapParams::with_limit(false, E18 / 1_000, get_sqrt_ratio_at_tick(40).unwrap()))
            .unwrap();

        let out_of_range = remove(&mut pool, 800, 880, E18, 2);
        assert_eq!(out_of_range.fees_accrued, BalanceDelta::ZERO);

        let in_range = remove(&mut pool, -80, 80, E18, 1);
        assert!(in_range.fees_accrued.amount1 > 0);
    }

    #[test]
    fn test_round_trip_crossing_restores_liquidity() {
        let mut pool = pool_at(0);
        add(&mut pool, -80, 80, E18, 1);
        add(&mut pool, 80, 160, 2 * E18, 2);

        pool.swap(&SwapParams::with_limit(false, 1_000 * E18, get_sqrt_ratio_at_tick(120).unwrap()))
            .unwrap();
        assert_eq!(pool.liquidity(), 2 * E18);

        pool.swap(&SwapParams::with_limit(true, 1_000 * E18, get_sqrt_ratio_at_tick(0).unwrap()))
            .unwrap();
        assert_eq!(pool.liquidity(), E18);
    }
}
