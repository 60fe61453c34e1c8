//! Slug layout and registration with the pool manager.
//!
//! ## Layout
//!
//! In asset-price terms, from cheapest to dearest:
//!
//! ```text
//! floor ── lower ── anchor ── upper ── pd[0] ── pd[1] ── … ── pd[N-1] ── ceiling
//!          numeraire          asset due   remaining asset, split evenly
//! ```
//!
//! The lower slug holds the proceeds raised so far so sellers can always
//! exit near the clearing price. When those proceeds cannot buy back
//! everything sold across `[floor, anchor]`, it shrinks to one tick spacing
//! at the average clearing price instead and no longer touches the anchor. The upper slug holds what the linear
//! schedule expects sold by the end of the current epoch. Price discovery
//! slugs carry everything else.
//!
//! ## Realization
//!
//! Placement is withdraw-all, move price, deposit-all. Deposits are funded
//! from the auction's reserves and never touch collected fees.

use num_bigint::BigUint;
use tracing::debug;

use super::epoch::EpochClock;
use super::error::AuctionError;
use super::planner::Trajectory;
use crate::amm::{ModifyLiquidityParams, PoolManager, SwapParams};
use crate::math::{
    get_amount0_delta, get_amount1_delta, get_liquidity_for_amount0, get_liquidity_for_amount1, get_sqrt_ratio_at_tick,
    get_tick_at_sqrt_ratio, max_sqrt_ratio, min_sqrt_ratio, to_u128, MAX_TICK,
};
use crate::types::{Address, AuctionConfig, AuctionState, PoolId, PoolKey, Slug, SlugKind, SlugSet, TickOrientation};

/// Everything a layout depends on besides the config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationInputs {
    pub anchor_tick: i32,
    pub floor_tick: i32,
    pub ceiling_tick: i32,
    pub epoch: u64,
    /// Numeraire the lower slug may use
    pub numeraire_available: u128,
    /// Asset the upper and price discovery slugs may use
    pub asset_available: u128,
}

#[derive(Debug, Clone, Copy)]
pub struct SlugAllocator {
    config: AuctionConfig,
    clock: EpochClock,
    tick_spacing: i32,
    upper_range: i32,
}

impl SlugAllocator {
    /// # Arguments
    ///
    /// * `config` - Validated auction config
    /// * `tick_spacing` - Pool tick spacing
    /// * `upper_range` - Width of the upper slug in ticks
    pub fn new(config: AuctionConfig, tick_spacing: i32, upper_range: i32) -> Self {
        Self {
            clock: EpochClock::new(&config),
            config,
            tick_spacing,
            upper_range,
        }
    }

    #[inline]
    fn orientation(&self) -> TickOrientation {
        self.config.orientation()
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Lay out slugs for one epoch without touching the pool.
    pub fn compute(&self, inputs: &AllocationInputs, total_tokens_sold: i128) -> Result<SlugSet, AuctionError> {
        let o = self.orientation();
        let spacing = self.tick_spacing;
        let asset_is_currency0 = self.config.is_token0;
        let anchor = inputs.anchor_tick;

        let lower_floor = if inputs.floor_tick == anchor {
            o.lower(anchor, spacing)
        } else {
            inputs.floor_tick
        };
        let (lower_floor, lower_ceiling) = if total_tokens_sold > 0
            && inputs.numeraire_available > 0
            && self.required_proceeds(lower_floor, anchor, total_tokens_sold as u128)? > inputs.numeraire_available
        {
            let ceiling = self.average_price_tick(inputs.numeraire_available, total_tokens_sold as u128, anchor)?;
            (o.lower(ceiling, spacing), ceiling)
        } else {
            (lower_floor, anchor)
        };
        let lower_liquidity =
            self.liquidity_for(lower_floor, lower_ceiling, inputs.numeraire_available, !asset_is_currency0)?;
        let lower = Slug::new(SlugKind::Lower, lower_floor, lower_ceiling, lower_liquidity, o);

        let upper_tokens = self.upper_tokens(inputs.epoch, total_tokens_sold, inputs.asset_available)?;
        let upper_ceiling = if upper_tokens == 0 {
            anchor
        } else {
            o.raise(anchor, self.upper_range)
        };
        let upper_liquidity = self.liquidity_for(anchor, upper_ceiling, upper_tokens, asset_is_currency0)?;
        let upper = Slug::new(SlugKind::Upper, anchor, upper_ceiling, upper_liquidity, o);

        let count = self.config.num_price_discovery_slugs.max(1);
        let min_ceiling = o.raise(upper_ceiling, spacing * count as i32);
        let pd_ceiling = o.max(inputs.ceiling_tick, min_ceiling);
        let span = (o.price_space(pd_ceiling) - o.price_space(upper_ceiling)) as i32;
        let width = (span / count as i32 / spacing) * spacing;
        let per_slug = (inputs.asset_available - upper_tokens) / count as u128;

        let mut price_discovery = Vec::with_capacity(count);
        for i in 0..count {
            let floor = o.raise(upper_ceiling, width * i as i32);
            let ceiling = o.raise(floor, width);
            let liquidity = self.liquidity_for(floor, ceiling, per_slug, asset_is_currency0)?;
            price_discovery.push(Slug::new(SlugKind::PriceDiscovery(i), floor, ceiling, liquidity, o));
        }

        Ok(SlugSet {
            lower,
            upper,
            price_discovery,
            ceiling_tick: pd_ceiling,
        })
    }

    /// Asset due by the end of `epoch` and not yet sold, capped by `available`
    pub fn upper_tokens(&self, epoch: u64, total_tokens_sold: i128, available: u128) -> Result<u128, AuctionError> {
        let due = self
            .clock
            .linear_share(self.config.num_tokens_to_sell, self.clock.epoch_end(epoch))?;
        let outstanding = match i128::try_from(due) {
            Ok(due) => due.saturating_sub(total_tokens_sold).max(0) as u128,
            Err(_) => u128::MAX,
        };
        Ok(outstanding.min(available))
    }

    /// Liquidity a range supports with `amount`, rounded so the deposit
    /// never needs more than `amount`.
    fn liquidity_for(&self, floor: i32, ceiling: i32, amount: u128, currency0: bool) -> Result<u128, AuctionError> {
        if amount == 0 || floor == ceiling {
            return Ok(0);
        }
        let sqrt_a = get_sqrt_ratio_at_tick(floor)?;
        let sqrt_b = get_sqrt_ratio_at_tick(ceiling)?;
        let liquidity = if currency0 {
            // Depositing currency0 rounds up by at most one unit
            get_liquidity_for_amount0(&sqrt_a, &sqrt_b, amount - 1)?
        } else {
            get_liquidity_for_amount1(&sqrt_a, &sqrt_b, amount)?
        };
        Ok(liquidity)
    }

    /// Numeraire needed to buy back `sold` asset across `[floor, ceiling]`,
    /// rounded up.
    pub fn required_proceeds(&self, floor: i32, ceiling: i32, sold: u128) -> Result<u128, AuctionError> {
        if sold == 0 || floor == ceiling {
            return Ok(0);
        }
        let sqrt_a = get_sqrt_ratio_at_tick(floor)?;
        let sqrt_b = get_sqrt_ratio_at_tick(ceiling)?;
        let required = if self.config.is_token0 {
            let liquidity = get_liquidity_for_amount0(&sqrt_a, &sqrt_b, sold)?;
            get_amount1_delta(&sqrt_a, &sqrt_b, liquidity, true)
        } else {
            let liquidity = get_liquidity_for_amount1(&sqrt_a, &sqrt_b, sold)?;
            get_amount0_delta(&sqrt_a, &sqrt_b, liquidity, true)
        };
        Ok(to_u128(required)?)
    }

    /// Aligned tick at or under the average clearing price `proceeds / sold`,
    /// never above `anchor`.
    fn average_price_tick(&self, proceeds: u128, sold: u128, anchor: i32) -> Result<i32, AuctionError> {
        let o = self.orientation();
        // AMM price is currency1 per currency0
        let (num, den) = if self.config.is_token0 {
            (proceeds, sold)
        } else {
            (sold, proceeds)
        };
        let price_x192: BigUint = (BigUint::from(num) << 192) / BigUint::from(den);
        let sqrt = price_x192
            .sqrt()
            .clamp(min_sqrt_ratio(), max_sqrt_ratio() - 1u32);

        let tick = get_tick_at_sqrt_ratio(&sqrt)?;
        // The tick floor is dearer than the true price when the asset is currency1
        let tick = if self.config.is_token0 {
            tick
        } else {
            (tick + 1).min(MAX_TICK)
        };
        let ceiling = o.align(tick, self.tick_spacing);
        Ok(if o.is_below(anchor, ceiling) { anchor } else { ceiling })
    }

    /// `(numeraire, asset)` the next layout may deploy
    pub fn available(&self, state: &AuctionState) -> (u128, u128) {
        let asset0 = self.config.is_token0;
        let held = |currency0: bool| {
            state
                .reserves
                .get(currency0)
                .saturating_sub(state.fees_accrued.get(currency0))
        };

        let numeraire = state.total_proceeds.min(held(!asset0));

        let supply = self.config.num_tokens_to_sell;
        let sold = state.total_tokens_sold;
        let unsold = if sold <= 0 {
            supply.saturating_add(sold.unsigned_abs())
        } else {
            supply.saturating_sub(sold as u128)
        };
        (numeraire, unsold.min(held(asset0)))
    }

    // ========================================================================
    // Realization
    // ========================================================================

    /// Replace `current` with a fresh layout for `trajectory`.
    ///
    /// # Returns
    ///
    /// The slugs now registered with the pool
    pub fn realize<P: PoolManager>(
        &self,
        pool: &mut P,
        key: &PoolKey,
        state: &mut AuctionState,
        current: &SlugSet,
        trajectory: &Trajectory,
    ) -> Result<SlugSet, AuctionError> {
        let pool_id = key.id();
        let owner = key.hooks;

        self.withdraw(pool, &pool_id, owner, current, state)?;
        self.move_price(pool, &pool_id, trajectory.anchor_tick, state)?;

        let (numeraire_available, asset_available) = self.available(state);
        let inputs = AllocationInputs {
            anchor_tick: trajectory.anchor_tick,
            floor_tick: trajectory.floor_tick,
            ceiling_tick: trajectory.ceiling_tick,
            epoch: trajectory.epoch,
            numeraire_available,
            asset_available,
        };
        let slugs = self.compute(&inputs, state.total_tokens_sold)?;
        self.deposit(pool, &pool_id, owner, &slugs, state)?;

        debug!(
            pool = %pool_id,
            epoch = trajectory.epoch,
            anchor = trajectory.anchor_tick,
            lower_liquidity = slugs.lower.liquidity,
            upper_liquidity = slugs.upper.liquidity,
            numeraire_available,
            asset_available,
            "slugs placed"
        );
        Ok(slugs)
    }

    /// Remove every registered slug, crediting principal and fees to the
    /// reserves. The amount withdrawn is whatever the pool manager reports
    /// for the position, not the cached slug liquidity.
    ///
    /// # Returns
    ///
    /// The same ranges with zero liquidity
    pub fn withdraw<P: PoolManager>(
        &self,
        pool: &mut P,
        pool_id: &PoolId,
        owner: Address,
        current: &SlugSet,
        state: &mut AuctionState,
    ) -> Result<SlugSet, AuctionError> {
        for slug in current.iter() {
            let registered = pool
                .position_info(pool_id, owner, slug.tick_lower, slug.tick_upper, slug.salt)?
                .liquidity;
            if registered == 0 {
                continue;
            }
            let liquidity = i128::try_from(registered).map_err(|_| AuctionError::MathOverflow)?;
            let params = ModifyLiquidityParams {
                tick_lower: slug.tick_lower,
                tick_upper: slug.tick_upper,
                liquidity_delta: -liquidity,
                salt: slug.salt,
            };
            let outcome = pool.modify_liquidity(pool_id, owner, &params)?;
            state.reserves.apply(outcome.delta)?;
            state.fees_accrued.accrue(outcome.fees_accrued);
        }
        Ok(current.drained())
    }

    /// Register every non-empty slug, paying from the reserves
    pub fn deposit<P: PoolManager>(
        &self,
        pool: &mut P,
        pool_id: &PoolId,
        owner: Address,
        slugs: &SlugSet,
        state: &mut AuctionState,
    ) -> Result<(), AuctionError> {
        for slug in slugs.iter().filter(|slug| !slug.is_empty()) {
            let liquidity = i128::try_from(slug.liquidity).map_err(|_| AuctionError::MathOverflow)?;
            let params = ModifyLiquidityParams {
                tick_lower: slug.tick_lower,
                tick_upper: slug.tick_upper,
                liquidity_delta: liquidity,
                salt: slug.salt,
            };
            let outcome = pool.modify_liquidity(pool_id, owner, &params)?;
            state.reserves.apply(outcome.delta)?;
            state.fees_accrued.accrue(outcome.fees_accrued);
        }
        Ok(())
    }

    /// Swap through empty ticks until the pool sits exactly at `tick`.
    fn move_price<P: PoolManager>(
        &self,
        pool: &mut P,
        pool_id: &PoolId,
        tick: i32,
        state: &mut AuctionState,
    ) -> Result<(), AuctionError> {
        let target = get_sqrt_ratio_at_tick(tick)?;
        let current = pool.slot0(pool_id)?.sqrt_price_x96;
        if current == target {
            return Ok(());
        }

        let zero_for_one = target < current;
        let delta = pool.swap(pool_id, &SwapParams::with_limit(zero_for_one, 1, target))?;
        state.reserves.apply(delta)?;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amm::SimulatedPoolManager;
    use crate::engine::planner::PriceTrajectoryPlanner;

    const E18: u128 = 1_000_000_000_000_000_000;
    const START: u64 = 10_000;
    const SUPPLY: u128 = 100_000 * E18;

    fn config(is_token0: bool) -> AuctionConfig {
        AuctionConfig {
            num_tokens_to_sell: SUPPLY,
            minimum_proceeds: 100 * E18,
            maximum_proceeds: 10_000 * E18,
            starting_time: START,
            ending_time: START + 86_400,
            starting_tick: if is_token0 { 1_600 } else { -1_600 },
            ending_tick: if is_token0 { -171_200 } else { 171_200 },
            epoch_length: 400,
            gamma: 800,
            is_token0,
            num_price_discovery_slugs: 3,
        }
    }

    fn allocator(is_token0: bool) -> SlugAllocator {
        SlugAllocator::new(config(is_token0), 8, 8)
    }

    fn inputs(is_token0: bool) -> AllocationInputs {
        let o = TickOrientation::new(is_token0);
        AllocationInputs {
            anchor_tick: o.raise(0, 800),
            floor_tick: 0,
            ceiling_tick: o.raise(0, 1_600),
            epoch: 2,
            numeraire_available: 50 * E18,
            asset_available: SUPPLY,
        }
    }

    #[test]
    fn test_layout_is_contiguous() {
        for is_token0 in [true, false] {
            let o = TickOrientation::new(is_token0);
            let slugs = allocator(is_token0).compute(&inputs(is_token0), 0).unwrap();

            assert!(slugs.is_contiguous(o));
            assert!(slugs.ceiling_gap(o, inputs(is_token0).ceiling_tick) < 3 * 8);
            assert_eq!(slugs.floor(o), 0);
            assert_eq!(slugs.upper.floor(o), o.raise(0, 800));
            assert_eq!(slugs.upper.ceiling(o), o.raise(0, 808));
            assert_eq!(slugs.price_discovery.len(), 3);
            assert!(slugs.iter().all(|s| s.tick_lower <= s.tick_upper));
            assert!(slugs.iter().all(|s| s.liquidity > 0));
        }
    }

    #[test]
    fn test_lower_floor_moves_when_at_anchor() {
        let a = allocator(true);
        let mut i = inputs(true);
        i.floor_tick = i.anchor_tick;

        let slugs = a.compute(&i, 0).unwrap();
        assert_eq!(slugs.lower.tick_lower, 792);
        assert_eq!(slugs.lower.tick_upper, 800);
    }

    #[test]
    fn test_nothing_raised_leaves_lower_empty() {
        let a = allocator(true);
        let mut i = inputs(true);
        i.numeraire_available = 0;

        let slugs = a.compute(&i, 0).unwrap();
        assert!(slugs.lower.is_empty());
        assert_eq!(slugs.lower.liquidity, 0);
    }

    #[test]
    fn test_required_proceeds() {
        let a = allocator(true);
        // 40 tokens across [0, 800] clear at 1.0001^400 on average
        let required = a.required_proceeds(0, 800, 40 * E18).unwrap();
        assert!(required > 41_600 * E18 / 1_000, "required {}", required);
        assert!(required < 41_700 * E18 / 1_000, "required {}", required);
        assert_eq!(a.required_proceeds(0, 800, 0).unwrap(), 0);

        let mirrored = allocator(false).required_proceeds(0, -800, 40 * E18).unwrap();
        assert!(mirrored.abs_diff(required) < 10);
    }

    #[test]
    fn test_lower_spans_range_when_proceeds_suffice() {
        for is_token0 in [true, false] {
            let o = TickOrientation::new(is_token0);
            let slugs = allocator(is_token0).compute(&inputs(is_token0), 40 * E18 as i128).unwrap();
            assert_eq!(slugs.lower.floor(o), 0);
            assert_eq!(slugs.lower.ceiling(o), o.raise(0, 800));
        }
    }

    #[test]
    fn test_lower_moves_to_average_price_when_proceeds_short() {
        let sold = 100 * E18;
        for is_token0 in [true, false] {
            let o = TickOrientation::new(is_token0);
            let slugs = allocator(is_token0).compute(&inputs(is_token0), sold as i128).unwrap();

            // 50 raised for 100 sold clears at 0.5, tick -6931.8
            assert_eq!(slugs.lower.ceiling(o), o.lower(0, 6_936));
            assert_eq!(slugs.lower.width(), 8);
            assert!(slugs.is_contiguous(o));

            // Draining the slug takes back at least everything sold
            let sqrt_a = get_sqrt_ratio_at_tick(slugs.lower.tick_lower).unwrap();
            let sqrt_b = get_sqrt_ratio_at_tick(slugs.lower.tick_upper).unwrap();
            let capacity = if is_token0 {
                get_amount0_delta(&sqrt_a, &sqrt_b, slugs.lower.liquidity, false)
            } else {
                get_amount1_delta(&sqrt_a, &sqrt_b, slugs.lower.liquidity, false)
            };
            assert!(capacity >= BigUint::from(sold), "capacity {}", capacity);
        }
    }

    #[test]
    fn test_upper_degenerate_when_ahead_of_schedule() {
        let o = TickOrientation::new(true);
        let a = allocator(true);
        // Far more sold than is due by the end of epoch 2
        let slugs = a.compute(&inputs(true), 50_000 * E18 as i128).unwrap();

        assert_eq!(slugs.upper.liquidity, 0);
        assert_eq!(slugs.upper.width(), 0);
        assert_eq!(slugs.price_discovery[0].floor(o), 800);
        assert!(slugs.is_contiguous(o));
    }

    #[test]
    fn test_pd_ceiling_widened_to_fit_slugs() {
        let o = TickOrientation::new(true);
        let a = allocator(true);
        let mut i = inputs(true);
        i.ceiling_tick = 808;

        let slugs = a.compute(&i, 0).unwrap();
        assert_eq!(slugs.ceiling_tick, 808 + 24);
        for pd in &slugs.price_discovery {
            assert_eq!(pd.width(), 8);
        }
        assert!(slugs.is_contiguous(o));
    }

    #[test]
    fn test_upper_tokens_schedule() {
        let a = allocator(true);
        let per_epoch = SUPPLY * 400 / 86_400;

        assert_eq!(a.upper_tokens(1, 0, SUPPLY).unwrap(), per_epoch);
        assert_eq!(a.upper_tokens(2, per_epoch as i128, SUPPLY).unwrap(), SUPPLY * 800 / 86_400 - per_epoch);
        assert_eq!(a.upper_tokens(1, SUPPLY as i128, SUPPLY).unwrap(), 0);
        assert_eq!(a.upper_tokens(1, 0, 5).unwrap(), 5);
    }

    #[test]
    fn test_available_excludes_fees() {
        let a = allocator(true);
        let mut state = AuctionState::new(SUPPLY, true);
        state.total_proceeds = 10 * E18;
        state.reserves.amount1 = 12 * E18;
        state.fees_accrued.amount1 = 3 * E18;
        state.fees_accrued.amount0 = E18;

        let (numeraire, asset) = a.available(&state);
        assert_eq!(numeraire, 9 * E18);
        assert_eq!(asset, SUPPLY - E18);
    }

    #[test]
    fn test_realize_round_trip() {
        let cfg = config(true);
        let key = PoolKey::new(Address::repeat_byte(1), Address::repeat_byte(2), 3_000, 8, Address::repeat_byte(0xAA));
        let mut pool = SimulatedPoolManager::new();
        pool.initialize(&key, &get_sqrt_ratio_at_tick(1_600).unwrap()).unwrap();

        let planner = PriceTrajectoryPlanner::new(cfg, 8);
        let a = SlugAllocator::new(cfg, 8, planner.upper_slug_range());
        let mut state = AuctionState::new(SUPPLY, true);

        let slugs = a
            .realize(&mut pool, &key, &mut state, &SlugSet::empty(1_600), &planner.initial())
            .unwrap();
        assert!(slugs.is_contiguous(cfg.orientation()));
        assert!(state.reserves.amount0 < SUPPLY);
        let pool_view = pool.pool(&key.id()).unwrap();
        assert_eq!(pool_view.reserves().amount0, SUPPLY - state.reserves.amount0);

        // Pulling everything back recovers the supply up to rounding
        let drained = a.withdraw(&mut pool, &key.id(), key.hooks, &slugs, &mut state).unwrap();
        assert_eq!(drained.total_liquidity(), 0);
        assert!(SUPPLY - state.reserves.amount0 <= 10);
        assert!(state.fees_accrued.is_zero());
    }

    #[test]
    fn test_withdraw_reads_registered_liquidity() {
        let cfg = config(true);
        let key = PoolKey::new(Address::repeat_byte(1), Address::repeat_byte(2), 3_000, 8, Address::repeat_byte(0xAA));
        let mut pool = SimulatedPoolManager::new();
        pool.initialize(&key, &get_sqrt_ratio_at_tick(1_600).unwrap()).unwrap();

        let planner = PriceTrajectoryPlanner::new(cfg, 8);
        let a = SlugAllocator::new(cfg, 8, planner.upper_slug_range());
        let mut state = AuctionState::new(SUPPLY, true);
        let slugs = a
            .realize(&mut pool, &key, &mut state, &SlugSet::empty(1_600), &planner.initial())
            .unwrap();

        // Cached liquidity is cleared but the positions are still live
        a.withdraw(&mut pool, &key.id(), key.hooks, &slugs.drained(), &mut state)
            .unwrap();
        for slug in slugs.iter() {
            let info = pool
                .position_info(&key.id(), key.hooks, slug.tick_lower, slug.tick_upper, slug.salt)
                .unwrap();
            assert_eq!(info.liquidity, 0);
        }
        assert_eq!(pool.pool(&key.id()).unwrap().liquidity(), 0);
        assert!(SUPPLY - state.reserves.amount0 <= 10);
    }

    #[test]
    fn test_realize_moves_price_to_anchor() {
        let cfg = config(false);
        let key = PoolKey::new(Address::repeat_byte(1), Address::repeat_byte(2), 3_000, 8, Address::repeat_byte(0xAA));
        let mut pool = SimulatedPoolManager::new();
        pool.initialize(&key, &get_sqrt_ratio_at_tick(-1_600).unwrap()).unwrap();

        let planner = PriceTrajectoryPlanner::new(cfg, 8);
        let a = SlugAllocator::new(cfg, 8, planner.upper_slug_range());
        let mut state = AuctionState::new(SUPPLY, false);
        let slugs = a
            .realize(&mut pool, &key, &mut state, &SlugSet::empty(-1_600), &planner.initial())
            .unwrap();

        let state_before = state.clone();
        let t = planner.plan(&state, -1_600, slugs.upper.ceiling(cfg.orientation()), START + 400).unwrap();
        let next = a.realize(&mut pool, &key, &mut state, &slugs, &t).unwrap();

        assert_eq!(pool.slot0(&key.id()).unwrap().tick, -800);
        assert_eq!(next.upper.floor(cfg.orientation()), -800);
        assert!(next.is_contiguous(cfg.orientation()));
        assert_eq!(state.total_tokens_sold, state_before.total_tokens_sold);
    }
}
