//! The gradual Dutch auction initializer.
//!
//! ## Lifecycle
//!
//! 1. [`DutchAuction::create`] validates the config, initializes the pool at
//!    `starting_tick` and places the first slugs.
//! 2. Each swap runs `before_swap` (admission, and on the first swap of a new
//!    epoch a full rebalance), then the pool swap, then `after_swap`
//!    (accounting and bounds).
//! 3. After `ending_time`, with enough proceeds, the authority migrates.
//!
//! ## Example
//!
//! ```
//! use gda_engine::amm::{PoolManager, SimulatedPoolManager, SwapParams};
//! use gda_engine::engine::{DutchAuction, LiquidityHook};
//! use gda_engine::types::{Address, AuctionConfig, PoolKey};
//!
//! const E18: u128 = 1_000_000_000_000_000_000;
//!
//! let config = AuctionConfig {
//!     num_tokens_to_sell: 100_000 * E18,
//!     minimum_proceeds: 100 * E18,
//!     maximum_proceeds: 10_000 * E18,
//!     starting_time: 1_000,
//!     ending_time: 1_000 + 86_400,
//!     starting_tick: 1_600,
//!     ending_tick: -171_200,
//!     epoch_length: 400,
//!     gamma: 800,
//!     is_token0: true,
//!     num_price_discovery_slugs: 3,
//! };
//! let key = PoolKey::new(Address::repeat_byte(1), Address::repeat_byte(2), 3_000, 8, Address::repeat_byte(0xAA));
//! let authority = Address::repeat_byte(0xA1);
//!
//! let mut pool = SimulatedPoolManager::new();
//! let mut auction = DutchAuction::create(&mut pool, key, config, authority, 900).unwrap();
//!
//! // Buy the asset (currency0) with 10 units of numeraire
//! let params = SwapParams::exact_in(false, 10 * E18);
//! let ctx = auction.before_swap(&mut pool, &params, 1_000).unwrap();
//! let delta = pool.swap(&key.id(), &params).unwrap();
//! let report = auction.after_swap(&mut pool, &ctx, delta).unwrap();
//!
//! assert!(report.total_tokens_sold > 0);
//! assert_eq!(auction.total_proceeds(), report.total_proceeds);
//! ```

use tracing::info;

use super::allocator::SlugAllocator;
use super::epoch::EpochClock;
use super::error::AuctionError;
use super::gate::{AuctionPhase, SwapDirection, SwapGate};
use super::hook::{LiquidityHook, SwapContext, SwapReport};
use super::ledger::ProceedsLedger;
use super::migration::MigrationCoordinator;
use super::planner::PriceTrajectoryPlanner;
use super::validator::ConfigValidator;
use crate::amm::{PoolManager, SwapParams};
use crate::math::get_sqrt_ratio_at_tick;
use crate::types::{
    Address, AuctionConfig, AuctionState, BalanceDelta, MigrationReceipt, PoolId, PoolKey, SlugSet,
};

/// One auction bound to one pool.
#[derive(Debug, Clone)]
pub struct DutchAuction {
    key: PoolKey,
    pool_id: PoolId,
    config: AuctionConfig,
    /// Account allowed to migrate
    authority: Address,
    state: AuctionState,
    slugs: SlugSet,
    clock: EpochClock,
    planner: PriceTrajectoryPlanner,
    allocator: SlugAllocator,
    gate: SwapGate,
    ledger: ProceedsLedger,
}

impl DutchAuction {
    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn key(&self) -> &PoolKey {
        &self.key
    }

    #[inline]
    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    #[inline]
    pub fn authority(&self) -> Address {
        self.authority
    }

    #[inline]
    pub fn state(&self) -> &AuctionState {
        &self.state
    }

    /// Slugs currently registered with the pool
    #[inline]
    pub fn slugs(&self) -> &SlugSet {
        &self.slugs
    }

    #[inline]
    pub fn total_tokens_sold(&self) -> i128 {
        self.state.total_tokens_sold
    }

    #[inline]
    pub fn total_proceeds(&self) -> u128 {
        self.state.total_proceeds
    }

    #[inline]
    pub fn starting_time(&self) -> u64 {
        self.clock.starting_time()
    }

    #[inline]
    pub fn ending_time(&self) -> u64 {
        self.clock.ending_time()
    }

    /// Epoch containing `now`, `None` before the start
    #[inline]
    pub fn current_epoch(&self, now: u64) -> Option<u64> {
        self.clock.epoch_of(now)
    }

    #[inline]
    pub fn phase(&self, now: u64) -> AuctionPhase {
        self.gate.phase(&self.state, now)
    }

    /// `(floor, ceiling)` implied by the current accumulator
    pub fn global_range(&self) -> (i32, i32) {
        self.planner.global_range(self.state.tick_accumulator)
    }

    /// Tokens the linear schedule expects sold by `now`
    pub fn expected_sold(&self, now: u64) -> Result<u128, AuctionError> {
        self.planner.expected_sold_at(now)
    }

    pub fn state_root(&self) -> Result<[u8; 32], AuctionError> {
        Ok(self.state.state_root()?)
    }

    // ========================================================================
    // Rebalancing
    // ========================================================================

    /// Move the trajectory for the epoch containing `now` and re-place
    /// every slug.
    fn rebalance<P: PoolManager>(&mut self, pool: &mut P, now: u64) -> Result<(), AuctionError> {
        let orientation = self.config.orientation();
        let spot = pool.slot0(&self.pool_id)?;
        let trajectory = self
            .planner
            .plan(&self.state, spot.tick, self.slugs.upper.ceiling(orientation), now)?;

        self.planner.apply(&mut self.state, &trajectory);
        self.slugs = self
            .allocator
            .realize(pool, &self.key, &mut self.state, &self.slugs, &trajectory)?;

        info!(
            pool = %self.pool_id,
            epoch = trajectory.epoch,
            epochs_passed = trajectory.epochs_passed,
            spot = spot.tick,
            accumulator = %trajectory.tick_accumulator,
            floor = trajectory.floor_tick,
            ceiling = trajectory.ceiling_tick,
            anchor = trajectory.anchor_tick,
            net_sold = %trajectory.net_sold,
            "rebalanced"
        );
        Ok(())
    }
}

impl LiquidityHook for DutchAuction {
    type Config = AuctionConfig;

    fn validate(config: &AuctionConfig, key: &PoolKey, creation_time: u64) -> Result<(), AuctionError> {
        ConfigValidator::validate(config, key.tick_spacing, creation_time)
    }

    fn create<P: PoolManager>(
        pool: &mut P,
        key: PoolKey,
        config: AuctionConfig,
        authority: Address,
        now: u64,
    ) -> Result<Self, AuctionError> {
        Self::validate(&config, &key, now)?;

        let pool_id = key.id();
        pool.initialize(&key, &get_sqrt_ratio_at_tick(config.starting_tick)?)?;

        let planner = PriceTrajectoryPlanner::new(config, key.tick_spacing);
        let allocator = SlugAllocator::new(config, key.tick_spacing, planner.upper_slug_range());
        let mut state = AuctionState::new(config.num_tokens_to_sell, config.is_token0);
        let initial = planner.initial();
        let slugs = allocator.realize(pool, &key, &mut state, &SlugSet::empty(config.starting_tick), &initial)?;

        info!(
            pool = %pool_id,
            tokens = %config.num_tokens_to_sell,
            starting_tick = config.starting_tick,
            ending_tick = config.ending_tick,
            starting_time = config.starting_time,
            ending_time = config.ending_time,
            is_token0 = config.is_token0,
            "auction created"
        );

        Ok(Self {
            key,
            pool_id,
            config,
            authority,
            state,
            slugs,
            clock: EpochClock::new(&config),
            planner,
            allocator,
            gate: SwapGate::new(config),
            ledger: ProceedsLedger::new(config.is_token0, key.fee),
        })
    }

    fn before_swap<P: PoolManager>(
        &mut self,
        pool: &mut P,
        params: &SwapParams,
        now: u64,
    ) -> Result<SwapContext, AuctionError> {
        let direction = SwapDirection::of(params.zero_for_one, self.config.is_token0);
        self.gate.check_before_swap(&self.state, now, direction)?;

        let phase = self.gate.phase(&self.state, now);
        let rebalanced = self.gate.rebalance_due(&self.state, now);
        if rebalanced {
            self.rebalance(pool, now)?;
        }

        Ok(SwapContext {
            now,
            phase,
            direction,
            epoch: self.clock.epoch_of(now).unwrap_or(0),
            rebalanced,
        })
    }

    fn after_swap<P: PoolManager>(
        &mut self,
        pool: &mut P,
        context: &SwapContext,
        delta: BalanceDelta,
    ) -> Result<SwapReport, AuctionError> {
        let entry = self.ledger.record(&mut self.state, delta)?;
        let spot = pool.slot0(&self.pool_id)?;
        let floor = self.slugs.floor(self.config.orientation());
        self.gate.check_after_swap(
            &self.state,
            context.phase,
            context.direction,
            (&spot.sqrt_price_x96, spot.tick),
            floor,
        )?;

        Ok(SwapReport {
            entry,
            tick: spot.tick,
            total_tokens_sold: self.state.total_tokens_sold,
            total_proceeds: self.state.total_proceeds,
        })
    }

    fn migrate<P: PoolManager>(
        &mut self,
        pool: &mut P,
        caller: Address,
        recipient: Address,
        now: u64,
    ) -> Result<MigrationReceipt, AuctionError> {
        if caller != self.authority {
            return Err(AuctionError::Unauthorized {
                caller,
                expected: self.authority,
            });
        }
        self.gate
            .check_migration(&self.state, now)
            .map_err(AuctionError::CannotMigrate)?;

        let receipt = MigrationCoordinator::execute(
            pool,
            &self.key,
            &self.allocator,
            &mut self.state,
            &mut self.slugs,
            recipient,
            now,
        )?;

        info!(
            pool = %self.pool_id,
            recipient = %recipient,
            principal0 = %receipt.principal0,
            fees0 = %receipt.fees0,
            principal1 = %receipt.principal1,
            fees1 = %receipt.fees1,
            state_root = %receipt.state_root_hex(),
            "auction migrated"
        );
        Ok(receipt)
    }

    #[inline]
    fn pool_id(&self) -> PoolId {
        self.pool_id
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
