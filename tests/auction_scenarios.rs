//! End-to-end auction scenarios through the registry.
//!
//! Every scenario runs against the in-memory pool manager with the same
//! baseline auction: 100_000 tokens over one day in 400-second epochs,
//! gamma 800, tick spacing 8, 0.3% pool fee.

use gda_engine::engine::{MigrationBlocker, SwapDirection};
use gda_engine::types::WAD;
use gda_engine::{
    Address, AuctionConfig, AuctionError, AuctionPhase, AuctionRegistry, DutchAuction, PoolId, PoolKey, PoolManager,
    SimulatedPoolManager, SwapOutcome, SwapParams,
};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

const E18: u128 = 1_000_000_000_000_000_000;
const START: u64 = 1_000_000;
const EPOCH: u64 = 400;
const DURATION: u64 = 86_400;
const END: u64 = START + DURATION;

const AUTHORITY: Address = Address::repeat_byte(0xA1);
const RECIPIENT: Address = Address::repeat_byte(0xB0);
const STRANGER: Address = Address::repeat_byte(0x55);

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn config(is_token0: bool) -> AuctionConfig {
    AuctionConfig {
        num_tokens_to_sell: 100_000 * E18,
        minimum_proceeds: 100 * E18,
        maximum_proceeds: 10_000 * E18,
        starting_time: START,
        ending_time: END,
        starting_tick: if is_token0 { 1_600 } else { -1_600 },
        ending_tick: if is_token0 { -171_200 } else { 171_200 },
        epoch_length: EPOCH,
        gamma: 800,
        is_token0,
        num_price_discovery_slugs: 3,
    }
}

fn key(is_token0: bool, tick_spacing: i32) -> PoolKey {
    let asset = if is_token0 {
        Address::repeat_byte(0x01)
    } else {
        Address::repeat_byte(0x03)
    };
    PoolKey::new(asset, Address::repeat_byte(0x02), 3_000, tick_spacing, Address::repeat_byte(0xAA))
}

/// Epoch `n` (1-based) starts at this time
fn epoch_start(n: u64) -> u64 {
    START + (n - 1) * EPOCH
}

struct Harness {
    registry: AuctionRegistry<SimulatedPoolManager>,
    pool_id: PoolId,
    is_token0: bool,
}

impl Harness {
    fn new(config: AuctionConfig) -> Self {
        let mut registry = AuctionRegistry::new(SimulatedPoolManager::new(), AUTHORITY);
        let pool_id = registry
            .create(AUTHORITY, key(config.is_token0, 8), config, START - 1)
            .unwrap();
        Self {
            registry,
            pool_id,
            is_token0: config.is_token0,
        }
    }

    fn auction(&self) -> &DutchAuction {
        self.registry.get(&self.pool_id).unwrap()
    }

    fn buy(&mut self, numeraire: u128, now: u64) -> Result<SwapOutcome, AuctionError> {
        let params = SwapParams::exact_in(!self.is_token0, numeraire);
        self.registry.swap(&self.pool_id, &params, now)
    }

    fn sell(&mut self, asset: u128, now: u64) -> Result<SwapOutcome, AuctionError> {
        let params = SwapParams::exact_in(self.is_token0, asset);
        self.registry.swap(&self.pool_id, &params, now)
    }

    fn state_root(&self) -> [u8; 32] {
        self.auction().state_root().unwrap()
    }

    fn spot_tick(&self) -> i32 {
        self.registry.pool_manager().slot0(&self.pool_id).unwrap().tick
    }
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn scenario_gamma_must_divide_range() {
    let mut registry: AuctionRegistry<SimulatedPoolManager> =
        AuctionRegistry::new(SimulatedPoolManager::new(), AUTHORITY);
    let bad = AuctionConfig {
        starting_tick: 100,
        ending_tick: 0,
        gamma: 3,
        epoch_length: DURATION,
        ..config(true)
    };

    assert_eq!(
        registry.create(AUTHORITY, key(true, 1), bad, START - 1),
        Err(AuctionError::InvalidGammaRange {
            tick_delta: 100,
            gamma: 3,
            total_epochs: 1,
        })
    );
    assert!(registry.is_empty());
    assert!(registry.pool_manager().is_empty());
}

#[test]
fn scenario_swap_opens_at_starting_time() {
    let mut h = Harness::new(config(true));

    assert_eq!(
        h.buy(E18, START - 1).unwrap_err(),
        AuctionError::CannotSwapBeforeStartTime {
            now: START - 1,
            starting_time: START,
        }
    );
    let outcome = h.buy(E18, START).unwrap();
    assert_eq!(outcome.report.entry.direction, SwapDirection::Buy);
    assert!(h.auction().total_tokens_sold() > 0);
}

#[test]
fn scenario_insufficient_proceeds_allows_exit() {
    let mut h = Harness::new(config(true));

    let bought = h.buy(50 * E18, START).unwrap().report.entry.asset;
    let proceeds_before = h.auction().total_proceeds();
    assert!(proceeds_before > 49 * E18);

    assert_eq!(h.auction().phase(END + 1), AuctionPhase::EndedInsufficientProceeds);
    assert!(matches!(
        h.buy(E18, END + 1),
        Err(AuctionError::InvalidSwapAfterMaturityInsufficientProceeds { .. })
    ));

    h.sell(bought, END + 1).unwrap();
    let proceeds_after = h.auction().total_proceeds();
    assert!(proceeds_after < proceeds_before / 50);
}

#[test]
fn scenario_migration_settles_everything() {
    let mut h = Harness::new(config(true));
    h.buy(110 * E18, START).unwrap();
    assert!(h.auction().total_proceeds() >= 100 * E18);

    let receipt = h
        .registry
        .migrate(&h.pool_id, AUTHORITY, RECIPIENT, END)
        .unwrap();

    assert_eq!(receipt.recipient(), RECIPIENT);
    assert!(receipt.total1() >= 110 * E18 - 100);
    assert!(receipt.fees1 > 0);
    assert!(receipt.principal0 > 99_000 * E18);
    assert_eq!(receipt.state_root, h.state_root());

    let auction = h.auction();
    assert_eq!(auction.slugs().total_liquidity(), 0);
    assert!(auction.state().reserves.is_zero());
    assert_eq!(auction.phase(END), AuctionPhase::Migrated);

    let pool = h.registry.pool_manager().pool(&h.pool_id).unwrap();
    assert_eq!(pool.liquidity(), 0);
    assert!(pool.reserves().amount0 <= 1_000);
    assert!(pool.reserves().amount1 <= 1_000);
}

#[test]
fn scenario_migration_exactly_once() {
    let mut h = Harness::new(config(true));
    h.buy(110 * E18, START).unwrap();
    h.registry.migrate(&h.pool_id, AUTHORITY, RECIPIENT, END).unwrap();
    let root = h.state_root();

    assert_eq!(
        h.registry.migrate(&h.pool_id, AUTHORITY, RECIPIENT, END + 1),
        Err(AuctionError::CannotMigrate(MigrationBlocker::AlreadyMigrated))
    );
    assert!(matches!(
        h.sell(E18, END + 1),
        Err(AuctionError::InvalidSwapAfterMaturitySufficientProceeds { .. })
    ));
    assert_eq!(h.state_root(), root);
}

#[test]
fn scenario_migration_before_end_or_by_stranger() {
    let mut h = Harness::new(config(true));
    h.buy(110 * E18, START).unwrap();

    assert_eq!(
        h.registry.migrate(&h.pool_id, STRANGER, STRANGER, END),
        Err(AuctionError::Unauthorized {
            caller: STRANGER,
            expected: AUTHORITY,
        })
    );
    assert_eq!(
        h.registry.migrate(&h.pool_id, AUTHORITY, RECIPIENT, END - 1),
        Err(AuctionError::CannotMigrate(MigrationBlocker::AuctionNotEnded {
            now: END - 1,
            ending_time: END,
        }))
    );
    // Still live after the refusals
    assert!(h.auction().slugs().total_liquidity() > 0);
    assert!(h.registry.migrate(&h.pool_id, AUTHORITY, RECIPIENT, END).is_ok());
}

#[test]
fn scenario_skipped_epochs_accumulate() {
    let mut h = Harness::new(config(true));

    // Ten quiet epochs, then a buy in epoch 11
    let outcome = h.buy(E18, epoch_start(11)).unwrap();
    assert!(outcome.context.rebalanced);
    assert_eq!(outcome.context.epoch, 11);

    let auction = h.auction();
    assert_eq!(auction.state().tick_accumulator, -8_000 * WAD);
    assert_eq!(auction.state().last_epoch, 11);
    assert_eq!(auction.slugs().lower.tick_lower, -6_408);
    assert_eq!(auction.slugs().upper.tick_lower, -6_400);
    assert_eq!(auction.global_range(), (-6_400, -5_600));

    // Five more epochs with a tiny amount sold: almost a full step each
    h.buy(E18, epoch_start(16)).unwrap();
    let accumulator = h.auction().state().tick_accumulator;
    assert!(accumulator > -12_000 * WAD, "accumulator {}", accumulator);
    assert!(accumulator < -11_990 * WAD, "accumulator {}", accumulator);
}

#[test]
fn scenario_rebalance_once_per_epoch() {
    let mut h = Harness::new(config(true));

    let first = h.buy(E18, epoch_start(2)).unwrap();
    assert!(first.context.rebalanced);
    let state = h.auction().state().clone();
    let slugs = h.auction().slugs().clone();

    let second = h.buy(E18, epoch_start(2) + EPOCH - 1).unwrap();
    assert!(!second.context.rebalanced);

    let after = h.auction().state();
    assert_eq!(after.last_epoch, state.last_epoch);
    assert_eq!(after.tick_accumulator, state.tick_accumulator);
    assert_eq!(after.total_tokens_sold_last_epoch, state.total_tokens_sold_last_epoch);
    assert_eq!(h.auction().slugs(), &slugs);
}

#[test]
fn scenario_maximum_proceeds_reverts() {
    let capped = AuctionConfig {
        maximum_proceeds: 150 * E18,
        ..config(true)
    };
    let mut h = Harness::new(capped);
    let root = h.state_root();
    let tick = h.spot_tick();

    assert!(matches!(
        h.buy(200 * E18, START),
        Err(AuctionError::MaximumProceedsReached { maximum, .. }) if maximum == 150 * E18
    ));
    assert_eq!(h.state_root(), root);
    assert_eq!(h.spot_tick(), tick);
    assert_eq!(h.auction().total_proceeds(), 0);

    // A smaller buy still fits under the cap
    h.buy(100 * E18, START).unwrap();
    assert!(h.auction().total_proceeds() <= 150 * E18);
}

#[test]
fn scenario_sell_below_floor_reverts() {
    let mut h = Harness::new(config(true));
    h.buy(10 * E18, START).unwrap();
    let root = h.state_root();

    // Far more asset than the pool can absorb above the floor
    assert!(matches!(
        h.sell(1_000 * E18, START + 1),
        Err(AuctionError::SwapBelowRange { floor_tick: 1_592, .. })
    ));
    assert_eq!(h.state_root(), root);
}

#[test]
fn scenario_full_sell_back_after_fast_sales() {
    for is_token0 in [true, false] {
        let mut h = Harness::new(AuctionConfig {
            maximum_proceeds: 100_000 * E18,
            ..config(is_token0)
        });
        let o = h.auction().config().orientation();

        // Ten quiet epochs drop the range, then demand runs well ahead of it
        let mut held = h.buy(20_000 * E18, epoch_start(11)).unwrap().report.entry.asset;
        let outcome = h.buy(E18, epoch_start(12)).unwrap();
        assert!(outcome.context.rebalanced);
        held += outcome.report.entry.asset;

        // The range chased the price, so proceeds no longer cover a buy-back
        // across the whole lower range and the lower slug sits at the
        // average clearing price
        let slugs = h.auction().slugs().clone();
        assert!(o.is_below(slugs.lower.ceiling(o), slugs.upper.floor(o)));
        assert_eq!(slugs.lower.width(), 8);
        assert!(slugs.is_contiguous(o));

        let sold = h.auction().total_tokens_sold();
        assert_eq!(held as i128, sold);
        let outcome = h.sell(held, epoch_start(12) + 1).unwrap();
        assert_eq!(outcome.report.entry.direction, SwapDirection::Sell);
        // Only the fee on the sell stays counted as sold
        assert!(h.auction().total_tokens_sold() < sold / 100);
        assert!(!o.is_below(h.spot_tick(), slugs.lower.floor(o)), "token0 {}", is_token0);
    }
}

#[test]
fn scenario_create_guards() {
    let mut h = Harness::new(config(true));

    assert_eq!(
        h.registry.create(AUTHORITY, key(true, 8), config(true), START - 1),
        Err(AuctionError::AlreadyInitialized(key(true, 8).id()))
    );
    let other = key(true, 16);
    assert_eq!(
        h.registry.create(STRANGER, other, config(true), START - 1),
        Err(AuctionError::Unauthorized {
            caller: STRANGER,
            expected: AUTHORITY,
        })
    );
    assert_eq!(h.registry.len(), 1);
}

#[test]
fn scenario_slugs_contiguous_across_rebalances() {
    for is_token0 in [true, false] {
        let mut h = Harness::new(config(is_token0));
        let o = h.auction().config().orientation();

        for epoch in 1..=6 {
            h.buy(5 * E18, epoch_start(epoch)).unwrap();
            let slugs = h.auction().slugs();
            assert!(slugs.is_contiguous(o), "epoch {} token0 {}", epoch, is_token0);
            let ceiling = h.auction().global_range().1;
            assert!(slugs.ceiling_gap(o, ceiling) < 3 * 8, "epoch {} token0 {}", epoch, is_token0);
            assert!(slugs.iter().all(|s| s.tick_lower <= s.tick_upper));
        }
    }
}

#[test]
fn scenario_mirrored_orientation() {
    let mut h = Harness::new(config(false));
    assert_eq!(h.spot_tick(), -1_600);

    // Asset is currency1: buying pays currency0 and pushes the tick down
    h.buy(110 * E18, START).unwrap();
    assert!(h.spot_tick() < -1_600);
    let sold = h.auction().total_tokens_sold();
    assert!(sold > 0);

    let outcome = h.buy(E18, epoch_start(2)).unwrap();
    assert!(outcome.context.rebalanced);
    let o = h.auction().config().orientation();
    let slugs = h.auction().slugs();
    assert!(slugs.is_contiguous(o));
    assert!(slugs.lower.liquidity > 0);
    assert!(h.auction().state().tick_accumulator > 0);

    let receipt = h
        .registry
        .migrate(&h.pool_id, AUTHORITY, RECIPIENT, END)
        .unwrap();
    assert!(receipt.total0() >= 111 * E18 - 1_000);
    assert!(h.auction().state().reserves.is_zero());
}
