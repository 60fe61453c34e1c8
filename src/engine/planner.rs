//! Epoch-boundary price trajectory.
//!
//! ## Overview
//!
//! The auction price starts at `starting_tick` and may walk down to
//! `ending_tick` in steps of at most `gamma` ticks per epoch. How far it
//! walks each epoch depends on sales against a linear schedule:
//!
//! ```text
//! net sold this epoch <= 0        → full step down (gamma per elapsed epoch)
//! sold <= expected                → partial step, scaled by the shortfall
//! sold >  expected                → follow the spot price back up (capped)
//! ```
//!
//! The accumulated move is kept WAD-scaled in AMM orientation. It never
//! rises above the starting point and never sinks past the ending tick.

use super::epoch::EpochClock;
use super::error::AuctionError;
use crate::math::full_math::mul_div_u128;
use crate::types::{AuctionConfig, AuctionState, TickOrientation, WAD};

/// Result of planning one rebalance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trajectory {
    /// Epoch the plan is for
    pub epoch: u64,
    pub epochs_passed: u64,
    /// New accumulator value (WAD, AMM orientation)
    pub tick_accumulator: i128,
    /// Cheapest tick of the global range
    pub floor_tick: i32,
    /// Dearest tick of the global range
    pub ceiling_tick: i32,
    /// Tick the spot price is moved to; boundary between lower and upper slugs
    pub anchor_tick: i32,
    pub expected_sold: u128,
    pub net_sold: i128,
}

#[derive(Debug, Clone, Copy)]
pub struct PriceTrajectoryPlanner {
    config: AuctionConfig,
    clock: EpochClock,
    tick_spacing: i32,
}

impl PriceTrajectoryPlanner {
    pub fn new(config: AuctionConfig, tick_spacing: i32) -> Self {
        Self {
            clock: EpochClock::new(&config),
            config,
            tick_spacing,
        }
    }

    #[inline]
    fn orientation(&self) -> TickOrientation {
        self.config.orientation()
    }

    /// Width of the upper slug: one epoch's share of gamma, at least one spacing
    pub fn upper_slug_range(&self) -> i32 {
        let per_epoch = self.config.gamma as u64 / self.clock.total_epochs().max(1);
        let aligned = (per_epoch as i32 / self.tick_spacing) * self.tick_spacing;
        aligned.max(self.tick_spacing)
    }

    /// Tokens the linear schedule expects sold by `at`
    pub fn expected_sold_at(&self, at: u64) -> Result<u128, AuctionError> {
        Ok(self.clock.linear_share(self.config.num_tokens_to_sell, at)?)
    }

    /// `(floor, ceiling)` of the global range for an accumulator value
    pub fn global_range(&self, tick_accumulator: i128) -> (i32, i32) {
        let o = self.orientation();
        let shift = (tick_accumulator / WAD) as i32;
        let floor = o.align(self.config.starting_tick + shift, self.tick_spacing);
        let ceiling = o.align(o.raise(floor, self.config.gamma), self.tick_spacing);
        (floor, ceiling)
    }

    /// Placement used when the auction is created
    pub fn initial(&self) -> Trajectory {
        let (floor_tick, ceiling_tick) = self.global_range(0);
        Trajectory {
            epoch: 1,
            epochs_passed: 0,
            tick_accumulator: 0,
            floor_tick,
            ceiling_tick,
            anchor_tick: floor_tick,
            expected_sold: 0,
            net_sold: 0,
        }
    }

    /// Plan the rebalance for the epoch containing `now`.
    ///
    /// # Arguments
    ///
    /// * `state` - Current auction state (not modified)
    /// * `spot_tick` - Pool tick before the rebalance
    /// * `expected_ceiling` - Ceiling of the current upper slug
    /// * `now` - Current time
    pub fn plan(
        &self,
        state: &AuctionState,
        spot_tick: i32,
        expected_ceiling: i32,
        now: u64,
    ) -> Result<Trajectory, AuctionError> {
        let o = self.orientation();
        let epoch = self
            .clock
            .epoch_of(now)
            .ok_or(AuctionError::CannotSwapBeforeStartTime {
                now,
                starting_time: self.config.starting_time,
            })?;
        let epochs_passed = epoch.saturating_sub(state.last_epoch);

        let expected_sold = self.expected_sold_at(now)?;
        let sold = state.total_tokens_sold;
        let net_sold = sold - state.total_tokens_sold_last_epoch;

        let max_step_ticks = (self.config.gamma as i128)
            .checked_mul(epochs_passed as i128)
            .ok_or(AuctionError::MathOverflow)?;
        let max_step = max_step_ticks.checked_mul(WAD).ok_or(AuctionError::MathOverflow)?;

        // Signed move in price space, WAD-scaled
        let delta = if net_sold <= 0 {
            -max_step
        } else if sold <= expected_sold as i128 {
            let sold_ratio = if sold <= 0 {
                0
            } else {
                mul_div_u128(sold as u128, WAD as u128, expected_sold)? as i128
            };
            -(max_step_ticks * (WAD - sold_ratio))
        } else {
            let run = o.price_space(spot_tick) - o.price_space(expected_ceiling);
            (run.max(0) as i128 * WAD).min(max_step)
        };

        let accumulator = o.sign() * state.tick_accumulator;
        let lowest = -(self.config.tick_delta() as i128) * WAD;
        let next_accumulator = (accumulator + delta).clamp(lowest, 0);
        let applied = next_accumulator - accumulator;
        let tick_accumulator = o.sign() * next_accumulator;

        let (floor_tick, ceiling_tick) = self.global_range(tick_accumulator);
        let shifted = if applied < 0 {
            o.raise(spot_tick, (applied / WAD) as i32)
        } else {
            spot_tick
        };
        let anchor_tick = o.max(o.align(shifted, self.tick_spacing), floor_tick);

        Ok(Trajectory {
            epoch,
            epochs_passed,
            tick_accumulator,
            floor_tick,
            ceiling_tick,
            anchor_tick,
            expected_sold,
            net_sold,
        })
    }

    /// Record a planned rebalance in the auction state
    pub fn apply(&self, state: &mut AuctionState, trajectory: &Trajectory) {
        state.tick_accumulator = trajectory.tick_accumulator;
        state.total_tokens_sold_last_epoch = state.total_tokens_sold;
        state.last_epoch = trajectory.epoch;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
