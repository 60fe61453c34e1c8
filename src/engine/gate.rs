//! Swap admission and post-swap bounds.
//!
//! ## Phases
//!
//! ```text
//! NotStarted ──► Active ──► EndedInsufficientProceeds   (sells only)
//!                     └───► EndedSufficientProceeds ──► Migrated
//! ```

use num_bigint::BigUint;

use super::epoch::EpochClock;
use super::error::{AuctionError, MigrationBlocker};
use crate::math::get_sqrt_ratio_at_tick;
use crate::types::{AuctionConfig, AuctionState};

/// Lifecycle phase of an auction at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuctionPhase {
    NotStarted,
    Active,
    EndedInsufficientProceeds,
    EndedSufficientProceeds,
    Migrated,
}

/// Side of a swap from the asset's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapDirection {
    /// Numeraire in, asset out
    Buy,
    /// Asset in, numeraire out
    Sell,
}

impl SwapDirection {
    /// Classify a pool swap
    ///
    /// # Example
    ///
    /// ```
    /// use gda_engine::engine::SwapDirection;
    ///
    /// // Asset is currency0: paying currency0 in is a sell
    /// assert_eq!(SwapDirection::of(true, true), SwapDirection::Sell);
    /// assert_eq!(SwapDirection::of(false, true), SwapDirection::Buy);
    /// ```
    #[inline]
    pub fn of(zero_for_one: bool, is_token0: bool) -> Self {
        if zero_for_one == is_token0 {
            SwapDirection::Sell
        } else {
            SwapDirection::Buy
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SwapGate {
    config: AuctionConfig,
    clock: EpochClock,
}

impl SwapGate {
    pub fn new(config: AuctionConfig) -> Self {
        Self {
            clock: EpochClock::new(&config),
            config,
        }
    }

    pub fn phase(&self, state: &AuctionState, now: u64) -> AuctionPhase {
        if state.migrated {
            AuctionPhase::Migrated
        } else if !self.clock.has_started(now) {
            AuctionPhase::NotStarted
        } else if !self.clock.has_ended(now) {
            AuctionPhase::Active
        } else if state.total_proceeds < self.config.minimum_proceeds {
            AuctionPhase::EndedInsufficientProceeds
        } else {
            AuctionPhase::EndedSufficientProceeds
        }
    }

    /// Admission check run before the pool executes a swap
    pub fn check_before_swap(&self, state: &AuctionState, now: u64, direction: SwapDirection) -> Result<(), AuctionError> {
        let proceeds = state.total_proceeds;
        let minimum = self.config.minimum_proceeds;
        match self.phase(state, now) {
            AuctionPhase::NotStarted => Err(AuctionError::CannotSwapBeforeStartTime {
                now,
                starting_time: self.config.starting_time,
            }),
            AuctionPhase::Active => Ok(()),
            AuctionPhase::EndedInsufficientProceeds => match direction {
                SwapDirection::Sell => Ok(()),
                SwapDirection::Buy => {
                    Err(AuctionError::InvalidSwapAfterMaturityInsufficientProceeds { proceeds, minimum })
                }
            },
            AuctionPhase::EndedSufficientProceeds | AuctionPhase::Migrated => {
                Err(AuctionError::InvalidSwapAfterMaturitySufficientProceeds { proceeds, minimum })
            }
        }
    }

    /// Whether `now` opens an epoch that has not been rebalanced yet
    #[inline]
    pub fn rebalance_due(&self, state: &AuctionState, now: u64) -> bool {
        if !self.clock.has_started(now) || self.clock.has_ended(now) {
            return false;
        }
        self.clock
            .epoch_of(now)
            .map_or(false, |epoch| epoch > state.last_epoch)
    }

    /// Bounds check run after the ledger recorded the swap.
    ///
    /// # Arguments
    ///
    /// * `phase` - Phase the swap was admitted in
    /// * `spot` - Pool sqrt price and tick after the swap
    /// * `floor_tick` - Floor of the lower slug
    pub fn check_after_swap(
        &self,
        state: &AuctionState,
        phase: AuctionPhase,
        direction: SwapDirection,
        spot: (&BigUint, i32),
        floor_tick: i32,
    ) -> Result<(), AuctionError> {
        if direction == SwapDirection::Buy && state.total_proceeds > self.config.maximum_proceeds {
            return Err(AuctionError::MaximumProceedsReached {
                proceeds: state.total_proceeds,
                maximum: self.config.maximum_proceeds,
            });
        }

        if phase != AuctionPhase::Active {
            return Ok(());
        }
        let (sqrt_price, tick) = spot;
        let floor_sqrt = get_sqrt_ratio_at_tick(floor_tick)?;
        let below = if self.config.is_token0 {
            *sqrt_price < floor_sqrt
        } else {
            *sqrt_price > floor_sqrt
        };
        if below {
            return Err(AuctionError::SwapBelowRange { tick, floor_tick });
        }
        Ok(())
    }

    /// Preconditions for migration, apart from authorization
    pub fn check_migration(&self, state: &AuctionState, now: u64) -> Result<(), MigrationBlocker> {
        if state.migrated {
            return Err(MigrationBlocker::AlreadyMigrated);
        }
        if !self.clock.has_ended(now) {
            return Err(MigrationBlocker::AuctionNotEnded {
                now,
                ending_time: self.config.ending_time,
            });
        }
        if state.total_proceeds < self.config.minimum_proceeds {
            return Err(MigrationBlocker::InsufficientProceeds {
                proceeds: state.total_proceeds,
                minimum: self.config.minimum_proceeds,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
