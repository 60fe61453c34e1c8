//! Immutable auction parameters and tick orientation.
//!
//! ## Orientation
//!
//! AMM ticks grow with the price of `currency0` in units of `currency1`.
//! When the auctioned asset is `currency1` (`is_token0 == false`) a higher
//! tick means a *cheaper* asset. [`TickOrientation`] hides that sign flip:
//! the engine reasons in "price space", where larger always means a dearer
//! asset, and converts back at the AMM boundary.

/// Maximum pool tick spacing accepted by the auction
pub const MAX_TICK_SPACING: i32 = 30;

/// Maximum number of price discovery slugs
pub const MAX_PRICE_DISCOVERY_SLUGS: usize = 10;

/// Fixed-point scale of the tick accumulator (1e18)
pub const WAD: i128 = 1_000_000_000_000_000_000;

/// Parameters fixed for the lifetime of an auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuctionConfig {
    /// Total asset supply offered, in atomic units
    pub num_tokens_to_sell: u128,
    /// Proceeds (numeraire) below which the auction fails at maturity
    pub minimum_proceeds: u128,
    /// Proceeds cap; buys that exceed it revert
    pub maximum_proceeds: u128,
    pub starting_time: u64,
    pub ending_time: u64,
    pub starting_tick: i32,
    pub ending_tick: i32,
    /// Seconds per epoch
    pub epoch_length: u64,
    /// Maximum tick move per epoch
    pub gamma: i32,
    /// Whether the asset is `currency0` of the pool
    pub is_token0: bool,
    pub num_price_discovery_slugs: usize,
}

impl AuctionConfig {
    /// Length of the auction window in seconds
    #[inline]
    pub fn duration(&self) -> u64 {
        self.ending_time.saturating_sub(self.starting_time)
    }

    /// Number of epochs in the auction window (0 when `epoch_length` is 0)
    #[inline]
    pub fn total_epochs(&self) -> u64 {
        self.duration().checked_div(self.epoch_length).unwrap_or(0)
    }

    /// Total tick distance the trajectory may travel
    #[inline]
    pub fn tick_delta(&self) -> i64 {
        (self.ending_tick as i64 - self.starting_tick as i64).abs()
    }

    #[inline]
    pub fn orientation(&self) -> TickOrientation {
        TickOrientation::new(self.is_token0)
    }
}

/// Sign convention between AMM ticks and asset price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOrientation {
    is_token0: bool,
}

impl TickOrientation {
    pub const fn new(is_token0: bool) -> Self {
        Self { is_token0 }
    }

    #[inline]
    pub fn is_token0(self) -> bool {
        self.is_token0
    }

    /// +1 when AMM ticks and asset price move together, -1 otherwise
    #[inline]
    pub fn sign(self) -> i128 {
        if self.is_token0 {
            1
        } else {
            -1
        }
    }

    /// Move `tick` by `by` ticks toward a higher asset price
    #[inline]
    pub fn raise(self, tick: i32, by: i32) -> i32 {
        if self.is_token0 {
            tick + by
        } else {
            tick - by
        }
    }

    /// Move `tick` by `by` ticks toward a lower asset price
    #[inline]
    pub fn lower(self, tick: i32, by: i32) -> i32 {
        self.raise(tick, -by)
    }

    /// Tick expressed so that larger means a dearer asset
    #[inline]
    pub fn price_space(self, tick: i32) -> i64 {
        if self.is_token0 {
            tick as i64
        } else {
            -(tick as i64)
        }
    }

    /// `a` quotes a cheaper asset than `b`
    #[inline]
    pub fn is_below(self, a: i32, b: i32) -> bool {
        self.price_space(a) < self.price_space(b)
    }

    /// The dearer (in asset terms) of two ticks
    #[inline]
    pub fn max(self, a: i32, b: i32) -> i32 {
        if self.is_below(a, b) {
            b
        } else {
            a
        }
    }

    /// Round `tick` to a multiple of `spacing`, toward the lower asset price.
    ///
    /// # Example
    ///
    /// ```
    /// use gda_engine::types::TickOrientation;
    ///
    /// assert_eq!(TickOrientation::new(true).align(13, 8), 8);
    /// assert_eq!(TickOrientation::new(true).align(-3, 8), -8);
    /// assert_eq!(TickOrientation::new(false).align(13, 8), 16);
    /// assert_eq!(TickOrientation::new(false).align(-3, 8), 0);
    /// ```
    #[inline]
    pub fn align(self, tick: i32, spacing: i32) -> i32 {
        if self.is_token0 {
            tick.div_euclid(spacing) * spacing
        } else {
            -((-tick).div_euclid(spacing) * spacing)
        }
    }

    /// AMM `(tick_lower, tick_upper)` for a range given as `(floor, ceiling)`
    /// in asset-price terms
    #[inline]
    pub fn amm_range(self, floor: i32, ceiling: i32) -> (i32, i32) {
        if self.is_token0 {
            (floor, ceiling)
        } else {
            (ceiling, floor)
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
