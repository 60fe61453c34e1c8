//! Liquidity ranges ("slugs") placed by the auction.
//!
//! Every slug is a single concentrated-liquidity position owned by the
//! auction. Ticks are stored in AMM orientation (`tick_lower < tick_upper`);
//! [`Slug::floor`] and [`Slug::ceiling`] give the edges in asset-price terms
//! so range logic reads the same whichever currency is sold.

use super::config::TickOrientation;

/// Which band a slug belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlugKind {
    /// Numeraire raised so far, below the anchor
    Lower,
    /// Asset due for the current epoch, just above the anchor
    Upper,
    /// Remaining inventory, spread up to the global ceiling
    PriceDiscovery(usize),
}

impl SlugKind {
    /// Position salt used when registering the slug with the AMM
    #[inline]
    pub fn salt(self) -> u32 {
        match self {
            SlugKind::Lower => 1,
            SlugKind::Upper => 2,
            SlugKind::PriceDiscovery(i) => 3 + i as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slug {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub salt: u32,
}

impl Slug {
    /// Build a slug from asset-price edges.
    pub fn new(kind: SlugKind, floor: i32, ceiling: i32, liquidity: u128, orientation: TickOrientation) -> Self {
        let (tick_lower, tick_upper) = orientation.amm_range(floor, ceiling);
        Self {
            tick_lower,
            tick_upper,
            liquidity,
            salt: kind.salt(),
        }
    }

    /// No liquidity to register (zero liquidity or zero width)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.liquidity == 0 || self.tick_lower == self.tick_upper
    }

    /// Edge quoting the cheapest asset price
    #[inline]
    pub fn floor(&self, orientation: TickOrientation) -> i32 {
        if orientation.is_token0() {
            self.tick_lower
        } else {
            self.tick_upper
        }
    }

    /// Edge quoting the dearest asset price
    #[inline]
    pub fn ceiling(&self, orientation: TickOrientation) -> i32 {
        if orientation.is_token0() {
            self.tick_upper
        } else {
            self.tick_lower
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.tick_upper - self.tick_lower
    }

    /// Same range with liquidity cleared
    #[inline]
    pub fn drained(&self) -> Self {
        Self { liquidity: 0, ..*self }
    }
}

/// The full set of slugs for one epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugSet {
    pub lower: Slug,
    pub upper: Slug,
    pub price_discovery: Vec<Slug>,
    /// Ceiling the price discovery band was laid out against
    pub ceiling_tick: i32,
}

impl SlugSet {
    /// Placeholder before the first placement: nothing registered.
    pub fn empty(tick: i32) -> Self {
        let blank = |kind: SlugKind| Slug {
            tick_lower: tick,
            tick_upper: tick,
            liquidity: 0,
            salt: kind.salt(),
        };
        Self {
            lower: blank(SlugKind::Lower),
            upper: blank(SlugKind::Upper),
            price_discovery: Vec::new(),
            ceiling_tick: tick,
        }
    }

    /// Lower, upper, then price discovery slugs in ascending price order
    pub fn iter(&self) -> impl Iterator<Item = &Slug> {
        std::iter::once(&self.lower)
            .chain(std::iter::once(&self.upper))
            .chain(self.price_discovery.iter())
    }

    /// Cheapest price the auction supports
    #[inline]
    pub fn floor(&self, orientation: TickOrientation) -> i32 {
        self.lower.floor(orientation)
    }

    /// Upper and price discovery slugs chain without gaps, and the lower
    /// slug ends at or under the upper slug's floor.
    ///
    /// The lower slug only sits under the anchor when proceeds are too
    /// thin to buy back everything sold across the full range.
    pub fn is_contiguous(&self, orientation: TickOrientation) -> bool {
        let chained: Vec<&Slug> = std::iter::once(&self.upper).chain(self.price_discovery.iter()).collect();
        let lower_fits = !orientation.is_below(self.upper.floor(orientation), self.lower.ceiling(orientation));
        lower_fits
            && chained
                .windows(2)
                .all(|pair| pair[0].ceiling(orientation) == pair[1].floor(orientation))
    }

    /// Distance in ticks between the last slug's ceiling and `ceiling`
    pub fn ceiling_gap(&self, orientation: TickOrientation, ceiling: i32) -> i64 {
        let last = self.price_discovery.last().unwrap_or(&self.upper);
        (orientation.price_space(last.ceiling(orientation)) - orientation.price_space(ceiling)).abs()
    }

    /// Total liquidity units registered across all slugs
    pub fn total_liquidity(&self) -> u128 {
        self.iter().map(|s| s.liquidity).sum()
    }

    /// Same ranges with every slug's liquidity cleared
    pub fn drained(&self) -> Self {
        Self {
            lower: self.lower.drained(),
            upper: self.upper.drained(),
            price_discovery: self.price_discovery.iter().map(Slug::drained).collect(),
            ceiling_tick: self.ceiling_tick,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
