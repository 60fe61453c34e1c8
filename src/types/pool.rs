//! Pool identity and token accounting types.
//!
//! ## Currencies
//!
//! A pool trades two currencies. By convention `currency0` sorts before
//! `currency1`; whether the auctioned asset is `currency0` fixes the sign
//! convention of ticks for the whole auction.
//!
//! ## Balance Deltas
//!
//! A [`BalanceDelta`] is always expressed from the caller's point of view:
//! - **Negative**: the caller pays the pool
//! - **Positive**: the caller receives from the pool

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

use sha2::{Digest, Sha256};

// ============================================================================
// Address
// ============================================================================

/// A 20-byte account or token identifier.
///
/// ## Example
///
/// ```
/// use gda_engine::types::Address;
///
/// let a = Address::repeat_byte(0x11);
/// assert_eq!(a.to_string(), format!("0x{}", "11".repeat(20)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address
    pub const ZERO: Address = Address([0u8; 20]);

    /// Build an address whose bytes are all `byte`
    pub const fn repeat_byte(byte: u8) -> Self {
        Address([byte; 20])
    }

    /// Raw bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ============================================================================
// PoolKey / PoolId
// ============================================================================

/// 32-byte pool identifier (SHA-256 of the pool key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PoolId(pub [u8; 32]);

impl PoolId {
    /// Raw bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Immutable description of a pool.
///
/// `fee` is expressed in hundredths of a basis point (pips, 1_000_000 = 100%).
/// `hooks` is the address of the liquidity hook that owns the auction
/// positions in this pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub currency0: Address,
    pub currency1: Address,
    pub fee: u32,
    pub tick_spacing: i32,
    pub hooks: Address,
}

impl PoolKey {
    /// Create a pool key, sorting the two currencies.
    pub fn new(currency_a: Address, currency_b: Address, fee: u32, tick_spacing: i32, hooks: Address) -> Self {
        let (currency0, currency1) = if currency_a <= currency_b {
            (currency_a, currency_b)
        } else {
            (currency_b, currency_a)
        };
        Self { currency0, currency1, fee, tick_spacing, hooks }
    }

    /// Deterministic pool identifier
    pub fn id(&self) -> PoolId {
        let mut hasher = Sha256::new();
        hasher.update(self.currency0.as_bytes());
        hasher.update(self.currency1.as_bytes());
        hasher.update(self.fee.to_le_bytes());
        hasher.update(self.tick_spacing.to_le_bytes());
        hasher.update(self.hooks.as_bytes());

        let mut id = [0u8; 32];
        id.copy_from_slice(&hasher.finalize());
        PoolId(id)
    }
}

// ============================================================================
// BalanceDelta
// ============================================================================

/// Signed token movement for one pool operation (caller's point of view).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BalanceDelta {
    pub amount0: i128,
    pub amount1: i128,
}

impl BalanceDelta {
    pub const ZERO: BalanceDelta = BalanceDelta { amount0: 0, amount1: 0 };

    pub const fn new(amount0: i128, amount1: i128) -> Self {
        Self { amount0, amount1 }
    }

    /// Amount for one side of the pool
    #[inline]
    pub fn amount(&self, currency0: bool) -> i128 {
        if currency0 {
            self.amount0
        } else {
            self.amount1
        }
    }
}

impl Add for BalanceDelta {
    type Output = BalanceDelta;

    fn add(self, rhs: BalanceDelta) -> BalanceDelta {
        BalanceDelta::new(self.amount0 + rhs.amount0, self.amount1 + rhs.amount1)
    }
}

impl AddAssign for BalanceDelta {
    fn add_assign(&mut self, rhs: BalanceDelta) {
        self.amount0 += rhs.amount0;
        self.amount1 += rhs.amount1;
    }
}

impl Sub for BalanceDelta {
    type Output = BalanceDelta;

    fn sub(self, rhs: BalanceDelta) -> BalanceDelta {
        BalanceDelta::new(self.amount0 - rhs.amount0, self.amount1 - rhs.amount1)
    }
}

impl Neg for BalanceDelta {
    type Output = BalanceDelta;

    fn neg(self) -> BalanceDelta {
        BalanceDelta::new(-self.amount0, -self.amount1)
    }
}

// ============================================================================
// TokenAmounts
// ============================================================================

/// Unsigned per-currency balances (reserves, accrued fees).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenAmounts {
    pub amount0: u128,
    pub amount1: u128,
}

/// A debit that would take a balance below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub currency0: bool,
    pub needed: u128,
    pub available: u128,
}

impl TokenAmounts {
    pub const fn new(amount0: u128, amount1: u128) -> Self {
        Self { amount0, amount1 }
    }

    #[inline]
    pub fn get(&self, currency0: bool) -> u128 {
        if currency0 {
            self.amount0
        } else {
            self.amount1
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.amount0 == 0 && self.amount1 == 0
    }

    /// Apply a caller-side delta: positive amounts are credited, negative
    /// amounts debited. Either both sides apply or neither does.
    pub fn apply(&mut self, delta: BalanceDelta) -> Result<(), Shortfall> {
        let amount0 = Self::apply_one(self.amount0, delta.amount0, true)?;
        let amount1 = Self::apply_one(self.amount1, delta.amount1, false)?;
        self.amount0 = amount0;
        self.amount1 = amount1;
        Ok(())
    }

    /// Add non-negative parts of a delta (used for collected fees)
    pub fn accrue(&mut self, delta: BalanceDelta) {
        self.amount0 = self.amount0.saturating_add(delta.amount0.max(0) as u128);
        self.amount1 = self.amount1.saturating_add(delta.amount1.max(0) as u128);
    }

    fn apply_one(balance: u128, delta: i128, currency0: bool) -> Result<u128, Shortfall> {
        if delta >= 0 {
            return Ok(balance.saturating_add(delta as u128));
        }
        let needed = delta.unsigned_abs();
        balance.checked_sub(needed).ok_or(Shortfall {
            currency0,
            needed,
            available: balance,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
