//! Settlement receipt produced by a successful migration.
//!
//! The MigrationReceipt records everything handed to the recipient when an
//! auction is torn down, together with the final state root so the
//! settlement can be checked against the auction's history.

use num_bigint::BigUint;
use ssz_rs::prelude::*;

use super::pool::{Address, PoolId};

/// Outcome of migrating an auction's liquidity.
///
/// ## Amounts
///
/// `principal*` is the auction's balance net of collected LP fees; `fees*`
/// are the fees themselves. Both are in atomic units per pool currency.
///
/// ## Example
///
/// ```
/// use gda_engine::types::{Address, MigrationReceipt, PoolId};
/// use num_bigint::BigUint;
///
/// let receipt = MigrationReceipt::new(
///     PoolId([7u8; 32]),
///     Address::repeat_byte(0xBB),
///     &(BigUint::from(1u8) << 96),
///     (1_000, 3),
///     (500, 2),
///     [0u8; 32],
///     1_700_000_000,
/// );
/// assert_eq!(receipt.total0(), 1_003);
/// assert_eq!(receipt.sqrt_price_x96(), BigUint::from(1u8) << 96);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct MigrationReceipt {
    pub pool_id: [u8; 32],

    /// Account the balances were released to
    pub recipient: [u8; 20],

    /// Spot sqrt price after all positions were withdrawn (Q64.96, little-endian)
    pub sqrt_price_x96_le: [u8; 32],

    pub principal0: u128,
    pub fees0: u128,
    pub principal1: u128,
    pub fees1: u128,

    /// State root after migration (SHA-256, 32 bytes)
    pub state_root: [u8; 32],

    /// Migration timestamp in seconds
    pub timestamp: u64,
}

impl MigrationReceipt {
    /// Create a receipt
    ///
    /// # Arguments
    ///
    /// * `pool_id` - Pool the auction ran in
    /// * `recipient` - Receiver of principal and fees
    /// * `sqrt_price_x96` - Spot price after withdrawal
    /// * `(principal0, fees0)` - Currency0 settlement
    /// * `(principal1, fees1)` - Currency1 settlement
    /// * `state_root` - Final auction state root
    /// * `timestamp` - Time of migration
    pub fn new(
        pool_id: PoolId,
        recipient: Address,
        sqrt_price_x96: &BigUint,
        (principal0, fees0): (u128, u128),
        (principal1, fees1): (u128, u128),
        state_root: [u8; 32],
        timestamp: u64,
    ) -> Self {
        let mut sqrt_price_x96_le = [0u8; 32];
        let bytes = sqrt_price_x96.to_bytes_le();
        let len = bytes.len().min(32);
        sqrt_price_x96_le[..len].copy_from_slice(&bytes[..len]);

        Self {
            pool_id: pool_id.0,
            recipient: recipient.0,
            sqrt_price_x96_le,
            principal0,
            fees0,
            principal1,
            fees1,
            state_root,
            timestamp,
        }
    }

    /// Spot sqrt price as an integer
    pub fn sqrt_price_x96(&self) -> BigUint {
        BigUint::from_bytes_le(&self.sqrt_price_x96_le)
    }

    #[inline]
    pub fn recipient(&self) -> Address {
        Address(self.recipient)
    }

    #[inline]
    pub fn total0(&self) -> u128 {
        self.principal0.saturating_add(self.fees0)
    }

    #[inline]
    pub fn total1(&self) -> u128 {
        self.principal1.saturating_add(self.fees1)
    }

    /// Get the state root as a hex string
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
