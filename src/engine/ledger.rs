//! Sold and proceeds accounting.

use tracing::debug;

use super::error::AuctionError;
use super::gate::SwapDirection;
use crate::math::FEE_DENOMINATOR;
use crate::types::{AuctionState, BalanceDelta};

/// What one swap did to the totals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerEntry {
    pub direction: SwapDirection,
    /// Asset moved (out of the pool on a buy, into it on a sell)
    pub asset: u128,
    /// Numeraire moved (into the pool on a buy, out of it on a sell)
    pub numeraire: u128,
    /// LP fee charged on the input side
    pub fee: u128,
}

#[derive(Debug, Clone, Copy)]
pub struct ProceedsLedger {
    is_token0: bool,
    fee_pips: u32,
}

impl ProceedsLedger {
    pub fn new(is_token0: bool, fee_pips: u32) -> Self {
        Self { is_token0, fee_pips }
    }

    /// `ceil(amount_in * fee_pips / 1_000_000)`
    #[inline]
    pub fn fee_on(&self, amount_in: u128) -> u128 {
        amount_in
            .saturating_mul(self.fee_pips as u128)
            .div_ceil(FEE_DENOMINATOR as u128)
    }

    /// Fold a swapper-side delta into the totals.
    ///
    /// Buys add the asset received to `total_tokens_sold` and the
    /// numeraire paid, net of fee, to `total_proceeds`. Sells reverse
    /// that; proceeds never go below zero.
    pub fn record(&self, state: &mut AuctionState, delta: BalanceDelta) -> Result<LedgerEntry, AuctionError> {
        let asset = delta.amount(self.is_token0);
        let numeraire = delta.amount(!self.is_token0);

        let entry = if asset >= 0 && numeraire <= 0 {
            let paid = numeraire.unsigned_abs();
            let fee = self.fee_on(paid);
            state.total_tokens_sold = state
                .total_tokens_sold
                .checked_add(asset)
                .ok_or(AuctionError::MathOverflow)?;
            state.total_proceeds = state
                .total_proceeds
                .checked_add(paid - fee.min(paid))
                .ok_or(AuctionError::MathOverflow)?;
            LedgerEntry {
                direction: SwapDirection::Buy,
                asset: asset as u128,
                numeraire: paid,
                fee,
            }
        } else {
            let paid = asset.unsigned_abs();
            let fee = self.fee_on(paid);
            let net = i128::try_from(paid - fee.min(paid)).map_err(|_| AuctionError::MathOverflow)?;
            let received = numeraire.max(0) as u128;
            state.total_tokens_sold = state
                .total_tokens_sold
                .checked_sub(net)
                .ok_or(AuctionError::MathOverflow)?;
            state.total_proceeds = state.total_proceeds.saturating_sub(received);
            LedgerEntry {
                direction: SwapDirection::Sell,
                asset: paid,
                numeraire: received,
                fee,
            }
        };

        debug!(
            direction = ?entry.direction,
            asset = entry.asset,
            numeraire = entry.numeraire,
            fee = entry.fee,
            total_tokens_sold = state.total_tokens_sold,
            total_proceeds = state.total_proceeds,
            "swap recorded"
        );
        Ok(entry)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
