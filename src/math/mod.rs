//! Fixed-point math for concentrated liquidity.
//!
//! ## Overview
//!
//! Prices are Q64.96 square roots (`sqrt(price) * 2^96`) and fee growth is
//! Q128. Intermediates can exceed 256 bits, so everything here works on
//! `num_bigint::BigUint` and converts back to `u128` at the edges.
//!
//! ## Rounding
//!
//! Amounts a caller pays round up; amounts a caller receives and liquidity
//! derived from amounts round down. Every rounding decision favours the
//! pool and the auction.

pub mod full_math;
pub mod liquidity_amounts;
pub mod sqrt_price_math;
pub mod swap_math;
pub mod tick_math;

use thiserror::Error;

pub use full_math::{mul_div, mul_div_rounding_up, q96, to_i128, to_u128};
pub use liquidity_amounts::{get_amounts_for_liquidity, get_liquidity_for_amount0, get_liquidity_for_amount1};
pub use sqrt_price_math::{get_amount0_delta, get_amount1_delta, get_next_sqrt_price_from_input};
pub use swap_math::{compute_swap_step, SwapStep, FEE_DENOMINATOR};
pub use tick_math::{
    get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, max_sqrt_ratio, min_sqrt_ratio, MAX_TICK, MIN_TICK,
};

/// Numeric failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MathError {
    #[error("tick {0} is outside the supported range")]
    TickOutOfBounds(i32),

    #[error("sqrt price outside the supported range")]
    SqrtPriceOutOfBounds,

    #[error("division by zero")]
    DivisionByZero,

    #[error("value does not fit in 128 bits")]
    Overflow,
}
