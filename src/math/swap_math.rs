//! One exact-input swap step inside a single liquidity band.

use num_bigint::BigUint;
use num_traits::Zero;

use super::full_math::mul_div_rounding_up;
use super::sqrt_price_math::{get_amount0_delta, get_amount1_delta, get_next_sqrt_price_from_input};
use super::MathError;

/// Fee denominator: fees are in pips (1_000_000 = 100%)
pub const FEE_DENOMINATOR: u32 = 1_000_000;

/// Result of one swap step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapStep {
    pub sqrt_price_next: BigUint,
    pub amount_in: BigUint,
    pub amount_out: BigUint,
    pub fee_amount: BigUint,
}

/// Swap `amount_remaining` of input from `sqrt_current` toward `sqrt_target`.
///
/// Direction is implied by the prices: moving down means `currency0` in.
/// The step stops at the target or when the input runs out, whichever
/// comes first. If it stops short, whatever input is left after
/// `amount_in` is charged as fee so `amount_in + fee_amount` never exceeds
/// `amount_remaining`.
pub fn compute_swap_step(
    sqrt_current: &BigUint,
    sqrt_target: &BigUint,
    liquidity: u128,
    amount_remaining: &BigUint,
    fee_pips: u32,
) -> Result<SwapStep, MathError> {
    if fee_pips >= FEE_DENOMINATOR {
        return Err(MathError::DivisionByZero);
    }
    let zero_for_one = sqrt_current >= sqrt_target;
    let fee_complement = BigUint::from(FEE_DENOMINATOR - fee_pips);
    let remaining_less_fee = amount_remaining * &fee_complement / BigUint::from(FEE_DENOMINATOR);

    let amount_to_target = if zero_for_one {
        get_amount0_delta(sqrt_target, sqrt_current, liquidity, true)
    } else {
        get_amount1_delta(sqrt_current, sqrt_target, liquidity, true)
    };

    let sqrt_price_next = if remaining_less_fee >= amount_to_target {
        sqrt_target.clone()
    } else {
        get_next_sqrt_price_from_input(sqrt_current, liquidity, &remaining_less_fee, zero_for_one)
    };
    let reached_target = &sqrt_price_next == sqrt_target;

    let amount_in = if reached_target {
        amount_to_target
    } else if zero_for_one {
        get_amount0_delta(&sqrt_price_next, sqrt_current, liquidity, true)
    } else {
        get_amount1_delta(sqrt_current, &sqrt_price_next, liquidity, true)
    };

    let amount_out = if zero_for_one {
        get_amount1_delta(&sqrt_price_next, sqrt_current, liquidity, false)
    } else {
        get_amount0_delta(sqrt_current, &sqrt_price_next, liquidity, false)
    };

    let headroom = if *amount_remaining >= amount_in {
        amount_remaining - &amount_in
    } else {
        BigUint::zero()
    };
    let fee_amount = if reached_target {
        let fee = mul_div_rounding_up(&amount_in, &BigUint::from(fee_pips), &fee_complement)?;
        fee.min(headroom)
    } else {
        headroom
    };

    Ok(SwapStep {
        sqrt_price_next,
        amount_in,
        amount_out,
        fee_amount,
    })
}
