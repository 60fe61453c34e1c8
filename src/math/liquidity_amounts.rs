//! Liquidity from token amounts and back, always rounding down.

use num_bigint::BigUint;

use super::full_math::to_u128;
use super::sqrt_price_math::{get_amount0_delta, get_amount1_delta};
use super::MathError;

/// Liquidity a range `[sqrt_a, sqrt_b]` supports with `amount0` of `currency0`
///
/// `amount0 * floor(sqrt_a * sqrt_b / 2^96) / (sqrt_b - sqrt_a)`
pub fn get_liquidity_for_amount0(sqrt_a: &BigUint, sqrt_b: &BigUint, amount0: u128) -> Result<u128, MathError> {
    let (lo, hi) = if sqrt_a <= sqrt_b { (sqrt_a, sqrt_b) } else { (sqrt_b, sqrt_a) };
    if lo == hi {
        return Ok(0);
    }

    let intermediate = (lo * hi) >> 96;
    to_u128(BigUint::from(amount0) * intermediate / (hi - lo))
}

/// Liquidity a range `[sqrt_a, sqrt_b]` supports with `amount1` of `currency1`
///
/// `amount1 * 2^96 / (sqrt_b - sqrt_a)`
pub fn get_liquidity_for_amount1(sqrt_a: &BigUint, sqrt_b: &BigUint, amount1: u128) -> Result<u128, MathError> {
    let (lo, hi) = if sqrt_a <= sqrt_b { (sqrt_a, sqrt_b) } else { (sqrt_b, sqrt_a) };
    if lo == hi {
        return Ok(0);
    }

    to_u128((BigUint::from(amount1) << 96) / (hi - lo))
}

/// Token amounts held by `liquidity` in `[sqrt_a, sqrt_b]` at `sqrt_price`
pub fn get_amounts_for_liquidity(
    sqrt_price: &BigUint,
    sqrt_a: &BigUint,
    sqrt_b: &BigUint,
    liquidity: u128,
) -> Result<(u128, u128), MathError> {
    let (lo, hi) = if sqrt_a <= sqrt_b { (sqrt_a, sqrt_b) } else { (sqrt_b, sqrt_a) };

    if sqrt_price <= lo {
        Ok((to_u128(get_amount0_delta(lo, hi, liquidity, false))?, 0))
    } else if sqrt_price < hi {
        Ok((
            to_u128(get_amount0_delta(sqrt_price, hi, liquidity, false))?,
            to_u128(get_amount1_delta(lo, sqrt_price, liquidity, false))?,
        ))
    } else {
        Ok((0, to_u128(get_amount1_delta(lo, hi, liquidity, false))?))
    }
}
