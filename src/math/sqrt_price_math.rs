//! Token amounts between two sqrt prices for a given liquidity.

use num_bigint::BigUint;
use num_traits::Zero;

use super::full_math::{div_rounding_up, q96};

#[inline]
fn ordered<'a>(a: &'a BigUint, b: &'a BigUint) -> (&'a BigUint, &'a BigUint) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// `liquidity * (sqrt_b - sqrt_a) / (sqrt_a * sqrt_b)` scaled by 2^96
///
/// Amount of `currency0` needed to move between the two prices.
pub fn get_amount0_delta(sqrt_a: &BigUint, sqrt_b: &BigUint, liquidity: u128, round_up: bool) -> BigUint {
    let (lo, hi) = ordered(sqrt_a, sqrt_b);
    if liquidity == 0 || lo.is_zero() || lo == hi {
        return BigUint::zero();
    }

    let numerator = (BigUint::from(liquidity) << 96) * (hi - lo);
    if round_up {
        div_rounding_up(&div_rounding_up(&numerator, hi), lo)
    } else {
        numerator / hi / lo
    }
}

/// `liquidity * (sqrt_b - sqrt_a)` scaled down by 2^96
///
/// Amount of `currency1` needed to move between the two prices.
pub fn get_amount1_delta(sqrt_a: &BigUint, sqrt_b: &BigUint, liquidity: u128, round_up: bool) -> BigUint {
    let (lo, hi) = ordered(sqrt_a, sqrt_b);
    if liquidity == 0 || lo == hi {
        return BigUint::zero();
    }

    let product = BigUint::from(liquidity) * (hi - lo);
    if round_up {
        div_rounding_up(&product, &q96())
    } else {
        product >> 96
    }
}

/// Sqrt price reached after adding `amount_in` of the input currency.
///
/// Rounds so the price never overshoots what the input pays for:
/// up when `currency0` comes in, down when `currency1` comes in.
/// `liquidity` must be non-zero.
pub fn get_next_sqrt_price_from_input(
    sqrt_price: &BigUint,
    liquidity: u128,
    amount_in: &BigUint,
    zero_for_one: bool,
) -> BigUint {
    if amount_in.is_zero() || liquidity == 0 {
        return sqrt_price.clone();
    }

    let liquidity_x96 = BigUint::from(liquidity) << 96;
    if zero_for_one {
        let denominator = &liquidity_x96 + amount_in * sqrt_price;
        div_rounding_up(&(&liquidity_x96 * sqrt_price), &denominator)
    } else {
        sqrt_price + (amount_in << 96) / BigUint::from(liquidity)
    }
}
