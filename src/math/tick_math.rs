//! Tick <-> Q64.96 sqrt price conversion.
//!
//! `get_sqrt_ratio_at_tick` is exact: it computes `sqrt(1.0001^tick) * 2^96`
//! with the canonical per-bit constants, rounding up. The inverse is a
//! binary search over that function, so the two agree on every tick.

use num_bigint::BigUint;
use num_traits::One;

use super::MathError;

pub const MIN_TICK: i32 = -887_272;
pub const MAX_TICK: i32 = 887_272;

/// `get_sqrt_ratio_at_tick(MIN_TICK)`
pub const MIN_SQRT_RATIO: u128 = 4_295_128_739;

/// `get_sqrt_ratio_at_tick(MAX_TICK)` as a decimal string (exceeds 128 bits)
pub const MAX_SQRT_RATIO: &str = "1461446703485210103287273052203988822378723970342";

/// `ratio * FACTORS[i] >> 128` for each set bit `1 << (i + 1)` of |tick|
const FACTORS: [u128; 19] = [
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x9aa508b5b7a84e1c677de54f3e99bc9,
    0x5d6af8dedb81196699c329225ee604,
    0x2216e584f5fa1ea926041bedfe98,
    0x48a170391f7dc42444e8fa2,
];

#[inline]
pub fn min_sqrt_ratio() -> BigUint {
    BigUint::from(MIN_SQRT_RATIO)
}

#[inline]
pub fn max_sqrt_ratio() -> BigUint {
    BigUint::parse_bytes(MAX_SQRT_RATIO.as_bytes(), 10).unwrap_or_default()
}

/// `sqrt(1.0001^tick) * 2^96`, rounded up
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<BigUint, MathError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::TickOutOfBounds(tick));
    }
    let abs_tick = tick.unsigned_abs();

    // Q128.128
    let mut ratio = if abs_tick & 0x1 != 0 {
        BigUint::from(0xfffcb933bd6fad37aa2d162d1a594001u128)
    } else {
        BigUint::one() << 128
    };

    for (i, factor) in FACTORS.iter().enumerate() {
        if abs_tick & (1 << (i + 1)) != 0 {
            ratio = (ratio * BigUint::from(*factor)) >> 128;
        }
    }

    if tick > 0 {
        let max = (BigUint::one() << 256) - 1u32;
        ratio = max / ratio;
    }

    // Q128.128 -> Q64.96, rounding up
    let remainder_mask = (BigUint::one() << 32) - 1u32;
    let round = if (&ratio & &remainder_mask) != BigUint::default() { 1u32 } else { 0u32 };
    Ok((ratio >> 32) + round)
}

/// Greatest tick whose sqrt ratio is `<= sqrt_price_x96`
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: &BigUint) -> Result<i32, MathError> {
    if *sqrt_price_x96 < min_sqrt_ratio() || *sqrt_price_x96 >= max_sqrt_ratio() {
        return Err(MathError::SqrtPriceOutOfBounds);
    }

    let mut lo = MIN_TICK;
    let mut hi = MAX_TICK;
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if get_sqrt_ratio_at_tick(mid)? <= *sqrt_price_x96 {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(lo)
}
