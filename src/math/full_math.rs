//! Multiply-then-divide without intermediate overflow.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, ToPrimitive, Zero};

use super::MathError;

/// 2^96
#[inline]
pub fn q96() -> BigUint {
    BigUint::one() << 96
}

/// 2^128
#[inline]
pub fn q128() -> BigUint {
    BigUint::one() << 128
}

/// `floor(a * b / denominator)`
pub fn mul_div(a: &BigUint, b: &BigUint, denominator: &BigUint) -> Result<BigUint, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    Ok(a * b / denominator)
}

/// `ceil(a * b / denominator)`
pub fn mul_div_rounding_up(a: &BigUint, b: &BigUint, denominator: &BigUint) -> Result<BigUint, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    Ok(div_rounding_up(&(a * b), denominator))
}

/// `ceil(a / b)`; `b` must be non-zero
#[inline]
pub fn div_rounding_up(a: &BigUint, b: &BigUint) -> BigUint {
    let quotient = a / b;
    if (a % b).is_zero() {
        quotient
    } else {
        quotient + 1u32
    }
}

/// `floor(a * b / denominator)` on `u128`
pub fn mul_div_u128(a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    to_u128(mul_div(&BigUint::from(a), &BigUint::from(b), &BigUint::from(denominator))?)
}

#[inline]
pub fn to_u128(value: BigUint) -> Result<u128, MathError> {
    value.to_u128().ok_or(MathError::Overflow)
}

#[inline]
pub fn to_i128(value: &BigUint) -> Result<i128, MathError> {
    value.to_i128().ok_or(MathError::Overflow)
}

/// `(a - b) * liquidity / 2^128`, for fee growth deltas
pub fn fee_growth_to_amount(growth_delta: &BigInt, liquidity: u128) -> u128 {
    let owed: BigInt = (growth_delta * BigInt::from(liquidity)) >> 128;
    owed.to_u128().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_rounding() {
        let (a, b, d) = (BigUint::from(10u32), BigUint::from(10u32), BigUint::from(3u32));
        assert_eq!(mul_div(&a, &b, &d).unwrap(), BigUint::from(33u32));
        assert_eq!(mul_div_rounding_up(&a, &b, &d).unwrap(), BigUint::from(34u32));

        let exact = BigUint::from(4u32);
        assert_eq!(mul_div_rounding_up(&a, &exact, &BigUint::from(5u32)).unwrap(), BigUint::from(8u32));
    }

    #[test]
    fn test_mul_div_zero_denominator() {
        let one = BigUint::one();
        assert_eq!(mul_div(&one, &one, &BigUint::zero()), Err(MathError::DivisionByZero));
    }

    #[test]
    fn test_mul_div_u128_wide_intermediate() {
        // u128::MAX * 2 / 4 overflows u128 in the product only
        assert_eq!(mul_div_u128(u128::MAX, 2, 4).unwrap(), u128::MAX / 2);
        assert_eq!(mul_div_u128(u128::MAX, 2, 1), Err(MathError::Overflow));
    }

    #[test]
    fn test_fee_growth_to_amount() {
        let growth = BigInt::from(3u8) << 128;
        assert_eq!(fee_growth_to_amount(&growth, 5), 15);
        assert_eq!(fee_growth_to_amount(&BigInt::from(-1), 5), 0);
    }
}
