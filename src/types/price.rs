//! Human-readable amounts and prices.
//!
//! ## Overview
//!
//! The engine works in atomic token units (`u128`) and Q64.96 sqrt prices.
//! This module converts those to and from `rust_decimal::Decimal` for the
//! settings file and for reporting. No floating point is involved, so the
//! same input always renders the same way.
//!
//! ## Examples
//!
//! ```
//! use gda_engine::types::price::{to_atomic, from_atomic_trimmed};
//!
//! // 1.5 tokens with 18 decimals
//! let amount = to_atomic("1.5", 18).unwrap();
//! assert_eq!(amount, 1_500_000_000_000_000_000);
//! assert_eq!(from_atomic_trimmed(amount, 18).unwrap(), "1.5");
//! ```

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Decimal places used when rendering prices
pub const PRICE_DECIMALS: u32 = 18;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert a decimal string to atomic units
///
/// # Arguments
///
/// * `s` - Decimal string (e.g., "100.25")
/// * `decimals` - Token decimals
///
/// # Returns
///
/// * `Some(u128)` - The atomic amount (fractional dust below one unit is dropped)
/// * `None` - If parsing fails, the value is negative, or it is out of range
///
/// # Example
///
/// ```
/// use gda_engine::types::price::to_atomic;
///
/// assert_eq!(to_atomic("1", 6), Some(1_000_000));
/// assert_eq!(to_atomic("0.0000001", 6), Some(0));
/// assert_eq!(to_atomic("-1", 6), None);
/// ```
pub fn to_atomic(s: &str, decimals: u32) -> Option<u128> {
    let decimal = Decimal::from_str(s.trim()).ok()?;
    decimal_to_atomic(decimal, decimals)
}

/// Convert a Decimal to atomic units
pub fn decimal_to_atomic(d: Decimal, decimals: u32) -> Option<u128> {
    if d.is_sign_negative() {
        return None;
    }

    let unit = Decimal::from_u128(10u128.checked_pow(decimals)?)?;
    let scaled = d.checked_mul(unit)?;
    scaled.trunc().to_u128()
}

/// Convert atomic units to a Decimal
///
/// Returns `None` if the value does not fit a Decimal (above ~7.9e28 units).
pub fn atomic_to_decimal(value: u128, decimals: u32) -> Option<Decimal> {
    let mantissa = i128::try_from(value).ok()?;
    Decimal::try_from_i128_with_scale(mantissa, decimals).ok()
}

/// Render atomic units without trailing zeros
///
/// # Example
///
/// ```
/// use gda_engine::types::price::from_atomic_trimmed;
///
/// assert_eq!(from_atomic_trimmed(1_000_000, 6).unwrap(), "1");
/// assert_eq!(from_atomic_trimmed(1_234_500, 6).unwrap(), "1.2345");
/// ```
pub fn from_atomic_trimmed(value: u128, decimals: u32) -> Option<String> {
    atomic_to_decimal(value, decimals).map(|d| d.normalize().to_string())
}

// ============================================================================
// Sqrt Price Conversion
// ============================================================================

/// Raw pool price (`currency1` per `currency0`) from a Q64.96 sqrt price
///
/// # Returns
///
/// * `Some(Decimal)` - Price with [`PRICE_DECIMALS`] places
/// * `None` - If the price does not fit a Decimal
pub fn price_from_sqrt_x96(sqrt_price_x96: &BigUint) -> Option<Decimal> {
    let scale = BigUint::from(10u128.pow(PRICE_DECIMALS));
    let scaled: BigUint = (sqrt_price_x96 * sqrt_price_x96 * scale) >> 192;
    let mantissa = scaled.to_i128()?;
    Decimal::try_from_i128_with_scale(mantissa, PRICE_DECIMALS).ok()
}

/// Asset price in numeraire
///
/// Inverts the raw pool price when the asset is `currency1`.
pub fn asset_price(sqrt_price_x96: &BigUint, is_token0: bool) -> Option<Decimal> {
    let raw = price_from_sqrt_x96(sqrt_price_x96)?;
    if is_token0 {
        Some(raw)
    } else if raw.is_zero() {
        None
    } else {
        Decimal::ONE.checked_div(raw)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
