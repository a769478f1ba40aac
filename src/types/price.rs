//! Fixed-point amount, price and rate utilities.
//!
//! ## Overview
//!
//! Every amount, price and rate in the exchange is an unsigned fixed-point
//! integer. Floats never appear on the settlement path.
//!
//! ## Scales
//!
//! - **Amounts** are wad values: `u128` scaled by 10^18.
//! - **Prices** are scaled by the pair's own price precision (10^18 by default).
//! - **Rates** (commission, penalties, market multipliers, smoothing) are
//!   scaled by [`RATE_PRECISION`].
//!
//! ## Rounding
//!
//! All conversions truncate toward zero. [`mul_div`] is exact for every
//! operand: products that do not fit a `u128` are carried in 256 bits, so
//! only a quotient above `u128::MAX` is rejected.
//!
//! ## Examples
//!
//! ```
//! use tick_dex::types::price::{to_fixed, from_fixed, WAD};
//!
//! let amount = to_fixed("1.5").unwrap();
//! assert_eq!(amount, 3 * WAD / 2);
//! assert_eq!(from_fixed(amount), "1.5");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Scaling factor for amounts: 10^18
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Number of decimals carried by a wad value
pub const WAD_DECIMALS: u32 = 18;

/// Scaling factor for rates and market multipliers
pub const RATE_PRECISION: u128 = WAD;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert a decimal string to a wad value
///
/// # Returns
///
/// * `Some(u128)` - The fixed-point representation, truncated to 18 decimals
/// * `None` - If parsing fails, the value is negative or out of range
///
/// # Example
///
/// ```
/// use tick_dex::types::price::to_fixed;
///
/// assert_eq!(to_fixed("1"), Some(1_000_000_000_000_000_000));
/// assert_eq!(to_fixed("0.1"), Some(100_000_000_000_000_000));
/// assert_eq!(to_fixed("-1"), None);
/// ```
pub fn to_fixed(s: &str) -> Option<u128> {
    let decimal = Decimal::from_str(s).ok()?;
    decimal_to_fixed(decimal)
}

/// Convert a Decimal to a wad value, truncating extra decimals
pub fn decimal_to_fixed(d: Decimal) -> Option<u128> {
    if d.is_sign_negative() {
        return None;
    }
    let scaled = d.checked_mul(wad_decimal())?;
    scaled.trunc().to_u128()
}

/// Convert a wad value to a Decimal
///
/// Returns `None` when the value exceeds the 96-bit Decimal mantissa.
pub fn fixed_to_decimal(value: u128) -> Option<Decimal> {
    let mantissa = i128::try_from(value).ok()?;
    Decimal::try_from_i128_with_scale(mantissa, WAD_DECIMALS).ok()
}

/// Convert a wad value to a human-readable string (trailing zeros trimmed)
///
/// # Example
///
/// ```
/// use tick_dex::types::price::from_fixed;
///
/// assert_eq!(from_fixed(1_000_000_000_000_000_000), "1");
/// assert_eq!(from_fixed(1_500_000_000_000_000_000), "1.5");
/// assert_eq!(from_fixed(1), "0.000000000000000001");
/// ```
pub fn from_fixed(value: u128) -> String {
    let whole = value / WAD;
    let frac = value % WAD;
    if frac == 0 {
        return whole.to_string();
    }
    let s = format!("{}.{:018}", whole, frac);
    s.trim_end_matches('0').to_string()
}

#[inline]
fn wad_decimal() -> Decimal {
    Decimal::from(1_000_000_000_000_000_000u64)
}

// ============================================================================
// Arithmetic Functions
// ============================================================================

/// Compute `a * b / c`, truncated toward zero
///
/// # Returns
///
/// * `Some(u128)` - The truncated quotient
/// * `None` - If `c` is zero or the result does not fit
///
/// # Example
///
/// ```
/// use tick_dex::types::price::mul_div;
///
/// assert_eq!(mul_div(10, 3, 4), Some(7));
/// assert_eq!(mul_div(1, 1, 0), None);
/// ```
pub fn mul_div(a: u128, b: u128, c: u128) -> Option<u128> {
    if c == 0 {
        return None;
    }
    match a.checked_mul(b) {
        Some(product) => Some(product / c),
        None => {
            let (hi, lo) = widening_mul(a, b);
            div_wide(hi, lo, c)
        }
    }
}

const LOW_MASK: u128 = u64::MAX as u128;

/// Full 256-bit product as `(high, low)` halves
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    let (a_hi, a_lo) = (a >> 64, a & LOW_MASK);
    let (b_hi, b_lo) = (b >> 64, b & LOW_MASK);

    let lo_lo = a_lo * b_lo;
    let lo_hi = a_lo * b_hi;
    let hi_lo = a_hi * b_lo;
    let hi_hi = a_hi * b_hi;

    // at most 3 * (2^64 - 1), no overflow
    let middle = (lo_lo >> 64) + (lo_hi & LOW_MASK) + (hi_lo & LOW_MASK);
    let low = (lo_lo & LOW_MASK) | (middle << 64);
    let high = hi_hi + (lo_hi >> 64) + (hi_lo >> 64) + (middle >> 64);
    (high, low)
}

/// `(high, low) / c` by shift-subtract long division
///
/// `None` when the quotient needs more than 128 bits.
fn div_wide(high: u128, low: u128, c: u128) -> Option<u128> {
    if high >= c {
        return None;
    }
    let mut remainder = high;
    let mut quotient = 0u128;
    for bit in (0..128).rev() {
        let carry = remainder >> 127;
        remainder = (remainder << 1) | ((low >> bit) & 1);
        quotient <<= 1;
        if carry == 1 || remainder >= c {
            remainder = remainder.wrapping_sub(c);
            quotient |= 1;
        }
    }
    Some(quotient)
}

/// Apply a rate scaled by [`RATE_PRECISION`] to an amount
///
/// # Example
///
/// ```
/// use tick_dex::types::price::{apply_rate, to_fixed};
///
/// let ten = to_fixed("10").unwrap();
/// let rate = to_fixed("0.1").unwrap();
/// assert_eq!(apply_rate(ten, rate), to_fixed("1"));
/// ```
#[inline]
pub fn apply_rate(amount: u128, rate: u128) -> Option<u128> {
    mul_div(amount, rate, RATE_PRECISION)
}

/// Convert an amount of base token into secondary token at `price`
#[inline]
pub fn base_to_secondary(amount: u128, price: u128, precision: u128) -> Option<u128> {
    mul_div(amount, precision, price)
}

/// Convert an amount of secondary token into base token at `price`
#[inline]
pub fn secondary_to_base(amount: u128, price: u128, precision: u128) -> Option<u128> {
    mul_div(amount, price, precision)
}

/// Floor of the average of two prices, without intermediate overflow
///
/// # Example
///
/// ```
/// use tick_dex::types::price::average_price;
///
/// assert_eq!(average_price(1, 10), 5);
/// assert_eq!(average_price(u128::MAX, u128::MAX), u128::MAX);
/// ```
#[inline]
pub fn average_price(a: u128, b: u128) -> u128 {
    a / 2 + b / 2 + (a % 2 + b % 2) / 2
}

// ============================================================================
// Unit Tests
// ============================================================================
