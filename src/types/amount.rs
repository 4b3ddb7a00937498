//! Fixed-point token amounts and basis-point arithmetic.
//!
//! ## Overview
//!
//! Collateral amounts are stored as `u128` base units with 18 decimals.
//! Rates (commission, slashing) are expressed in basis points out of
//! [`BPS_DENOMINATOR`]. Every division truncates toward zero, which is what
//! keeps share conservation exact across mint/burn/slash paths.
//!
//! ## Why a 256-bit intermediate?
//!
//! `value * scale` with an 18-decimal scale overflows `u128` for any value
//! above ~340 tokens, so [`mul_div`] widens to an `ethnum::U256` before dividing.
//!
//! ## Examples
//!
//! ```
//! use prover_staking::types::amount::{to_units, from_units, bps_of, UNIT};
//!
//! let stake = to_units("1.5").unwrap();
//! assert_eq!(stake, 1_500_000_000_000_000_000);
//! assert_eq!(from_units(stake), "1.500000000000000000");
//!
//! // 20% of 600 tokens
//! assert_eq!(bps_of(600 * UNIT, 2_000), Some(120 * UNIT));
//! ```

use std::str::FromStr;

use ethnum::U256;
use rust_decimal::Decimal;

/// Base-unit token amount (18 decimals).
pub type Amount = u128;

/// Rate in basis points (1 bps = 0.01%).
pub type Bps = u16;

/// Number of decimal places of a base unit.
pub const DECIMALS: u32 = 18;

/// One whole token in base units: 10^18
pub const UNIT: Amount = 1_000_000_000_000_000_000;

/// Denominator of every basis-point rate.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Largest valid basis-point rate (100%).
pub const MAX_BPS: Bps = 10_000;

// ============================================================================
// Integer Arithmetic
// ============================================================================

/// Compute `a * b / denominator`, truncating, without intermediate overflow.
///
/// Returns `None` if `denominator` is zero or the quotient does not fit in
/// a `u128`.
///
/// # Example
///
/// ```
/// use prover_staking::types::amount::mul_div;
///
/// assert_eq!(mul_div(u128::MAX, 2, 4), Some(u128::MAX / 2));
/// assert_eq!(mul_div(10, 1, 3), Some(3));
/// assert_eq!(mul_div(1, 1, 0), None);
/// ```
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    // a 128x128-bit product always fits in 256 bits
    let quotient = U256::from(a) * U256::from(b) / U256::from(denominator);
    let (hi, lo) = quotient.into_words();
    (hi == 0).then_some(lo)
}

/// `amount * bps / 10_000`, truncating.
///
/// # Returns
///
/// * `Some(Amount)` - the basis-point fraction of `amount`
/// * `None` - if `bps` exceeds 10_000
pub fn bps_of(amount: Amount, bps: Bps) -> Option<Amount> {
    if bps > MAX_BPS {
        return None;
    }
    mul_div(amount, bps as u128, BPS_DENOMINATOR)
}

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert a decimal token string to base units
///
/// # Arguments
///
/// * `s` - Decimal string (e.g., "100.25")
///
/// # Returns
///
/// * `Some(Amount)` - The base-unit representation
/// * `None` - If parsing fails, the value is negative, or has more than
///   18 fractional digits that do not round cleanly into range
///
/// # Example
///
/// ```
/// use prover_staking::types::amount::{to_units, UNIT};
///
/// assert_eq!(to_units("1"), Some(UNIT));
/// assert_eq!(to_units("0.000000000000000001"), Some(1));
/// assert_eq!(to_units("-1"), None);
/// ```
pub fn to_units(s: &str) -> Option<Amount> {
    let decimal = Decimal::from_str(s).ok()?;
    decimal_to_units(decimal)
}

/// Convert a Decimal to base units, rounding to the nearest unit
pub fn decimal_to_units(d: Decimal) -> Option<Amount> {
    if d.is_sign_negative() {
        return None;
    }
    let mut scaled = d.checked_mul(Decimal::from(UNIT as u64))?.round_dp(0);
    scaled.rescale(0);
    u128::try_from(scaled.mantissa()).ok()
}

/// Convert base units to a Decimal
///
/// Returns `None` for amounts beyond the 96-bit mantissa of `Decimal`
/// (~79 billion tokens).
pub fn units_to_decimal(value: Amount) -> Option<Decimal> {
    let mantissa = i128::try_from(value).ok()?;
    Decimal::try_from_i128_with_scale(mantissa, DECIMALS).ok()
}

/// Render base units with all 18 decimal places
///
/// # Example
///
/// ```
/// use prover_staking::types::amount::{from_units, UNIT};
///
/// assert_eq!(from_units(UNIT), "1.000000000000000000");
/// ```
pub fn from_units(value: Amount) -> String {
    match units_to_decimal(value) {
        Some(d) => format!("{:.18}", d),
        None => format!("{}e-18", value),
    }
}

/// Render base units with trailing zeros trimmed
///
/// # Example
///
/// ```
/// use prover_staking::types::amount::{from_units_trimmed, UNIT};
///
/// assert_eq!(from_units_trimmed(480 * UNIT), "480");
/// assert_eq!(from_units_trimmed(UNIT / 2), "0.5");
/// ```
pub fn from_units_trimmed(value: Amount) -> String {
    match units_to_decimal(value) {
        Some(d) => format!("{}", d.normalize()),
        None => format!("{}e-18", value),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
