//! Address and amount conversions.
//!
//! Every value that reaches the pricing code goes through here first: addresses are
//! normalized to lowercase `0x` hex so whitelist lookups are case-insensitive, and raw
//! on-chain integers are scaled into exact `BigDecimal` values.

use std::str::FromStr;

use alloy::primitives::{hex, Address, U256};
use anyhow::{Context, Result};
use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::{BigInt, Sign};

/// Fractional digits kept when decimals leave the process (reports, persisted values).
/// 18 matches the widest ERC20 precision in use.
pub const DECIMAL_SCALE: i64 = 18;

// ============================================
// Addresses
// ============================================

/// Encode bytes as a lowercase hex string with 0x prefix.
pub fn hex_encode(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse an address in any case (checksummed or not) and return its canonical form.
///
/// # Example
/// ```ignore
/// let wftm = normalize_address("0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7")?;
/// assert_eq!(wftm, "0xb31f66aa3c1e785363f0875a1b74e27b85fd66c7");
/// ```
pub fn normalize_address(address: &str) -> Result<String> {
    let parsed = Address::from_str(address.trim())
        .with_context(|| format!("invalid address `{address}`"))?;
    Ok(hex_encode(parsed.as_slice()))
}

// ============================================
// Amounts
// ============================================

/// Convert a raw token amount to a decimal-adjusted `BigDecimal` without any rounding.
///
/// # Arguments
/// * `value` - The raw on-chain integer amount
/// * `decimals` - The token's decimal places
pub fn convert_token_to_decimal(value: U256, decimals: u8) -> BigDecimal {
    let bytes: [u8; 32] = value.to_le_bytes();
    let big_int = BigInt::from_bytes_le(Sign::Plus, &bytes);

    if decimals == 0 {
        return BigDecimal::from(big_int);
    }

    // (digits, scale) is exact: value / 10^decimals
    BigDecimal::new(big_int, decimals as i64)
}

/// Parse a decimal string such as `"1"` or `"0.000001"` into an exact `BigDecimal`.
pub fn parse_decimal(value: &str) -> Result<BigDecimal> {
    BigDecimal::from_str(value.trim()).with_context(|| format!("invalid decimal `{value}`"))
}

/// Round to [`DECIMAL_SCALE`] fractional digits (banker's rounding) and strip trailing zeros.
///
/// Integers keep scale 0 so they print as plain digits rather than exponent notation.
pub fn round_to_scale(value: &BigDecimal) -> BigDecimal {
    let rounded = value
        .with_scale_round(DECIMAL_SCALE, RoundingMode::HalfEven)
        .normalized();

    if rounded.fractional_digit_count() < 0 {
        rounded.with_scale(0)
    } else {
        rounded
    }
}
