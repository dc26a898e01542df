//! Utility functions for the pricer.
//!
//! - [`conversion`] - Address normalization and exact decimal conversions

mod conversion;

// ============================================
// Common Constants
// ============================================

/// The Ethereum zero address (0x0000000000000000000000000000000000000000)
/// Returned by the factory when no pair exists for a token combination.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

// ============================================
// Re-exports
// ============================================

pub use conversion::{
    convert_token_to_decimal, hex_encode, normalize_address, parse_decimal, round_to_scale,
    DECIMAL_SCALE,
};
