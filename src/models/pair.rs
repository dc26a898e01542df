use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::{models::Token, utils::convert_token_to_decimal};

/// Curve style of a pair. The factory keeps one pair per (tokenA, tokenB, variant).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolVariant {
    /// Constant product (x * y = k)
    #[default]
    Volatile,
    /// Stable-swap curve (x^3 * y + y^3 * x = k)
    Stable,
}

/// Pair state as maintained by the event pipeline.
///
/// Primary Key: id (lowercase pair address)
///
/// Price convention (Uniswap style):
/// - token0_price = token0 per 1 token1 = reserve0 / reserve1
/// - token1_price = token1 per 1 token0 = reserve1 / reserve0
///
/// Both prices are zero while either reserve is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    pub id: String,
    pub token0: String,
    pub token1: String,
    #[serde(default)]
    pub variant: PoolVariant,

    // Decimal-adjusted reserves
    #[serde(default)]
    pub reserve0: BigDecimal,
    #[serde(default)]
    pub reserve1: BigDecimal,
    /// Total reserves valued in base currency
    #[serde(default)]
    pub reserve_base: BigDecimal,

    #[serde(default)]
    pub token0_price: BigDecimal,
    #[serde(default)]
    pub token1_price: BigDecimal,

    #[serde(default)]
    pub liquidity_provider_count: u64,
}

impl Pair {
    pub fn new(id: &str, token0: &str, token1: &str, variant: PoolVariant) -> Self {
        Self {
            id: id.to_lowercase(),
            token0: token0.to_lowercase(),
            token1: token1.to_lowercase(),
            variant,
            reserve0: BigDecimal::zero(),
            reserve1: BigDecimal::zero(),
            reserve_base: BigDecimal::zero(),
            token0_price: BigDecimal::zero(),
            token1_price: BigDecimal::zero(),
            liquidity_provider_count: 0,
        }
    }

    /// The other token of the pair and how many of it one unit of `token` buys.
    ///
    /// - token is token0 → (token1, token1_price)
    /// - token is token1 → (token0, token0_price)
    pub fn counterparty(&self, token: &str) -> Option<(&str, &BigDecimal)> {
        if self.token0 == token {
            Some((self.token1.as_str(), &self.token1_price))
        } else if self.token1 == token {
            Some((self.token0.as_str(), &self.token0_price))
        } else {
            None
        }
    }

    /// Set decimal-adjusted reserves and recompute both spot prices.
    pub fn sync_reserves(&mut self, reserve0: BigDecimal, reserve1: BigDecimal) {
        if reserve0.is_zero() || reserve1.is_zero() {
            self.token0_price = BigDecimal::zero();
            self.token1_price = BigDecimal::zero();
        } else {
            self.token0_price = &reserve0 / &reserve1;
            self.token1_price = &reserve1 / &reserve0;
        }

        self.reserve0 = reserve0;
        self.reserve1 = reserve1;
    }

    /// Update reserves from a raw Sync event payload.
    ///
    /// Raw values are scaled by each token's decimals before the prices are recomputed.
    pub fn sync_raw_reserves(
        &mut self,
        reserve0: U256,
        reserve1: U256,
        token0_decimals: u8,
        token1_decimals: u8,
    ) {
        self.sync_reserves(
            convert_token_to_decimal(reserve0, token0_decimals),
            convert_token_to_decimal(reserve1, token1_decimals),
        );
    }

    /// Recompute `reserve_base` from both tokens' current derived prices.
    pub fn update_reserve_base(&mut self, token0: &Token, token1: &Token) {
        self.reserve_base =
            &self.reserve0 * &token0.derived_base + &self.reserve1 * &token1.derived_base;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_decimal;

    fn dec(value: &str) -> BigDecimal {
        parse_decimal(value).unwrap()
    }

    #[test]
    fn test_sync_reserves_sets_both_prices() {
        let mut pair = Pair::new("0xpair", "0xa", "0xb", PoolVariant::Volatile);
        pair.sync_reserves(dec("100"), dec("400"));

        // 4 token1 per token0, 0.25 token0 per token1
        assert_eq!(pair.token1_price, dec("4"));
        assert_eq!(pair.token0_price, dec("0.25"));
    }

    #[test]
    fn test_sync_reserves_zero_reserve_zeroes_prices() {
        let mut pair = Pair::new("0xpair", "0xa", "0xb", PoolVariant::Volatile);
        pair.sync_reserves(dec("100"), dec("400"));
        pair.sync_reserves(dec("0"), dec("400"));

        assert!(pair.token0_price.is_zero());
        assert!(pair.token1_price.is_zero());
        assert_eq!(pair.reserve1, dec("400"));
    }

    #[test]
    fn test_sync_raw_reserves_applies_decimals() {
        let mut pair = Pair::new("0xpair", "0xusdc", "0xwftm", PoolVariant::Volatile);
        // 500 USDC (6 decimals) against 1000 WFTM (18 decimals)
        pair.sync_raw_reserves(
            U256::from(500_000_000u64),
            U256::from(1_000u64) * U256::from(10u64).pow(U256::from(18u64)),
            6,
            18,
        );

        assert_eq!(pair.reserve0, dec("500"));
        assert_eq!(pair.reserve1, dec("1000"));
        assert_eq!(pair.token0_price, dec("0.5"));
        assert_eq!(pair.token1_price, dec("2"));
    }

    #[test]
    fn test_update_reserve_base() {
        let mut pair = Pair::new("0xpair", "0xa", "0xb", PoolVariant::Stable);
        pair.sync_reserves(dec("10"), dec("20"));

        let token0 = Token::new("0xa", "A", 18).with_derived_base(dec("2"));
        let token1 = Token::new("0xb", "B", 18).with_derived_base(dec("0.5"));
        pair.update_reserve_base(&token0, &token1);

        assert_eq!(pair.reserve_base, dec("30"));
    }

    #[test]
    fn test_counterparty() {
        let mut pair = Pair::new("0xPAIR", "0xA", "0xB", PoolVariant::Volatile);
        pair.sync_reserves(dec("1"), dec("3"));

        let (other, rate) = pair.counterparty("0xa").unwrap();
        assert_eq!(other, "0xb");
        assert_eq!(rate, &dec("3"));

        let (other, rate) = pair.counterparty("0xb").unwrap();
        assert_eq!(other, "0xa");
        assert_eq!(*rate, BigDecimal::from(1) / BigDecimal::from(3));

        assert!(pair.counterparty("0xc").is_none());
        assert_eq!(pair.variant, PoolVariant::Volatile);
    }

    #[test]
    fn test_variant_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PoolVariant::Stable).unwrap(), "\"stable\"");
        let variant: PoolVariant = serde_json::from_str("\"volatile\"").unwrap();
        assert_eq!(variant, PoolVariant::Volatile);
    }
}
