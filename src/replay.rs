//! Re-run pricing over a stored snapshot.
//!
//! Each pair is processed the way the indexer handles a `Sync` event: refresh the bundle
//! from the reference pool, re-derive both tokens in base currency, recompute the pair's
//! base-currency reserves, then value its reserves for liquidity statistics.

use bigdecimal::BigDecimal;
use log::{debug, info};
use num_traits::Zero;
use serde::Serialize;

use crate::{
    models::{Bundle, Pair, Token},
    pricing::PriceResolver,
    store::{EntityStore, MemoryStore, Snapshot},
    utils::round_to_scale,
};

/// Pair state after replay plus its USD valuations.
#[derive(Debug, Clone, Serialize)]
pub struct PairReport {
    #[serde(flatten)]
    pub pair: Pair,
    /// reserve_base at the bundle price, whitelisted or not
    pub reserve_usd: BigDecimal,
    /// Reserves counted toward liquidity statistics
    pub tracked_reserve_usd: BigDecimal,
}

/// Output of [`replay_snapshot`].
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub bundle: Bundle,
    pub tokens: Vec<Token>,
    pub pairs: Vec<PairReport>,
}

impl Report {
    /// Round every decimal to the output scale.
    pub fn rounded(mut self) -> Self {
        self.bundle.base_price_usd = round_to_scale(&self.bundle.base_price_usd);

        for token in self.tokens.iter_mut() {
            token.derived_base = round_to_scale(&token.derived_base);
        }

        for report in self.pairs.iter_mut() {
            let pair = &mut report.pair;
            pair.reserve0 = round_to_scale(&pair.reserve0);
            pair.reserve1 = round_to_scale(&pair.reserve1);
            pair.reserve_base = round_to_scale(&pair.reserve_base);
            pair.token0_price = round_to_scale(&pair.token0_price);
            pair.token1_price = round_to_scale(&pair.token1_price);
            report.reserve_usd = round_to_scale(&report.reserve_usd);
            report.tracked_reserve_usd = round_to_scale(&report.tracked_reserve_usd);
        }

        self
    }
}

/// Reprice one pair and its tokens in place.
///
/// Returns the pair's tracked reserve value in USD, or `None` if the pair or one of its
/// tokens is not in the store.
pub fn replay_sync(
    resolver: &PriceResolver,
    store: &mut MemoryStore,
    bundle: &mut Bundle,
    pair_id: &str,
) -> Option<BigDecimal> {
    let pair = store.pair(pair_id)?.clone();

    resolver.refresh_bundle(&*store, bundle);

    let token0 = store.token(&pair.token0)?.clone();
    let token1 = store.token(&pair.token1)?.clone();

    let view: &MemoryStore = store;
    let derived0 = resolver.derive_price_in_base(view, view, &token0, pair.variant);
    let derived1 = resolver.derive_price_in_base(view, view, &token1, pair.variant);

    let token0 = token0.with_derived_base(derived0);
    let token1 = token1.with_derived_base(derived1);

    let tracked =
        resolver.tracked_liquidity_usd(&pair.reserve0, &token0, &pair.reserve1, &token1, bundle);

    if let Some(stored) = store.pair_mut(pair_id) {
        stored.update_reserve_base(&token0, &token1);
    }

    debug!(
        "Pair {}: {} = {} base, {} = {} base, tracked {} USD",
        pair.id, token0.symbol, token0.derived_base, token1.symbol, token1.derived_base, tracked
    );

    store.insert_token(token0);
    store.insert_token(token1);

    Some(tracked)
}

/// Replay every pair of the snapshot in order and collect the results.
pub fn replay_snapshot(resolver: &PriceResolver, snapshot: Snapshot) -> Report {
    let mut bundle = snapshot.bundle.clone().unwrap_or_default();
    let mut store = MemoryStore::from_snapshot(snapshot);

    let pair_ids: Vec<String> = store.pairs().map(|pair| pair.id.clone()).collect();
    let mut tracked = Vec::with_capacity(pair_ids.len());
    for pair_id in &pair_ids {
        let value = replay_sync(resolver, &mut store, &mut bundle, pair_id);
        tracked.push(value.unwrap_or_else(BigDecimal::zero));
    }

    let pairs: Vec<PairReport> = store
        .pairs()
        .zip(tracked)
        .map(|(pair, tracked_reserve_usd)| PairReport {
            reserve_usd: &pair.reserve_base * &bundle.base_price_usd,
            pair: pair.clone(),
            tracked_reserve_usd,
        })
        .collect();

    let tokens: Vec<Token> = store
        .token_ids()
        .iter()
        .filter_map(|id| store.token(id).cloned())
        .collect();

    let priced = tokens.iter().filter(|t| !t.derived_base.is_zero()).count();
    info!(
        "Replayed {} pairs: {}/{} tokens priced, base currency at {} USD",
        pairs.len(),
        priced,
        tokens.len(),
        bundle.base_price_usd
    );

    Report {
        bundle,
        tokens,
        pairs,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{config::PricingSettings, utils::parse_decimal};

    fn dec(value: &str) -> BigDecimal {
        parse_decimal(value).unwrap()
    }

    fn resolver() -> PriceResolver {
        PriceResolver::new(Arc::new(PricingSettings::default().build().unwrap()))
    }

    const SNAPSHOT: &str = r#"{
        "bundle": { "base_price_usd": "0.3" },
        "tokens": [
            { "id": "0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7", "symbol": "WFTM", "derived_base": "1" },
            { "id": "0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E", "symbol": "USDC", "decimals": 6 },
            { "id": "0x841fad6eae12c286d1fd18d1d525dffa75c7effe", "symbol": "BOO" },
            { "id": "0x5cc61a78f164885776aa610fb0fe1257df78e59b", "symbol": "SPIRIT" }
        ],
        "pairs": [
            {
                "id": "0xC94B4961478132cC14e49C7c2C00771066aF3870",
                "token0": "0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E",
                "token1": "0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7",
                "reserve0": "500", "reserve1": "1000",
                "token0_price": "0.5", "token1_price": "2",
                "reserve_base": "2000",
                "liquidity_provider_count": 40
            },
            {
                "id": "0x0000000000000000000000000000000000000b00",
                "token0": "0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7",
                "token1": "0x841fad6eae12c286d1fd18d1d525dffa75c7effe",
                "reserve0": "300", "reserve1": "100",
                "token0_price": "3", "token1_price": "0.333333333333333333",
                "reserve_base": "600",
                "liquidity_provider_count": 9
            },
            {
                "id": "0x0000000000000000000000000000000000000b01",
                "token0": "0x841fad6eae12c286d1fd18d1d525dffa75c7effe",
                "token1": "0x5cc61a78f164885776aa610fb0fe1257df78e59b",
                "reserve0": "10", "reserve1": "10",
                "token0_price": "1", "token1_price": "1",
                "reserve_base": "0",
                "liquidity_provider_count": 2
            }
        ]
    }"#;

    #[test]
    fn test_replay_snapshot() {
        let snapshot = Snapshot::from_json_str(SNAPSHOT).unwrap();
        let report = replay_snapshot(&resolver(), snapshot);

        // Bundle comes from the reference pool, not the stale snapshot value
        assert_eq!(report.bundle.base_price_usd, dec("0.5"));

        let derived: Vec<String> =
            report.tokens.iter().map(|t| t.derived_base.normalized().to_string()).collect();
        // USDC: 2 WFTM per USDC, BOO: 3 WFTM, SPIRIT: no whitelisted pair
        assert_eq!(derived, vec!["1", "2", "3", "0"]);

        // USDC/WFTM: both whitelisted, 500 * 1 + 1000 * 0.5
        assert_eq!(report.pairs[0].tracked_reserve_usd, dec("1000"));
        assert_eq!(report.pairs[0].pair.reserve_base, dec("2000"));
        assert_eq!(report.pairs[0].reserve_usd, dec("1000"));

        // WFTM/BOO: only WFTM whitelisted, doubled
        assert_eq!(report.pairs[1].tracked_reserve_usd, dec("300"));

        // BOO/SPIRIT: nothing whitelisted, but reserves still valued in base
        assert!(report.pairs[2].tracked_reserve_usd.is_zero());
        assert_eq!(report.pairs[2].pair.reserve_base, dec("30"));
    }

    #[test]
    fn test_replay_sync_missing_pair() {
        let resolver = resolver();
        let mut store = MemoryStore::new();
        let mut bundle = Bundle::default();

        assert!(replay_sync(&resolver, &mut store, &mut bundle, "0x01").is_none());
    }

    #[test]
    fn test_report_rounds_and_serializes_as_strings() {
        let mut pair = Pair::new("0x01", "0xa", "0xb", Default::default());
        pair.sync_reserves(dec("1"), dec("3"));
        let report = Report {
            bundle: Bundle::new(dec("0.5")),
            tokens: vec![Token::new("0xa", "A", 18).with_derived_base(dec("1") / dec("3"))],
            pairs: vec![PairReport {
                pair,
                reserve_usd: dec("0"),
                tracked_reserve_usd: dec("1.25"),
            }],
        }
        .rounded();

        assert_eq!(report.tokens[0].derived_base, dec("0.333333333333333333"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["bundle"]["base_price_usd"], "0.5");
        assert_eq!(json["pairs"][0]["token1_price"], "3");
        assert_eq!(json["pairs"][0]["token0_price"], "0.333333333333333333");
        assert_eq!(json["pairs"][0]["tracked_reserve_usd"], "1.25");
        assert_eq!(json["pairs"][0]["variant"], "volatile");
    }
}
