use std::{borrow::Cow, sync::Arc};

use bigdecimal::BigDecimal;
use log::{debug, trace};
use num_traits::{One, Zero};

use crate::{
    config::PricingConfig,
    models::{Bundle, Pair, PoolVariant, Token},
    store::{EntityStore, PairRegistry},
    utils::ZERO_ADDRESS,
};

/// Price resolution and volume/liquidity tracking.
///
/// Token prices are derived in base currency through one hop:
/// 1. Base token → 1
/// 2. Otherwise the first whitelist token it has a liquid pair with
///    → pair rate × counterparty's derived price
/// 3. Nothing found → 0
///
/// Tracked USD amounts use the Uniswap whitelist approach:
/// - Only amounts of whitelisted tokens count
/// - Pairs with few liquidity providers must hold a minimum of reserves
///
/// Every method is a pure read of its inputs; callers persist the results.
#[derive(Debug, Clone)]
pub struct PriceResolver {
    config: Arc<PricingConfig>,
}

impl PriceResolver {
    pub fn new(config: Arc<PricingConfig>) -> Self {
        Self { config }
    }

    pub fn is_whitelisted(&self, token: &str) -> bool {
        self.config.whitelist.contains(&canonical_id(token))
    }

    /// Derive a token's price in base currency.
    ///
    /// Scans the whitelist in declared order and returns on the first pair that exists,
    /// is stored, and holds more than `min_liquidity_base` of reserves in base currency.
    /// There is no best-price selection across pairs and no multi-hop routing.
    ///
    /// Returns 0 if no whitelist token qualifies.
    pub fn derive_price_in_base<S, R>(
        &self,
        store: &S,
        registry: &R,
        token: &Token,
        variant: PoolVariant,
    ) -> BigDecimal
    where
        S: EntityStore + ?Sized,
        R: PairRegistry + ?Sized,
    {
        let token_id = canonical_id(&token.id);
        if *token_id == self.config.base_token {
            return BigDecimal::one();
        }

        for reference in self.config.whitelist.iter() {
            let pair_address = registry.get_pair(&token_id, reference, variant);
            if pair_address == ZERO_ADDRESS {
                continue;
            }

            // Factory knows the pair but it has not been stored yet
            let Some(pair) = store.pair(&pair_address) else {
                debug!(
                    "Pair {} for {}/{} not in store, skipping",
                    pair_address, token_id, reference
                );
                continue;
            };

            if pair.reserve_base <= self.config.min_liquidity_base {
                trace!(
                    "Pair {} below liquidity threshold ({} <= {})",
                    pair.id,
                    pair.reserve_base,
                    self.config.min_liquidity_base
                );
                continue;
            }

            let Some((counterparty, rate)) = pair.counterparty(&token_id) else {
                continue;
            };

            let Some(counterparty) = store.token(counterparty) else {
                debug!("Token {} of pair {} not in store, skipping", counterparty, pair.id);
                continue;
            };

            // counterparty per our token * base per counterparty
            return rate * &counterparty.derived_base;
        }

        BigDecimal::zero()
    }

    /// USD price of the base currency from the reference pool (stable asset is token0).
    ///
    /// Returns 0, meaning "unknown", until the reference pool exists.
    pub fn base_price_usd<S>(&self, store: &S) -> BigDecimal
    where
        S: EntityStore + ?Sized,
    {
        match store.pair(&self.config.reference_pool) {
            Some(pair) => pair.token0_price.clone(),
            None => BigDecimal::zero(),
        }
    }

    /// Refresh the bundle from the reference pool.
    pub fn refresh_bundle<S>(&self, store: &S, bundle: &mut Bundle)
    where
        S: EntityStore + ?Sized,
    {
        let price = self.base_price_usd(store);
        if price != bundle.base_price_usd {
            debug!("Base currency price {} -> {} USD", bundle.base_price_usd, price);
        }
        bundle.base_price_usd = price;
    }

    /// USD price of one unit of `token` at the bundle's base-currency price.
    pub fn token_price_usd(&self, token: &Token, bundle: &Bundle) -> BigDecimal {
        &token.derived_base * &bundle.base_price_usd
    }

    /// USD value of a trade that counts toward volume statistics.
    ///
    /// - Fewer than `min_liquidity_providers` LPs: whitelisted reserves must be worth at
    ///   least `min_usd_new_pairs` (a single whitelisted side counts double), else 0
    /// - Both tokens whitelisted → average of both sides
    /// - One whitelisted → that side only
    /// - Neither → 0
    pub fn tracked_volume_usd(
        &self,
        amount0: &BigDecimal,
        token0: &Token,
        amount1: &BigDecimal,
        token1: &Token,
        pair: &Pair,
        bundle: &Bundle,
    ) -> BigDecimal {
        let price0 = self.token_price_usd(token0, bundle);
        let price1 = self.token_price_usd(token1, bundle);

        let token0_whitelisted = self.is_whitelisted(&token0.id);
        let token1_whitelisted = self.is_whitelisted(&token1.id);

        if pair.liquidity_provider_count < self.config.min_liquidity_providers {
            let reserve0_usd = &pair.reserve0 * &price0;
            let reserve1_usd = &pair.reserve1 * &price1;

            let tracked_reserves = match (token0_whitelisted, token1_whitelisted) {
                (true, true) => Some(reserve0_usd + reserve1_usd),
                (true, false) => Some(reserve0_usd * BigDecimal::from(2)),
                (false, true) => Some(reserve1_usd * BigDecimal::from(2)),
                (false, false) => None,
            };

            if let Some(reserves_usd) = tracked_reserves {
                if reserves_usd < self.config.min_usd_new_pairs {
                    trace!(
                        "Pair {} has {} LPs and {} USD tracked reserves, volume not tracked",
                        pair.id,
                        pair.liquidity_provider_count,
                        reserves_usd
                    );
                    return BigDecimal::zero();
                }
            }
        }

        match (token0_whitelisted, token1_whitelisted) {
            (true, true) => (amount0 * &price0 + amount1 * &price1) / BigDecimal::from(2),
            (true, false) => amount0 * &price0,
            (false, true) => amount1 * &price1,
            (false, false) => BigDecimal::zero(),
        }
    }

    /// USD value of reserves that counts toward liquidity statistics.
    ///
    /// - Both tokens whitelisted → sum of both sides
    /// - One whitelisted → that side doubled
    /// - Neither → 0
    pub fn tracked_liquidity_usd(
        &self,
        amount0: &BigDecimal,
        token0: &Token,
        amount1: &BigDecimal,
        token1: &Token,
        bundle: &Bundle,
    ) -> BigDecimal {
        let price0 = self.token_price_usd(token0, bundle);
        let price1 = self.token_price_usd(token1, bundle);

        match (self.is_whitelisted(&token0.id), self.is_whitelisted(&token1.id)) {
            (true, true) => amount0 * &price0 + amount1 * &price1,
            (true, false) => amount0 * &price0 * BigDecimal::from(2),
            (false, true) => amount1 * &price1 * BigDecimal::from(2),
            (false, false) => BigDecimal::zero(),
        }
    }
}

/// Lowercase form of an entity id. Ids built outside `Token::new` or a snapshot may be
/// checksummed.
fn canonical_id(id: &str) -> Cow<'_, str> {
    if id.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(id.to_ascii_lowercase())
    } else {
        Cow::Borrowed(id)
    }
}
