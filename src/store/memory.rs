use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    models::{Bundle, Pair, PoolVariant, Token},
    store::{EntityStore, PairRegistry},
    utils::{normalize_address, ZERO_ADDRESS},
};

/// Point-in-time dump of the entities the pricer reads.
///
/// ```json
/// { "bundle": { "base_price_usd": "0.41" }, "tokens": [...], "pairs": [...] }
/// ```
///
/// Decimals are strings so they round-trip exactly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub bundle: Option<Bundle>,
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub pairs: Vec<Pair>,
}

impl Snapshot {
    /// Read a JSON snapshot and normalize every address in it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;

        Self::from_json_str(&raw).with_context(|| format!("Invalid snapshot {}", path.display()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let mut snapshot: Snapshot = serde_json::from_str(raw)?;

        for token in snapshot.tokens.iter_mut() {
            token.id = normalize_address(&token.id)?;
        }
        for pair in snapshot.pairs.iter_mut() {
            pair.id = normalize_address(&pair.id)?;
            pair.token0 = normalize_address(&pair.token0)?;
            pair.token1 = normalize_address(&pair.token1)?;
        }

        Ok(snapshot)
    }
}

/// Registry key: tokens sorted so lookups are order-independent.
type RegistryKey = (String, String, PoolVariant);

fn registry_key(token_a: &str, token_b: &str, variant: PoolVariant) -> RegistryKey {
    let a = token_a.to_lowercase();
    let b = token_b.to_lowercase();
    if a < b {
        (a, b, variant)
    } else {
        (b, a, variant)
    }
}

/// In-memory entity store and pair factory.
///
/// Keeps insertion order so callers that walk all tokens (e.g. re-deriving prices from a
/// snapshot) are deterministic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tokens: FxHashMap<String, Token>,
    pairs: FxHashMap<String, Pair>,
    registry: FxHashMap<RegistryKey, String>,
    token_order: Vec<String>,
    pair_order: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut store = Self::new();
        for token in snapshot.tokens {
            store.insert_token(token);
        }
        for pair in snapshot.pairs {
            store.insert_pair(pair);
        }

        debug!(
            "Loaded {} tokens and {} pairs into memory store",
            store.tokens.len(),
            store.pairs.len()
        );
        store
    }

    pub fn insert_token(&mut self, mut token: Token) {
        token.id = token.id.to_lowercase();
        if !self.tokens.contains_key(&token.id) {
            self.token_order.push(token.id.clone());
        }
        self.tokens.insert(token.id.clone(), token);
    }

    /// Store the pair and register it with the factory.
    pub fn insert_pair(&mut self, pair: Pair) {
        self.register_pair(&pair.token0, &pair.token1, pair.variant, &pair.id);

        let id = pair.id.to_lowercase();
        if !self.pairs.contains_key(&id) {
            self.pair_order.push(id.clone());
        }
        self.pairs.insert(id, pair);
    }

    /// Register a pair with the factory only, without storing its entity.
    pub fn register_pair(&mut self, token_a: &str, token_b: &str, variant: PoolVariant, id: &str) {
        let key = registry_key(token_a, token_b, variant);
        if let Some(previous) = self.registry.insert(key, id.to_lowercase()) {
            if previous != id.to_lowercase() {
                warn!(
                    "Pair for {}/{} ({:?}) re-registered: {} -> {}",
                    token_a, token_b, variant, previous, id
                );
            }
        }
    }

    pub fn token_mut(&mut self, id: &str) -> Option<&mut Token> {
        self.tokens.get_mut(&id.to_lowercase())
    }

    pub fn pair_mut(&mut self, id: &str) -> Option<&mut Pair> {
        self.pairs.get_mut(&id.to_lowercase())
    }

    /// Token ids in insertion order.
    pub fn token_ids(&self) -> &[String] {
        &self.token_order
    }

    /// Pairs in insertion order.
    pub fn pairs(&self) -> impl Iterator<Item = &Pair> {
        self.pair_order.iter().filter_map(|id| self.pairs.get(id))
    }
}

impl EntityStore for MemoryStore {
    fn token(&self, id: &str) -> Option<&Token> {
        self.tokens.get(id)
    }

    fn pair(&self, id: &str) -> Option<&Pair> {
        self.pairs.get(id)
    }
}

impl PairRegistry for MemoryStore {
    fn get_pair(&self, token_a: &str, token_b: &str, variant: PoolVariant) -> String {
        self.registry
            .get(&registry_key(token_a, token_b, variant))
            .cloned()
            .unwrap_or_else(|| ZERO_ADDRESS.to_string())
    }
}
