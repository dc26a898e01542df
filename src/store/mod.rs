//! Read-only access to the entities and the pair factory.
//!
//! The indexer pipeline owns persistence. Pricing only needs these two lookups, so they
//! are traits and any backing store can be plugged in. [`MemoryStore`] implements both
//! for snapshots and tests.

mod memory;

pub use memory::{MemoryStore, Snapshot};

use crate::models::{Pair, PoolVariant, Token};

/// Entity lookup by lowercase address. Absence is `None`, never an error.
///
/// Implementations store ids lowercase and are queried with lowercase ids.
pub trait EntityStore {
    fn token(&self, id: &str) -> Option<&Token>;
    fn pair(&self, id: &str) -> Option<&Pair>;
}

/// Factory lookup: the pair address for two tokens and a variant.
///
/// Returns [`ZERO_ADDRESS`](crate::utils::ZERO_ADDRESS) when no pair was created.
/// Argument order must not matter.
pub trait PairRegistry {
    fn get_pair(&self, token_a: &str, token_b: &str, variant: PoolVariant) -> String;
}
