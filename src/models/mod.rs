//! Entities read by the pricing code.
//!
//! These mirror the indexer's stored entities. The pipeline owns and mutates them;
//! the pricing functions only read.

mod bundle;
mod pair;
mod token;

pub use bundle::Bundle;
pub use pair::{Pair, PoolVariant};
pub use token::Token;
