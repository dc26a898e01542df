//! Token price discovery and tracked volume/liquidity.
//!
//! - [`whitelist`] - Ordered set of trusted reference tokens
//! - [`price_resolver`] - Base-currency price derivation and the USD trackers

mod price_resolver;
mod whitelist;

pub use price_resolver::PriceResolver;
pub use whitelist::Whitelist;
