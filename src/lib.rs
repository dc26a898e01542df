pub mod config;
pub mod models;
pub mod pricing;
pub mod replay;
pub mod store;
pub mod utils;

pub use config::{PricingConfig, Settings};
pub use pricing::{PriceResolver, Whitelist};
pub use replay::{replay_snapshot, Report};
pub use store::{EntityStore, MemoryStore, PairRegistry, Snapshot};
