mod config;

pub use self::config::{LoggingSettings, PricingConfig, PricingSettings, Settings, SnapshotSettings};
