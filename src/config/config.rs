use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use bigdecimal::BigDecimal;
use config::{Config, ConfigError, Environment, File, FileFormat};
use log::LevelFilter;
use serde::Deserialize;

use crate::{
    pricing::Whitelist,
    utils::{normalize_address, parse_decimal},
};

/// Pricing configuration as written in `config.yaml`.
///
/// Defaults reproduce the Fantom deployment: WFTM as base currency, the USDC/WFTM pair
/// (USDC is token0) as the USD reference, and the seven-token whitelist.
/// Thresholds are strings so they parse into exact decimals.
#[derive(Debug, Deserialize, Clone)]
pub struct PricingSettings {
    /// Wrapped base-currency token, priced at exactly 1
    #[serde(default = "default_base_token")]
    pub base_token: String,
    /// Stable/base pair whose token0 price is the base currency's USD price
    #[serde(default = "default_reference_pool")]
    pub reference_pool: String,
    /// Reference tokens, in lookup order
    #[serde(default = "default_whitelist")]
    pub whitelist: Vec<String>,
    /// Minimum base-currency reserves for a pair to price a token
    #[serde(default = "default_min_liquidity_base")]
    pub min_liquidity_base: String,
    /// Minimum USD reserves counted for pairs with few liquidity providers
    #[serde(default = "default_min_usd_new_pairs")]
    pub min_usd_new_pairs: String,
    /// Pairs with fewer providers than this go through the new-pair reserve check
    #[serde(default = "default_min_liquidity_providers")]
    pub min_liquidity_providers: u64,
}

fn default_base_token() -> String {
    "0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7".to_string() // WFTM
}

fn default_reference_pool() -> String {
    "0xC94B4961478132cC14e49C7c2C00771066aF3870".to_string() // USDC/WFTM, created at 30523830
}

fn default_whitelist() -> Vec<String> {
    [
        // main
        "0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7", // WFTM
        "0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E", // USDC
        "0xd586e7f844cea2f87f50152665bcbc2c279d8d70", // DAI
        // misc, alphabetical
        "0xd24c2ad096400b6fbcd2ad8b24e7acbc21a1da64", // FRAX
        "0x99d8a9c45b2eca8864373a26d1459e3dff1e17f3", // MIM
        "0xdbf31df14b66535af65aac99c32e9ea844e14501", // renBTC
        "0x50b7545627a5162f82a992c33b87adc75187b218", // WBTC
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_min_liquidity_base() -> String {
    "1".to_string()
}

fn default_min_usd_new_pairs() -> String {
    "1".to_string()
}

fn default_min_liquidity_providers() -> u64 {
    5
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            base_token: default_base_token(),
            reference_pool: default_reference_pool(),
            whitelist: default_whitelist(),
            min_liquidity_base: default_min_liquidity_base(),
            min_usd_new_pairs: default_min_usd_new_pairs(),
            min_liquidity_providers: default_min_liquidity_providers(),
        }
    }
}

impl PricingSettings {
    /// Validate addresses and thresholds and freeze them into a [`PricingConfig`].
    pub fn build(&self) -> Result<PricingConfig> {
        let base_token = normalize_address(&self.base_token).context("pricing.base_token")?;
        let reference_pool =
            normalize_address(&self.reference_pool).context("pricing.reference_pool")?;
        let whitelist = Whitelist::new(&self.whitelist).context("pricing.whitelist")?;

        let min_liquidity_base =
            parse_decimal(&self.min_liquidity_base).context("pricing.min_liquidity_base")?;
        let min_usd_new_pairs =
            parse_decimal(&self.min_usd_new_pairs).context("pricing.min_usd_new_pairs")?;

        Ok(PricingConfig {
            base_token,
            reference_pool,
            whitelist,
            min_liquidity_base,
            min_usd_new_pairs,
            min_liquidity_providers: self.min_liquidity_providers,
        })
    }
}

/// Validated, immutable pricing configuration shared by every resolver call.
///
/// All addresses are lowercase `0x` hex.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    pub base_token: String,
    pub reference_pool: String,
    pub whitelist: Whitelist,
    pub min_liquidity_base: BigDecimal,
    pub min_usd_new_pairs: BigDecimal,
    pub min_liquidity_providers: u64,
}

/// Log output configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    /// One of off, error, warn, info, debug, trace
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingSettings {
    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.level)
            .map_err(|_| anyhow!("invalid logging.level `{}`", self.level))
    }
}

/// Snapshot input for the `pricer` binary.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SnapshotSettings {
    /// JSON snapshot path; the first CLI argument takes precedence
    #[serde(default)]
    pub path: Option<String>,
}

/// Root application configuration.
///
/// Loaded from `config.yaml` (optional) with `PRICER__SECTION__KEY` environment overrides.
/// Every section has working defaults.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub pricing: PricingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub snapshot: SnapshotSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("PRICER")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("pricing.whitelist")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }

    /// Load settings from an in-memory YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_build() {
        let config = Settings::default().pricing.build().unwrap();

        assert_eq!(config.base_token, "0xb31f66aa3c1e785363f0875a1b74e27b85fd66c7");
        assert_eq!(config.reference_pool, "0xc94b4961478132cc14e49c7c2c00771066af3870");
        assert_eq!(config.whitelist.len(), 7);
        assert_eq!(config.whitelist.iter().next(), Some(config.base_token.as_str()));
        assert_eq!(config.min_liquidity_base, BigDecimal::from(1));
        assert_eq!(config.min_usd_new_pairs, BigDecimal::from(1));
        assert_eq!(config.min_liquidity_providers, 5);
    }

    #[test]
    fn test_yaml_overrides() {
        let settings = Settings::from_yaml_str(
            r#"
pricing:
  base_token: "0x21be370D5312f44cB42ce377BC9b8a0cEF1A4C83"
  whitelist:
    - "0x21be370D5312f44cB42ce377BC9b8a0cEF1A4C83"
    - "0x04068DA6C83AFCFA0e13ba15A6696662335D5B75"
  min_liquidity_base: "0.5"
  min_liquidity_providers: 3
logging:
  level: debug
snapshot:
  path: /tmp/snapshot.json
"#,
        )
        .unwrap();

        let config = settings.pricing.build().unwrap();
        assert_eq!(config.base_token, "0x21be370d5312f44cb42ce377bc9b8a0cef1a4c83");
        assert_eq!(config.whitelist.len(), 2);
        assert_eq!(config.min_liquidity_base, parse_decimal("0.5").unwrap());
        assert_eq!(config.min_liquidity_providers, 3);
        // Untouched keys keep their defaults
        assert_eq!(config.reference_pool, "0xc94b4961478132cc14e49c7c2c00771066af3870");
        assert_eq!(config.min_usd_new_pairs, BigDecimal::from(1));

        assert_eq!(settings.logging.level_filter().unwrap(), LevelFilter::Debug);
        assert_eq!(settings.snapshot.path.as_deref(), Some("/tmp/snapshot.json"));
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let settings = Settings::from_yaml_str("pricing:\n  reference_pool: \"0xdead\"\n").unwrap();
        let err = settings.pricing.build().unwrap_err();
        assert!(format!("{err:#}").contains("pricing.reference_pool"));
    }

    #[test]
    fn test_invalid_threshold_is_rejected() {
        let settings =
            Settings::from_yaml_str("pricing:\n  min_usd_new_pairs: \"one\"\n").unwrap();
        assert!(settings.pricing.build().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let logging = LoggingSettings {
            level: "loud".to_string(),
        };
        assert!(logging.level_filter().is_err());
    }
}
