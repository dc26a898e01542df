use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Token metadata and its last derived price.
///
/// Primary Key: id (lowercase address)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,

    /// Price in base currency as of the last derivation. Zero means unpriced.
    #[serde(default)]
    pub derived_base: BigDecimal,
}

fn default_decimals() -> u8 {
    18
}

impl Token {
    pub fn new(id: &str, symbol: &str, decimals: u8) -> Self {
        Self {
            // Always lowercase addresses for consistent comparisons
            id: id.to_lowercase(),
            symbol: symbol.to_string(),
            decimals,
            derived_base: BigDecimal::default(),
        }
    }

    pub fn with_derived_base(mut self, derived_base: BigDecimal) -> Self {
        self.derived_base = derived_base;
        self
    }
}
