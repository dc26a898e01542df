use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// USD price of the base currency at the time of the current event.
///
/// Handed to the trackers as a read-only snapshot. A zero price means the reference
/// pool has not been created yet, not that the asset is worthless.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub base_price_usd: BigDecimal,
}

impl Bundle {
    pub fn new(base_price_usd: BigDecimal) -> Self {
        Self { base_price_usd }
    }

    pub fn is_price_known(&self) -> bool {
        !self.base_price_usd.is_zero()
    }
}
