use anyhow::{bail, Result};
use log::warn;
use rustc_hash::FxHashSet;

use crate::utils::normalize_address;

/// Ordered set of reference tokens trusted for pricing and volume tracking.
///
/// The order is observable: price discovery takes the first whitelist entry that yields a
/// liquid pair. Built once from configuration and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    ordered: Vec<String>,
    members: FxHashSet<String>,
}

impl Whitelist {
    /// Normalize and validate every address. Duplicates keep their first position.
    pub fn new<I, S>(addresses: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut whitelist = Self::default();

        for address in addresses {
            let normalized = normalize_address(address.as_ref())?;
            if !whitelist.members.insert(normalized.clone()) {
                warn!("Duplicate whitelist entry {} ignored", normalized);
                continue;
            }
            whitelist.ordered.push(normalized);
        }

        if whitelist.ordered.is_empty() {
            bail!("whitelist must contain at least one token");
        }

        Ok(whitelist)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.members.contains(token)
    }

    /// Entries in declared order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
