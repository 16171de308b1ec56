use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::CoreError;

/// A retailer the collector knows how to search.
///
/// Serialized as the retailer's domain (`"amazon.com"`), which is how
/// listings identify their store on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Store {
    Amazon,
    Walmart,
    Ebay,
    BestBuy,
    Target,
}

impl Store {
    pub const ALL: [Store; 5] = [
        Store::Amazon,
        Store::Walmart,
        Store::Ebay,
        Store::BestBuy,
        Store::Target,
    ];

    /// Short identifier used in configuration (`"bestbuy"`).
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Store::Amazon => "amazon",
            Store::Walmart => "walmart",
            Store::Ebay => "ebay",
            Store::BestBuy => "bestbuy",
            Store::Target => "target",
        }
    }

    #[must_use]
    pub fn domain(self) -> &'static str {
        match self {
            Store::Amazon => "amazon.com",
            Store::Walmart => "walmart.com",
            Store::Ebay => "ebay.com",
            Store::BestBuy => "bestbuy.com",
            Store::Target => "target.com",
        }
    }

    /// Human-readable retailer name for summaries.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Store::Amazon => "Amazon",
            Store::Walmart => "Walmart",
            Store::Ebay => "eBay",
            Store::BestBuy => "Best Buy",
            Store::Target => "Target",
        }
    }
}

impl std::fmt::Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.domain())
    }
}

impl FromStr for Store {
    type Err = CoreError;

    /// Accepts `"amazon"`, `"amazon.com"`, `"www.amazon.com"`, `"Best Buy"`,
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let host = lower.strip_prefix("www.").unwrap_or(&lower);
        let id: String = host
            .strip_suffix(".com")
            .unwrap_or(host)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        Store::ALL
            .into_iter()
            .find(|store| store.id() == id)
            .ok_or_else(|| CoreError::UnknownStore(s.to_string()))
    }
}

impl Serialize for Store {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.domain())
    }
}

impl<'de> Deserialize<'de> for Store {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_id_domain_and_www_forms() {
        assert_eq!("amazon".parse::<Store>().unwrap(), Store::Amazon);
        assert_eq!("bestbuy.com".parse::<Store>().unwrap(), Store::BestBuy);
        assert_eq!("www.eBay.com".parse::<Store>().unwrap(), Store::Ebay);
        assert_eq!("Best Buy".parse::<Store>().unwrap(), Store::BestBuy);
    }

    #[test]
    fn rejects_unknown_store() {
        assert!(matches!(
            "newegg.com".parse::<Store>(),
            Err(CoreError::UnknownStore(_))
        ));
    }

    #[test]
    fn serializes_as_domain() {
        let json = serde_json::to_string(&Store::BestBuy).unwrap();
        assert_eq!(json, "\"bestbuy.com\"");
        let back: Store = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Store::BestBuy);
    }
}
