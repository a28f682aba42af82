use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// The category of a tracked asset, as reported by the rate feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    /// Gold products (Gram Altın, Çeyrek Altın, ons, etc.)
    Gold,
    /// Foreign currencies (USD, EUR, GBP, etc.)
    Currency,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Gold => "gold",
            AssetType::Currency => "currency",
        }
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gold" => Ok(AssetType::Gold),
            "currency" => Ok(AssetType::Currency),
            other => Err(CoreError::ValidationError(format!(
                "Unknown asset type '{other}': expected 'gold' or 'currency'"
            ))),
        }
    }
}

/// Composite identity of an asset: `(type, name)`.
///
/// Used as the lookup key wherever prices are joined against holdings.
/// Names are kept verbatim (the feed uses display names such as "Gram Altın").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetKey {
    pub asset_type: AssetType,
    pub name: String,
}

impl AssetKey {
    pub fn new(asset_type: AssetType, name: impl Into<String>) -> Self {
        Self {
            asset_type,
            name: name.into(),
        }
    }

    pub fn gold(name: impl Into<String>) -> Self {
        Self::new(AssetType::Gold, name)
    }

    pub fn currency(name: impl Into<String>) -> Self {
        Self::new(AssetType::Currency, name)
    }
}

impl std::fmt::Display for AssetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.asset_type, self.name)
    }
}
