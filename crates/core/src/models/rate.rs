use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::asset::{AssetKey, AssetType};
use crate::errors::CoreError;

/// A single buy/sell price observation for an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatePoint {
    pub asset_type: AssetType,
    pub asset_name: String,
    pub timestamp: DateTime<Utc>,
    pub buy_price: f64,
    pub sell_price: f64,
}

impl RatePoint {
    pub fn new(
        key: &AssetKey,
        timestamp: DateTime<Utc>,
        buy_price: f64,
        sell_price: f64,
    ) -> Self {
        Self {
            asset_type: key.asset_type,
            asset_name: key.name.clone(),
            timestamp,
            buy_price,
            sell_price,
        }
    }

    pub fn key(&self) -> AssetKey {
        AssetKey::new(self.asset_type, self.asset_name.clone())
    }

    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Prices must be finite and non-negative.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (label, price) in [("buy", self.buy_price), ("sell", self.sell_price)] {
            if !price.is_finite() || price < 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "Invalid {label} price for {}: {price} (must be finite and non-negative)",
                    self.key()
                )));
            }
        }
        Ok(())
    }
}

/// Answer to "what was the price of X on day D?".
///
/// When no rate exists on `requested_date` itself, the closest earlier rate is used
/// and `is_exact_match` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub name: String,
    pub asset_type: AssetType,
    pub requested_date: NaiveDate,
    pub actual_date: NaiveDate,
    pub buy_price: f64,
    pub sell_price: f64,
    pub is_exact_match: bool,
}
