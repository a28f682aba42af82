use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::asset::{AssetKey, AssetType};
use crate::errors::CoreError;

/// A recorded position in an asset: how much was bought, at what unit cost, and when.
///
/// Holdings are read-only inputs to valuation. The engine never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: Uuid,
    pub asset_type: AssetType,
    pub asset_name: String,
    /// Units held (always positive)
    pub amount: f64,
    /// Unit price paid at purchase
    pub cost_price: f64,
    pub purchase_date: DateTime<Utc>,
}

impl Holding {
    pub fn new(
        asset_type: AssetType,
        asset_name: impl Into<String>,
        amount: f64,
        cost_price: f64,
        purchase_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset_type,
            asset_name: asset_name.into(),
            amount,
            cost_price,
            purchase_date,
        }
    }

    /// Composite key used to join this holding against rate data.
    pub fn key(&self) -> AssetKey {
        AssetKey::new(self.asset_type, self.asset_name.clone())
    }

    /// Cost basis of the whole position (`amount × cost_price`).
    pub fn cost(&self) -> f64 {
        self.amount * self.cost_price
    }

    /// Calendar day (UTC) the position was opened.
    pub fn purchase_day(&self) -> NaiveDate {
        self.purchase_date.date_naive()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.asset_name.trim().is_empty() {
            return Err(CoreError::ValidationError("Asset name must not be empty".into()));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Holding amount must be positive, got {}",
                self.amount
            )));
        }
        if !self.cost_price.is_finite() || self.cost_price <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Holding cost price must be positive, got {}",
                self.cost_price
            )));
        }
        Ok(())
    }
}
