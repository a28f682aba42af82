use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::asset::{AssetKey, AssetType};
use crate::errors::CoreError;

/// Look-back window of a single-asset price change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangePeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl ChangePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangePeriod::Daily => "daily",
            ChangePeriod::Weekly => "weekly",
            ChangePeriod::Monthly => "monthly",
            ChangePeriod::Yearly => "yearly",
        }
    }

    /// Instant one period before `latest`. Month and year steps are calendar-aware.
    pub fn reference(&self, latest: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ChangePeriod::Daily => latest.checked_sub_days(Days::new(1)),
            ChangePeriod::Weekly => latest.checked_sub_days(Days::new(7)),
            ChangePeriod::Monthly => latest.checked_sub_months(Months::new(1)),
            ChangePeriod::Yearly => latest.checked_sub_months(Months::new(12)),
        }
    }
}

impl std::fmt::Display for ChangePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangePeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "1d" => Ok(ChangePeriod::Daily),
            "weekly" | "1w" => Ok(ChangePeriod::Weekly),
            "monthly" | "1m" => Ok(ChangePeriod::Monthly),
            "yearly" | "1y" => Ok(ChangePeriod::Yearly),
            other => Err(CoreError::InvalidPeriod(format!(
                "'{other}' (expected daily, weekly, monthly or yearly)"
            ))),
        }
    }
}

/// Sell-price movement of one asset over a `ChangePeriod`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceChange {
    pub name: String,
    pub asset_type: AssetType,
    pub period: ChangePeriod,
    pub current_price: f64,
    pub current_date: DateTime<Utc>,
    pub previous_price: f64,
    pub previous_date: DateTime<Utc>,
    pub change: f64,
    pub change_percent: f64,
}

/// "What if I had bought `amount` units on `investment_date`?"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub asset_type: AssetType,
    pub asset_name: String,
    pub amount: f64,
    pub investment_date: NaiveDate,
    /// Defaults to the latest rate date in the store
    #[serde(default)]
    pub comparison_date: Option<NaiveDate>,
}

impl ReturnRequest {
    pub fn new(key: &AssetKey, amount: f64, investment_date: NaiveDate) -> Self {
        Self {
            asset_type: key.asset_type,
            asset_name: key.name.clone(),
            amount,
            investment_date,
            comparison_date: None,
        }
    }

    pub fn compared_on(mut self, date: NaiveDate) -> Self {
        self.comparison_date = Some(date);
        self
    }

    pub fn key(&self) -> AssetKey {
        AssetKey::new(self.asset_type, self.asset_name.clone())
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.asset_name.trim().is_empty() {
            return Err(CoreError::ValidationError("Asset name must not be empty".into()));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Amount must be positive, got {}",
                self.amount
            )));
        }
        if let Some(comparison) = self.comparison_date {
            if comparison < self.investment_date {
                return Err(CoreError::InvalidDateRange(format!(
                    "comparison date ({comparison}) is before investment date ({})",
                    self.investment_date
                )));
            }
        }
        Ok(())
    }
}

/// Result of a return simulation. Both ends use the sell price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnCalculation {
    pub name: String,
    pub asset_type: AssetType,
    pub amount: f64,
    pub investment_date: NaiveDate,
    pub comparison_date: NaiveDate,
    pub start_price: f64,
    pub start_price_date: NaiveDate,
    pub end_price: f64,
    pub end_price_date: NaiveDate,
    pub start_value: f64,
    pub end_value: f64,
    pub profit: f64,
    pub profit_percent: f64,
}

/// One asset's daily sell prices over a range, raw or rebased to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSeries {
    pub name: String,
    pub asset_type: AssetType,
    pub normalized: bool,
    pub points: Vec<ComparisonPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPoint {
    pub date: NaiveDate,
    pub value: f64,
}
