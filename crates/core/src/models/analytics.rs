use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::asset::AssetKey;

/// Valuation of a portfolio against one snapshot of market rates.
///
/// Derived and ephemeral: recomputed on every request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationSnapshot {
    pub portfolio_id: Uuid,

    /// Σ amount × cost price
    pub total_cost: f64,

    /// Σ amount × resolved sell price (cost basis where no price resolved)
    pub total_value: f64,

    /// total_value − total_cost
    pub pnl: f64,

    /// pnl / total_cost × 100, or 0 when nothing was invested
    pub pnl_percent: f64,

    pub asset_count: usize,

    pub computed_at: DateTime<Utc>,

    /// Latest rate date the prices were taken from. `None` for an empty portfolio.
    pub snapshot_date: Option<DateTime<Utc>>,

    /// Per-holding breakdown, in the order the holdings were supplied.
    pub positions: Vec<HoldingValuation>,
}

impl ValuationSnapshot {
    /// The all-zero snapshot returned for a portfolio without holdings.
    pub fn empty(portfolio_id: Uuid, computed_at: DateTime<Utc>) -> Self {
        Self {
            portfolio_id,
            total_cost: 0.0,
            total_value: 0.0,
            pnl: 0.0,
            pnl_percent: 0.0,
            asset_count: 0,
            computed_at,
            snapshot_date: None,
            positions: Vec::new(),
        }
    }
}

/// Valuation of a single holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingValuation {
    pub holding_id: Uuid,
    pub asset: AssetKey,
    pub amount: f64,
    pub cost: f64,
    pub value: f64,
    /// Sell price used for `value`; `None` means the cost basis was substituted.
    pub resolved_price: Option<f64>,
    pub price_date: Option<DateTime<Utc>>,
}

impl HoldingValuation {
    pub fn is_priced(&self) -> bool {
        self.resolved_price.is_some()
    }
}

/// Summary payload handed to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub portfolio_id: Uuid,
    pub portfolio_name: String,
    pub total_cost: f64,
    pub total_value: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
    pub asset_count: usize,
    pub last_updated: DateTime<Utc>,
}

impl PortfolioSummary {
    pub fn from_snapshot(portfolio_name: impl Into<String>, snapshot: &ValuationSnapshot) -> Self {
        Self {
            portfolio_id: snapshot.portfolio_id,
            portfolio_name: portfolio_name.into(),
            total_cost: snapshot.total_cost,
            total_value: snapshot.total_value,
            pnl: snapshot.pnl,
            pnl_percent: snapshot.pnl_percent,
            asset_count: snapshot.asset_count,
            last_updated: snapshot.computed_at,
        }
    }
}
