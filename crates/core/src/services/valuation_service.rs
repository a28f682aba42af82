use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::analytics::{HoldingValuation, ValuationSnapshot};
use crate::models::asset::AssetKey;
use crate::models::holding::Holding;
use crate::models::rate::RatePoint;
use crate::services::price_resolver::PriceResolver;
use crate::utils::time_utils::round_money;

/// Computes cost, market value and P&L of a portfolio.
///
/// Market value always uses the sell price. A holding whose asset has no price is
/// valued at its cost basis, so one missing rate never fails the whole summary.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Value `holdings` against the latest rate date in the store.
    ///
    /// An empty portfolio yields the zero snapshot without touching the repository.
    /// A non-empty portfolio against an empty store is `NoPriceDataAvailable`.
    pub async fn compute_summary(
        &self,
        resolver: &PriceResolver,
        portfolio_id: Uuid,
        holdings: &[Holding],
        computed_at: DateTime<Utc>,
    ) -> Result<ValuationSnapshot, CoreError> {
        if holdings.is_empty() {
            return Ok(ValuationSnapshot::empty(portfolio_id, computed_at));
        }

        let snapshot_date = match resolver.latest_snapshot_date().await? {
            Some(date) => date,
            None => {
                log::warn!(
                    "No rates in [{}], cannot value portfolio {portfolio_id}",
                    resolver.repository_name()
                );
                return Err(CoreError::NoPriceDataAvailable);
            }
        };

        self.compute_summary_as_of(resolver, portfolio_id, holdings, snapshot_date, computed_at)
            .await
    }

    /// Value `holdings` as of an explicit snapshot date.
    pub async fn compute_summary_as_of(
        &self,
        resolver: &PriceResolver,
        portfolio_id: Uuid,
        holdings: &[Holding],
        snapshot_date: DateTime<Utc>,
        computed_at: DateTime<Utc>,
    ) -> Result<ValuationSnapshot, CoreError> {
        if holdings.is_empty() {
            return Ok(ValuationSnapshot::empty(portfolio_id, computed_at));
        }

        let keys: Vec<AssetKey> = holdings.iter().map(Holding::key).collect();
        let prices = resolver.resolve_snapshot(&keys, snapshot_date).await?;

        Ok(value_holdings(
            portfolio_id,
            holdings,
            &prices,
            snapshot_date,
            computed_at,
        ))
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure valuation step: join holdings with already-resolved prices and total them up.
pub fn value_holdings(
    portfolio_id: Uuid,
    holdings: &[Holding],
    prices: &HashMap<AssetKey, RatePoint>,
    snapshot_date: DateTime<Utc>,
    computed_at: DateTime<Utc>,
) -> ValuationSnapshot {
    let mut total_cost = 0.0;
    let mut total_value = 0.0;
    let mut positions = Vec::with_capacity(holdings.len());

    for holding in holdings {
        let key = holding.key();
        let cost = holding.cost();
        let (value, resolved_price, price_date) = match prices.get(&key) {
            Some(rate) => (
                holding.amount * rate.sell_price,
                Some(rate.sell_price),
                Some(rate.timestamp),
            ),
            None => {
                log::warn!(
                    "No price for {key} at or before {}, valuing holding {} at cost",
                    snapshot_date.date_naive(),
                    holding.id
                );
                (cost, None, None)
            }
        };

        total_cost += cost;
        total_value += value;
        positions.push(HoldingValuation {
            holding_id: holding.id,
            asset: key,
            amount: holding.amount,
            cost: round_money(cost),
            value: round_money(value),
            resolved_price,
            price_date,
        });
    }

    let pnl = total_value - total_cost;
    let pnl_percent = if total_cost > 0.0 {
        (pnl / total_cost) * 100.0
    } else {
        0.0
    };

    ValuationSnapshot {
        portfolio_id,
        total_cost: round_money(total_cost),
        total_value: round_money(total_value),
        pnl: round_money(pnl),
        pnl_percent: round_money(pnl_percent),
        asset_count: holdings.len(),
        computed_at,
        snapshot_date: Some(snapshot_date),
        positions,
    }
}
