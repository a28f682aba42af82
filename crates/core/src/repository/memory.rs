use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::traits::{HoldingsProvider, RateRepository};
use crate::errors::CoreError;
use crate::models::asset::{AssetKey, AssetType};
use crate::models::holding::Holding;
use crate::models::portfolio::Portfolio;
use crate::models::rate::RatePoint;
use crate::utils::time_utils::{day_bucket, end_of_day, hour_bucket, start_of_day};

/// Time-ordered rate history for every asset.
///
/// Each asset's points are kept sorted by timestamp, so lookups are binary searches.
/// At most one point exists per asset per bucket (an hour for intraday rows, a day
/// for consolidated rows); inserting into an occupied bucket replaces its point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateStore {
    /// asset → points sorted by timestamp ascending
    pub entries: HashMap<AssetKey, Vec<RatePoint>>,
}

/// Outcome of collapsing one day of intraday rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsolidationSummary {
    /// Assets that had rows on the day
    pub assets: usize,
    /// Rows present on the day before consolidation
    pub rows_before: usize,
}

impl RateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an intraday observation, replacing any point in the same UTC hour.
    pub fn upsert_hourly(&mut self, point: RatePoint) -> Result<(), CoreError> {
        let (start, end) = hour_bucket(point.timestamp);
        self.upsert_in_bucket(point, start, end)
    }

    /// Insert a daily observation, replacing any point on the same UTC day.
    pub fn upsert_daily(&mut self, point: RatePoint) -> Result<(), CoreError> {
        let (start, end) = day_bucket(point.timestamp);
        self.upsert_in_bucket(point, start, end)
    }

    fn upsert_in_bucket(
        &mut self,
        point: RatePoint,
        bucket_start: DateTime<Utc>,
        bucket_end: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        point.validate()?;
        let entries = self.entries.entry(point.key()).or_default();
        let lo = entries.partition_point(|p| p.timestamp < bucket_start);
        let hi = entries.partition_point(|p| p.timestamp <= bucket_end);
        entries.splice(lo..hi, std::iter::once(point));
        Ok(())
    }

    /// Latest point for `key` at or before `at`.
    pub fn latest_before_or_at(&self, key: &AssetKey, at: DateTime<Utc>) -> Option<&RatePoint> {
        let entries = self.entries.get(key)?;
        let idx = entries.partition_point(|p| p.timestamp <= at);
        idx.checked_sub(1).map(|i| &entries[i])
    }

    /// Newest timestamp across all assets.
    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.entries
            .values()
            .filter_map(|points| points.last())
            .map(|p| p.timestamp)
            .max()
    }

    /// Points for `key` with `from <= timestamp <= to`.
    pub fn range(&self, key: &AssetKey, from: DateTime<Utc>, to: DateTime<Utc>) -> &[RatePoint] {
        match self.entries.get(key) {
            Some(entries) => {
                let lo = entries.partition_point(|p| p.timestamp < from);
                let hi = entries.partition_point(|p| p.timestamp <= to);
                if lo < hi {
                    &entries[lo..hi]
                } else {
                    &[]
                }
            }
            None => &[],
        }
    }

    /// Collapse every asset's rows on `date` into a single row stamped at the start of
    /// the day, carrying the day's last observation.
    pub fn consolidate_day(&mut self, date: NaiveDate) -> ConsolidationSummary {
        let (start, end) = (start_of_day(date), end_of_day(date));
        let mut summary = ConsolidationSummary::default();

        for entries in self.entries.values_mut() {
            let lo = entries.partition_point(|p| p.timestamp < start);
            let hi = entries.partition_point(|p| p.timestamp <= end);
            if lo >= hi {
                continue;
            }
            let mut last = entries[hi - 1].clone();
            last.timestamp = start;
            summary.assets += 1;
            summary.rows_before += hi - lo;
            entries.splice(lo..hi, std::iter::once(last));
        }

        summary
    }

    /// Re-establish the ordering invariant on data that did not go through the upserts
    /// (e.g. a snapshot read from disk).
    ///
    /// Every point must be valid and filed under its own key. Points are sorted by
    /// timestamp; of several points sharing a timestamp the last one is kept.
    /// Returns the number of assets whose points had to be reordered.
    pub fn normalize(&mut self) -> Result<usize, CoreError> {
        let mut repaired = 0;
        self.entries.retain(|_, points| !points.is_empty());

        for (key, points) in self.entries.iter_mut() {
            for point in points.iter() {
                point.validate()?;
                if point.asset_type != key.asset_type || point.asset_name != key.name {
                    return Err(CoreError::ValidationError(format!(
                        "point for {} filed under {key}",
                        point.key()
                    )));
                }
            }

            if points.windows(2).all(|w| w[0].timestamp < w[1].timestamp) {
                continue;
            }

            points.sort_by_key(|p| p.timestamp);
            // dedup keeps the first of a run; reverse so the last one written survives
            points.reverse();
            points.dedup_by_key(|p| p.timestamp);
            points.reverse();
            repaired += 1;
        }

        Ok(repaired)
    }

    /// Total number of stored points across all assets.
    pub fn total_entries(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }

    /// Number of distinct assets with at least one point.
    pub fn asset_count(&self) -> usize {
        self.entries.values().filter(|v| !v.is_empty()).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// `RateRepository` over an in-process `RateStore`.
#[derive(Debug, Default)]
pub struct InMemoryRateRepository {
    store: RwLock<RateStore>,
}

impl InMemoryRateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_store(store: RateStore) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    /// Clone of the current store contents (e.g. for persisting to disk).
    pub fn snapshot(&self) -> Result<RateStore, CoreError> {
        Ok(self.read()?.clone())
    }

    pub fn upsert_hourly(&self, point: RatePoint) -> Result<(), CoreError> {
        self.write()?.upsert_hourly(point)
    }

    pub fn upsert_daily(&self, point: RatePoint) -> Result<(), CoreError> {
        self.write()?.upsert_daily(point)
    }

    /// Insert many daily observations. Stops at the first invalid point.
    pub fn extend_daily(&self, points: impl IntoIterator<Item = RatePoint>) -> Result<(), CoreError> {
        let mut store = self.write()?;
        for point in points {
            store.upsert_daily(point)?;
        }
        Ok(())
    }

    pub fn consolidate_day(&self, date: NaiveDate) -> Result<ConsolidationSummary, CoreError> {
        let summary = self.write()?.consolidate_day(date);
        log::debug!(
            "Consolidated {} rows of {} assets on {date}",
            summary.rows_before,
            summary.assets
        );
        Ok(summary)
    }

    pub fn total_entries(&self) -> Result<usize, CoreError> {
        Ok(self.read()?.total_entries())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, RateStore>, CoreError> {
        self.store
            .read()
            .map_err(|_| CoreError::Repository("rate store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, RateStore>, CoreError> {
        self.store
            .write()
            .map_err(|_| CoreError::Repository("rate store lock poisoned".into()))
    }
}

#[async_trait]
impl RateRepository for InMemoryRateRepository {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn find_latest_before_or_at(
        &self,
        key: &AssetKey,
        at_or_before: DateTime<Utc>,
    ) -> Result<Option<RatePoint>, CoreError> {
        Ok(self.read()?.latest_before_or_at(key, at_or_before).cloned())
    }

    async fn find_latest_global_date(&self) -> Result<Option<DateTime<Utc>>, CoreError> {
        Ok(self.read()?.latest_timestamp())
    }

    async fn find_batch_in_date_bucket(
        &self,
        keys: &[AssetKey],
        bucket_start: DateTime<Utc>,
        bucket_end: DateTime<Utc>,
    ) -> Result<Vec<RatePoint>, CoreError> {
        let store = self.read()?;
        Ok(keys
            .iter()
            .flat_map(|key| store.range(key, bucket_start, bucket_end).iter().cloned())
            .collect())
    }

    async fn find_in_date_bucket(
        &self,
        asset_type: Option<AssetType>,
        bucket_start: DateTime<Utc>,
        bucket_end: DateTime<Utc>,
    ) -> Result<Vec<RatePoint>, CoreError> {
        let store = self.read()?;
        Ok(store
            .entries
            .iter()
            .filter(|(key, _)| asset_type.map_or(true, |t| key.asset_type == t))
            .flat_map(|(key, _)| store.range(key, bucket_start, bucket_end).iter().cloned())
            .collect())
    }
}

type PortfolioMap = HashMap<Uuid, (Portfolio, Vec<Holding>)>;

/// `HoldingsProvider` over in-process maps, keyed by portfolio id.
#[derive(Debug, Default)]
pub struct InMemoryHoldingsProvider {
    portfolios: RwLock<PortfolioMap>,
}

impl InMemoryHoldingsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a portfolio (replacing metadata if it already exists; holdings are kept).
    pub fn add_portfolio(&self, portfolio: Portfolio) -> Result<(), CoreError> {
        let mut portfolios = self.write()?;
        match portfolios.get_mut(&portfolio.id) {
            Some((existing, _)) => *existing = portfolio,
            None => {
                portfolios.insert(portfolio.id, (portfolio, Vec::new()));
            }
        }
        Ok(())
    }

    /// Attach a validated holding to an existing portfolio.
    pub fn add_holding(&self, portfolio_id: Uuid, holding: Holding) -> Result<Uuid, CoreError> {
        holding.validate()?;
        let mut portfolios = self.write()?;
        let (_, holdings) = portfolios
            .get_mut(&portfolio_id)
            .ok_or_else(|| CoreError::PortfolioNotFound(portfolio_id.to_string()))?;
        let id = holding.id;
        holdings.push(holding);
        Ok(id)
    }

    /// Remove a holding. Returns `false` if it was not present.
    pub fn remove_holding(&self, portfolio_id: Uuid, holding_id: Uuid) -> Result<bool, CoreError> {
        let mut portfolios = self.write()?;
        let (_, holdings) = portfolios
            .get_mut(&portfolio_id)
            .ok_or_else(|| CoreError::PortfolioNotFound(portfolio_id.to_string()))?;
        let before = holdings.len();
        holdings.retain(|h| h.id != holding_id);
        Ok(holdings.len() != before)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, PortfolioMap>, CoreError> {
        self.portfolios
            .read()
            .map_err(|_| CoreError::Repository("holdings lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, PortfolioMap>, CoreError> {
        self.portfolios
            .write()
            .map_err(|_| CoreError::Repository("holdings lock poisoned".into()))
    }
}

#[async_trait]
impl HoldingsProvider for InMemoryHoldingsProvider {
    async fn find_portfolio(&self, portfolio_id: Uuid) -> Result<Option<Portfolio>, CoreError> {
        Ok(self.read()?.get(&portfolio_id).map(|(p, _)| p.clone()))
    }

    async fn list_by_portfolio(&self, portfolio_id: Uuid) -> Result<Vec<Holding>, CoreError> {
        Ok(self
            .read()?
            .get(&portfolio_id)
            .map(|(_, holdings)| holdings.clone())
            .unwrap_or_default())
    }
}
