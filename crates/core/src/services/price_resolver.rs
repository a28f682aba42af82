use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::asset::{AssetKey, AssetType};
use crate::models::performance::{
    ChangePeriod, ComparisonPoint, ComparisonSeries, PriceChange, ReturnCalculation,
    ReturnRequest,
};
use crate::models::rate::{PriceQuote, RatePoint};
use crate::repository::traits::RateRepository;
use crate::utils::time_utils::{day_bucket, end_of_day, round_money, start_of_day};

/// Resolves asset prices against the rate repository.
///
/// Every lookup is a backward join: the answer is the latest rate at or before the
/// requested instant. Prices are never interpolated and never taken from the future.
/// Both the valuation and the series engines go through here, so "as of now" and
/// "as of a past date" share one code path.
pub struct PriceResolver {
    repository: Arc<dyn RateRepository>,
}

impl PriceResolver {
    pub fn new(repository: Arc<dyn RateRepository>) -> Self {
        Self { repository }
    }

    pub fn repository_name(&self) -> &str {
        self.repository.name()
    }

    /// Latest rate for `key` at or before `at_or_before`, or `None` if the asset has no
    /// history that early.
    pub async fn resolve_price(
        &self,
        key: &AssetKey,
        at_or_before: DateTime<Utc>,
    ) -> Result<Option<RatePoint>, CoreError> {
        self.repository.find_latest_before_or_at(key, at_or_before).await
    }

    /// The snapshot date: newest rate timestamp across the whole store.
    pub async fn latest_snapshot_date(&self) -> Result<Option<DateTime<Utc>>, CoreError> {
        self.repository.find_latest_global_date().await
    }

    /// Price every asset in `keys` as of the day containing `snapshot_date`.
    ///
    /// 1. Batch-fetch all rates of the held assets inside the snapshot day, in one query.
    ///    When an asset has several rows that day, the latest one wins.
    /// 2. Assets missing from that day fall back to their latest rate before the end of
    ///    the snapshot day.
    ///
    /// Assets with no rate at all are absent from the returned map.
    pub async fn resolve_snapshot(
        &self,
        keys: &[AssetKey],
        snapshot_date: DateTime<Utc>,
    ) -> Result<HashMap<AssetKey, RatePoint>, CoreError> {
        let distinct: Vec<AssetKey> = keys.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
        if distinct.is_empty() {
            return Ok(HashMap::new());
        }

        let (bucket_start, bucket_end) = day_bucket(snapshot_date);
        let batch = self
            .repository
            .find_batch_in_date_bucket(&distinct, bucket_start, bucket_end)
            .await?;

        let mut prices: HashMap<AssetKey, RatePoint> = HashMap::with_capacity(distinct.len());
        for rate in batch {
            let key = rate.key();
            let newer = prices
                .get(&key)
                .map_or(true, |existing| rate.timestamp > existing.timestamp);
            if newer {
                prices.insert(key, rate);
            }
        }

        log::debug!(
            "Snapshot {} [{}]: {}/{} assets priced from the day bucket",
            bucket_start.date_naive(),
            self.repository.name(),
            prices.len(),
            distinct.len()
        );

        // Stale assets: last known rate before the end of the snapshot day
        for key in &distinct {
            if prices.contains_key(key) {
                continue;
            }
            if let Some(rate) = self.resolve_price(key, bucket_end).await? {
                log::debug!("{key} priced from stale rate of {}", rate.timestamp);
                prices.insert(key.clone(), rate);
            }
        }

        Ok(prices)
    }

    /// Price of an asset on a calendar day, falling back to the closest earlier rate.
    ///
    /// Dates after `today` are rejected; there is no data for them by definition.
    pub async fn price_at_date(
        &self,
        key: &AssetKey,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<PriceQuote, CoreError> {
        if date > today {
            return Err(CoreError::InvalidDate(format!(
                "cannot query prices for a future date ({date})"
            )));
        }

        let rate = self
            .resolve_price(key, end_of_day(date))
            .await?
            .ok_or_else(|| CoreError::PriceNotAvailable {
                asset: key.to_string(),
                date: date.to_string(),
            })?;

        let actual_date = rate.day();
        Ok(PriceQuote {
            name: rate.asset_name,
            asset_type: rate.asset_type,
            requested_date: date,
            actual_date,
            buy_price: rate.buy_price,
            sell_price: rate.sell_price,
            is_exact_match: actual_date == date,
        })
    }

    /// Every rate recorded on the latest day in the store, newest first.
    /// Empty when the store holds no rates.
    pub async fn latest_rates(
        &self,
        asset_type: Option<AssetType>,
    ) -> Result<Vec<RatePoint>, CoreError> {
        let Some(latest) = self.latest_snapshot_date().await? else {
            log::warn!("Rate store [{}] is empty", self.repository.name());
            return Ok(Vec::new());
        };

        let (bucket_start, bucket_end) = day_bucket(latest);
        let mut rates = self
            .repository
            .find_in_date_bucket(asset_type, bucket_start, bucket_end)
            .await?;
        rates.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.asset_type.cmp(&b.asset_type))
                .then_with(|| a.asset_name.cmp(&b.asset_name))
        });
        Ok(rates)
    }

    /// Every rate recorded on `date`, oldest first.
    pub async fn hourly_rates(
        &self,
        date: NaiveDate,
        asset_type: Option<AssetType>,
    ) -> Result<Vec<RatePoint>, CoreError> {
        let mut rates = self
            .repository
            .find_in_date_bucket(asset_type, start_of_day(date), end_of_day(date))
            .await?;
        rates.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.asset_type.cmp(&b.asset_type))
                .then_with(|| a.asset_name.cmp(&b.asset_name))
        });
        Ok(rates)
    }

    /// Change of the latest sell price against the rate one `period` earlier.
    ///
    /// "Latest" is the asset's newest rate at or before the store's snapshot date; the
    /// earlier rate is the backward join at that instant minus the period.
    pub async fn price_change(
        &self,
        key: &AssetKey,
        period: ChangePeriod,
    ) -> Result<PriceChange, CoreError> {
        let snapshot = self
            .latest_snapshot_date()
            .await?
            .ok_or(CoreError::NoPriceDataAvailable)?;

        let current = self
            .resolve_price(key, snapshot)
            .await?
            .ok_or_else(|| CoreError::PriceNotAvailable {
                asset: key.to_string(),
                date: snapshot.date_naive().to_string(),
            })?;

        let reference = period.reference(current.timestamp).ok_or_else(|| {
            CoreError::InvalidDate(format!("no {period} reference before {}", current.timestamp))
        })?;
        let previous = self
            .resolve_price(key, reference)
            .await?
            .ok_or_else(|| CoreError::PriceNotAvailable {
                asset: key.to_string(),
                date: reference.date_naive().to_string(),
            })?;

        Ok(PriceChange {
            name: current.asset_name.clone(),
            asset_type: current.asset_type,
            period,
            current_price: current.sell_price,
            current_date: current.timestamp,
            previous_price: previous.sell_price,
            previous_date: previous.timestamp,
            change: round_money(current.sell_price - previous.sell_price),
            change_percent: percent_change(previous.sell_price, current.sell_price),
        })
    }

    /// Simulate buying `request.amount` units on the investment date and valuing them on
    /// the comparison date (or the latest rate date when none is given).
    pub async fn calculate_return(
        &self,
        request: &ReturnRequest,
        today: NaiveDate,
    ) -> Result<ReturnCalculation, CoreError> {
        request.validate()?;
        for date in std::iter::once(request.investment_date).chain(request.comparison_date) {
            if date > today {
                return Err(CoreError::InvalidDate(format!(
                    "cannot simulate returns at a future date ({date})"
                )));
            }
        }

        let key = request.key();
        let comparison_date = match request.comparison_date {
            Some(date) => date,
            None => self
                .latest_snapshot_date()
                .await?
                .ok_or(CoreError::NoPriceDataAvailable)?
                .date_naive(),
        };

        let start = self.required_price(&key, request.investment_date).await?;
        let end = self.required_price(&key, comparison_date).await?;

        let start_value = request.amount * start.sell_price;
        let end_value = request.amount * end.sell_price;
        log::debug!(
            "Return of {} × {key}: {} → {comparison_date}",
            request.amount,
            request.investment_date
        );

        Ok(ReturnCalculation {
            name: key.name,
            asset_type: key.asset_type,
            amount: request.amount,
            investment_date: request.investment_date,
            comparison_date,
            start_price: start.sell_price,
            start_price_date: start.day(),
            end_price: end.sell_price,
            end_price_date: end.day(),
            start_value: round_money(start_value),
            end_value: round_money(end_value),
            profit: round_money(end_value - start_value),
            profit_percent: percent_change(start_value, end_value),
        })
    }

    /// Daily sell prices of several assets between `from` and `to`.
    ///
    /// One row per asset per day (the day's last observation). With `normalize`, each
    /// series is rebased so its first point is 100.
    pub async fn compare_assets(
        &self,
        keys: &[AssetKey],
        from: NaiveDate,
        to: NaiveDate,
        normalize: bool,
    ) -> Result<Vec<ComparisonSeries>, CoreError> {
        if from > to {
            return Err(CoreError::InvalidDateRange(format!(
                "start date ({from}) must not be after end date ({to})"
            )));
        }

        let mut distinct: Vec<AssetKey> = Vec::with_capacity(keys.len());
        for key in keys {
            if !distinct.contains(key) {
                distinct.push(key.clone());
            }
        }
        if distinct.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self
            .repository
            .find_batch_in_date_bucket(&distinct, start_of_day(from), end_of_day(to))
            .await?;

        let mut by_key: HashMap<AssetKey, Vec<RatePoint>> = HashMap::new();
        for row in rows {
            by_key.entry(row.key()).or_default().push(row);
        }

        Ok(distinct
            .into_iter()
            .map(|key| {
                let mut rows = by_key.remove(&key).unwrap_or_default();
                rows.sort_by_key(|r| r.timestamp);

                let mut points: Vec<ComparisonPoint> = Vec::with_capacity(rows.len());
                for row in rows {
                    let point = ComparisonPoint {
                        date: row.day(),
                        value: row.sell_price,
                    };
                    if points.last().is_some_and(|last| last.date == point.date) {
                        points.pop();
                    }
                    points.push(point);
                }

                let base = points.first().map(|p| p.value).filter(|v| *v > 0.0);
                if let (true, Some(base)) = (normalize, base) {
                    for p in &mut points {
                        p.value = round_money(p.value / base * 100.0);
                    }
                }

                ComparisonSeries {
                    name: key.name,
                    asset_type: key.asset_type,
                    normalized: normalize && base.is_some(),
                    points,
                }
            })
            .collect())
    }

    async fn required_price(&self, key: &AssetKey, date: NaiveDate) -> Result<RatePoint, CoreError> {
        self.resolve_price(key, end_of_day(date))
            .await?
            .ok_or_else(|| CoreError::PriceNotAvailable {
                asset: key.to_string(),
                date: date.to_string(),
            })
    }
}

/// Percent change from `from` to `to`, rounded; 0 when `from` is not positive.
fn percent_change(from: f64, to: f64) -> f64 {
    if from > 0.0 {
        round_money((to - from) / from * 100.0)
    } else {
        0.0
    }
}
