use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::asset::{AssetKey, AssetType};
use crate::models::holding::Holding;
use crate::models::portfolio::Portfolio;
use crate::models::rate::RatePoint;

/// Read access to the rate store filled by the ingestion pipeline.
///
/// Implementations are append-only from the core's point of view: the engines only read.
/// Any retry policy belongs in the implementation, not in the callers.
#[async_trait]
pub trait RateRepository: Send + Sync {
    /// Human-readable name of this repository (for logs/errors).
    fn name(&self) -> &str;

    /// Latest rate for `key` with `timestamp <= at_or_before`.
    async fn find_latest_before_or_at(
        &self,
        key: &AssetKey,
        at_or_before: DateTime<Utc>,
    ) -> Result<Option<RatePoint>, CoreError>;

    /// Timestamp of the newest rate in the whole store, across all assets.
    async fn find_latest_global_date(&self) -> Result<Option<DateTime<Utc>>, CoreError>;

    /// All rates for the given assets with `bucket_start <= timestamp <= bucket_end`.
    async fn find_batch_in_date_bucket(
        &self,
        keys: &[AssetKey],
        bucket_start: DateTime<Utc>,
        bucket_end: DateTime<Utc>,
    ) -> Result<Vec<RatePoint>, CoreError>;

    /// All rates in the bucket, optionally restricted to one asset type.
    async fn find_in_date_bucket(
        &self,
        asset_type: Option<AssetType>,
        bucket_start: DateTime<Utc>,
        bucket_end: DateTime<Utc>,
    ) -> Result<Vec<RatePoint>, CoreError>;
}

/// Source of portfolio metadata and holdings.
///
/// Callers are expected to have checked portfolio ownership already.
#[async_trait]
pub trait HoldingsProvider: Send + Sync {
    async fn find_portfolio(&self, portfolio_id: Uuid) -> Result<Option<Portfolio>, CoreError>;

    async fn list_by_portfolio(&self, portfolio_id: Uuid) -> Result<Vec<Holding>, CoreError>;
}
