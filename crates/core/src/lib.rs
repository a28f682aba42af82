pub mod errors;
pub mod models;
pub mod repository;
pub mod services;
pub mod storage;
pub mod utils;

use chrono::{NaiveDate, Utc};
use models::{
    analytics::{PortfolioSummary, ValuationSnapshot},
    asset::{AssetKey, AssetType},
    chart::ValueSeriesPoint,
    holding::Holding,
    performance::{ChangePeriod, ComparisonSeries, PriceChange, ReturnCalculation, ReturnRequest},
    period::{PeriodSelector, SeriesQuery},
    portfolio::Portfolio,
    rate::{PriceQuote, RatePoint},
    settings::Settings,
};
use repository::traits::{HoldingsProvider, RateRepository};
use services::{
    price_resolver::PriceResolver, series_service::SeriesService,
    valuation_service::ValuationService,
};
use std::sync::Arc;
use uuid::Uuid;

use errors::CoreError;

/// Main entry point for the Rate Tracker core library.
///
/// Wires the rate repository and holdings provider into the valuation and series
/// engines. Every call reads a fresh view of holdings and rates; nothing is cached
/// between requests.
#[must_use]
pub struct RateTracker {
    holdings: Arc<dyn HoldingsProvider>,
    resolver: PriceResolver,
    valuation_service: ValuationService,
    series_service: SeriesService,
    settings: Settings,
}

impl std::fmt::Debug for RateTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateTracker")
            .field("rates", &self.resolver.repository_name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl RateTracker {
    /// Build a tracker with default settings.
    pub fn new(rates: Arc<dyn RateRepository>, holdings: Arc<dyn HoldingsProvider>) -> Self {
        Self::with_settings(rates, holdings, Settings::default())
    }

    pub fn with_settings(
        rates: Arc<dyn RateRepository>,
        holdings: Arc<dyn HoldingsProvider>,
        settings: Settings,
    ) -> Self {
        Self {
            holdings,
            resolver: PriceResolver::new(rates),
            valuation_service: ValuationService::new(),
            series_service: SeriesService::new(),
            settings,
        }
    }

    // ── Valuation ───────────────────────────────────────────────────

    /// Summary payload (cost, value, P&L) of a portfolio against the latest rates.
    pub async fn get_portfolio_summary(
        &self,
        portfolio_id: Uuid,
    ) -> Result<PortfolioSummary, CoreError> {
        let portfolio = self.find_portfolio(portfolio_id).await?;
        let snapshot = self.compute_snapshot(portfolio_id).await?;
        Ok(PortfolioSummary::from_snapshot(portfolio.name, &snapshot))
    }

    /// Full valuation snapshot, including the per-holding breakdown.
    pub async fn get_valuation_snapshot(
        &self,
        portfolio_id: Uuid,
    ) -> Result<ValuationSnapshot, CoreError> {
        self.find_portfolio(portfolio_id).await?;
        self.compute_snapshot(portfolio_id).await
    }

    // ── Value series ────────────────────────────────────────────────

    /// Value series for the raw `period` / `startDate` / `endDate` query, ending today.
    pub async fn get_portfolio_value_series(
        &self,
        portfolio_id: Uuid,
        query: &SeriesQuery,
    ) -> Result<Vec<ValueSeriesPoint>, CoreError> {
        let today = Utc::now().date_naive();
        self.get_portfolio_value_series_as_of(portfolio_id, query, today)
            .await
    }

    /// Same as `get_portfolio_value_series`, with "today" supplied by the caller.
    pub async fn get_portfolio_value_series_as_of(
        &self,
        portfolio_id: Uuid,
        query: &SeriesQuery,
        today: NaiveDate,
    ) -> Result<Vec<ValueSeriesPoint>, CoreError> {
        // Reject bad input before touching the repositories
        let selector = query.to_selector(
            self.settings.default_period,
            self.settings.max_custom_range_days,
        )?;
        self.value_series(portfolio_id, &selector, today).await
    }

    /// Value series for an already-validated selector.
    pub async fn value_series(
        &self,
        portfolio_id: Uuid,
        selector: &PeriodSelector,
        today: NaiveDate,
    ) -> Result<Vec<ValueSeriesPoint>, CoreError> {
        self.find_portfolio(portfolio_id).await?;
        let holdings = self.holdings.list_by_portfolio(portfolio_id).await?;
        self.series_service
            .compute_value_series(&self.resolver, &holdings, selector, today)
            .await
    }

    // ── Prices ──────────────────────────────────────────────────────

    /// Price of an asset on a day, or the closest earlier one.
    pub async fn get_price_at_date(
        &self,
        asset: &AssetKey,
        date: NaiveDate,
    ) -> Result<PriceQuote, CoreError> {
        let today = Utc::now().date_naive();
        self.resolver.price_at_date(asset, date, today).await
    }

    /// All rates of the latest recorded day, optionally for one asset type.
    pub async fn get_latest_rates(
        &self,
        asset_type: Option<AssetType>,
    ) -> Result<Vec<RatePoint>, CoreError> {
        self.resolver.latest_rates(asset_type).await
    }

    /// Intraday rates of one day, oldest first.
    pub async fn get_hourly_rates(
        &self,
        date: NaiveDate,
        asset_type: Option<AssetType>,
    ) -> Result<Vec<RatePoint>, CoreError> {
        self.resolver.hourly_rates(date, asset_type).await
    }

    pub async fn get_price_change(
        &self,
        asset: &AssetKey,
        period: ChangePeriod,
    ) -> Result<PriceChange, CoreError> {
        self.resolver.price_change(asset, period).await
    }

    /// Return simulation for a hypothetical purchase, with "today" taken from the clock.
    pub async fn calculate_return(
        &self,
        request: &ReturnRequest,
    ) -> Result<ReturnCalculation, CoreError> {
        let today = Utc::now().date_naive();
        self.resolver.calculate_return(request, today).await
    }

    /// Daily prices of several assets over a range, optionally rebased to 100.
    pub async fn get_comparison(
        &self,
        assets: &[AssetKey],
        from: NaiveDate,
        to: NaiveDate,
        normalize: bool,
    ) -> Result<Vec<ComparisonSeries>, CoreError> {
        self.resolver.compare_assets(assets, from, to, normalize).await
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn get_settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings after validating them.
    pub fn set_settings(&mut self, settings: Settings) -> Result<(), CoreError> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    // ── Internal ────────────────────────────────────────────────────

    async fn find_portfolio(&self, portfolio_id: Uuid) -> Result<Portfolio, CoreError> {
        self.holdings
            .find_portfolio(portfolio_id)
            .await?
            .ok_or_else(|| CoreError::PortfolioNotFound(portfolio_id.to_string()))
    }

    async fn compute_snapshot(&self, portfolio_id: Uuid) -> Result<ValuationSnapshot, CoreError> {
        let holdings: Vec<Holding> = self.holdings.list_by_portfolio(portfolio_id).await?;
        self.valuation_service
            .compute_summary(&self.resolver, portfolio_id, &holdings, Utc::now())
            .await
    }
}
