use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::chart::ValueSeriesPoint;
use crate::models::holding::Holding;
use crate::models::period::{PeriodSelector, SeriesWindow};
use crate::services::price_resolver::PriceResolver;
use crate::utils::time_utils::{end_of_day, round_money};

/// Reconstructs the value history of a portfolio.
///
/// The window is sampled at a daily, weekly or monthly step (chosen by the period),
/// starting from a date snapped to the step's natural boundary. At each sample:
/// 1. Only holdings purchased on or before that day count
/// 2. Each counted holding is priced at the latest sell rate on or before that day
/// 3. Holdings without any rate yet are valued at cost
///
/// Samples before the first purchase are skipped, so the series starts with the first
/// asset. A second pass fills in the percent change between consecutive points.
pub struct SeriesService;

impl SeriesService {
    pub fn new() -> Self {
        Self
    }

    /// Value series of `holdings` over `selector`, with "today" pinned to `today`.
    ///
    /// An empty portfolio yields an empty series, never an error.
    pub async fn compute_value_series(
        &self,
        resolver: &PriceResolver,
        holdings: &[Holding],
        selector: &PeriodSelector,
        today: NaiveDate,
    ) -> Result<Vec<ValueSeriesPoint>, CoreError> {
        if holdings.is_empty() {
            return Ok(Vec::new());
        }

        let earliest_purchase = holdings.iter().map(Holding::purchase_day).min();
        let Some(window) = selector.window(today, earliest_purchase)? else {
            return Ok(Vec::new());
        };

        let values = self.sample_values(resolver, holdings, &window).await?;
        log::debug!(
            "Value series {} → {} ({}): {} points",
            window.start,
            window.end,
            window.interval,
            values.len()
        );

        Ok(with_change_percent(values))
    }

    /// Walk the window and value the portfolio at each sample date.
    pub async fn sample_values(
        &self,
        resolver: &PriceResolver,
        holdings: &[Holding],
        window: &SeriesWindow,
    ) -> Result<Vec<(NaiveDate, f64)>, CoreError> {
        let mut values = Vec::new();
        let mut current_date = window.interval.anchor(window.start);

        while current_date <= window.end {
            let as_of = end_of_day(current_date);
            let active: Vec<&Holding> = holdings
                .iter()
                .filter(|h| h.purchase_date <= as_of)
                .collect();

            if !active.is_empty() {
                let mut value = 0.0;
                for holding in active {
                    let key = holding.key();
                    match resolver.resolve_price(&key, as_of).await? {
                        Some(rate) => value += holding.amount * rate.sell_price,
                        None => {
                            log::debug!("No price for {key} on {current_date}, using cost basis");
                            value += holding.cost();
                        }
                    }
                }
                values.push((current_date, round_money(value)));
            }

            current_date = match window.interval.step(current_date) {
                Some(next) => next,
                None => break,
            };
        }

        Ok(values)
    }
}

impl Default for SeriesService {
    fn default() -> Self {
        Self::new()
    }
}

/// Attach the percent change from the previous point. The first point's change is 0,
/// as is any change measured from a zero value.
pub fn with_change_percent(values: Vec<(NaiveDate, f64)>) -> Vec<ValueSeriesPoint> {
    let mut points = Vec::with_capacity(values.len());
    let mut previous: Option<f64> = None;

    for (date, value) in values {
        let change = match previous {
            Some(prev) if prev != 0.0 => round_money((value - prev) / prev * 100.0),
            _ => 0.0,
        };
        points.push(ValueSeriesPoint { date, value, change });
        previous = Some(value);
    }

    points
}
