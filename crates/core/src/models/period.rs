use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::chart::Interval;
use crate::errors::CoreError;

/// Query-string date format for custom periods.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Relative period presets, counted back from "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "3Y")]
    ThreeYears,
    #[serde(rename = "ALL")]
    All,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneWeek => "1W",
            Period::OneMonth => "1M",
            Period::ThreeMonths => "3M",
            Period::SixMonths => "6M",
            Period::OneYear => "1Y",
            Period::ThreeYears => "3Y",
            Period::All => "ALL",
        }
    }

    /// Fixed sampling step for each preset.
    pub fn interval(&self) -> Interval {
        match self {
            Period::OneWeek | Period::OneMonth => Interval::Daily,
            Period::ThreeMonths => Interval::Weekly,
            Period::SixMonths | Period::OneYear | Period::ThreeYears | Period::All => {
                Interval::Monthly
            }
        }
    }

    /// First day covered by the preset, counted back from `today`.
    ///
    /// `All` starts at the earliest purchase; without any purchase there is no start.
    pub fn start(&self, today: NaiveDate, earliest_purchase: Option<NaiveDate>) -> Option<NaiveDate> {
        match self {
            Period::OneWeek => today.checked_sub_days(Days::new(7)),
            Period::OneMonth => today.checked_sub_months(Months::new(1)),
            Period::ThreeMonths => today.checked_sub_months(Months::new(3)),
            Period::SixMonths => today.checked_sub_months(Months::new(6)),
            Period::OneYear => today.checked_sub_months(Months::new(12)),
            Period::ThreeYears => today.checked_sub_months(Months::new(36)),
            Period::All => earliest_purchase,
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1W" => Ok(Period::OneWeek),
            "1M" => Ok(Period::OneMonth),
            "3M" => Ok(Period::ThreeMonths),
            "6M" => Ok(Period::SixMonths),
            "1Y" => Ok(Period::OneYear),
            "3Y" => Ok(Period::ThreeYears),
            "ALL" => Ok(Period::All),
            other => Err(CoreError::InvalidPeriod(format!(
                "'{other}' (expected one of 1W, 1M, 3M, 6M, 1Y, 3Y, ALL, CUSTOM)"
            ))),
        }
    }
}

/// Which stretch of history a value series covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSelector {
    Preset(Period),
    Custom { start: NaiveDate, end: NaiveDate },
}

/// Concrete window a series is generated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub interval: Interval,
}

impl PeriodSelector {
    /// Build a custom selector, rejecting inverted ranges.
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidDateRange(format!(
                "start date ({start}) must not be after end date ({end})"
            )));
        }
        Ok(PeriodSelector::Custom { start, end })
    }

    /// Resolve to a concrete window. Returns `None` when there is nothing to cover
    /// (an `ALL` period over a portfolio with no purchases).
    pub fn window(
        &self,
        today: NaiveDate,
        earliest_purchase: Option<NaiveDate>,
    ) -> Result<Option<SeriesWindow>, CoreError> {
        match *self {
            PeriodSelector::Preset(period) => {
                let Some(start) = period.start(today, earliest_purchase) else {
                    return Ok(None);
                };
                Ok(Some(SeriesWindow {
                    start,
                    end: today,
                    interval: period.interval(),
                }))
            }
            PeriodSelector::Custom { start, end } => {
                if start > end {
                    return Err(CoreError::InvalidDateRange(format!(
                        "start date ({start}) must not be after end date ({end})"
                    )));
                }
                Ok(Some(SeriesWindow {
                    start,
                    end,
                    interval: Interval::for_range_days((end - start).num_days()),
                }))
            }
        }
    }
}

/// Raw `period` / `startDate` / `endDate` query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesQuery {
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl SeriesQuery {
    pub fn preset(period: Period) -> Self {
        Self {
            period: Some(period.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn custom(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            period: Some("CUSTOM".to_string()),
            start_date: Some(start_date.into()),
            end_date: Some(end_date.into()),
        }
    }

    /// Validate the query into a selector. A missing `period` falls back to `default_period`;
    /// custom ranges longer than `max_custom_range_days` are rejected.
    pub fn to_selector(
        &self,
        default_period: Period,
        max_custom_range_days: i64,
    ) -> Result<PeriodSelector, CoreError> {
        let raw = match self.period.as_deref().map(str::trim) {
            None | Some("") => return Ok(PeriodSelector::Preset(default_period)),
            Some(raw) => raw,
        };

        if !raw.eq_ignore_ascii_case("CUSTOM") {
            return Ok(PeriodSelector::Preset(raw.parse()?));
        }

        let start = parse_query_date("startDate", self.start_date.as_deref())?;
        let end = parse_query_date("endDate", self.end_date.as_deref())?;
        let selector = PeriodSelector::custom(start, end)?;

        let range_days = (end - start).num_days();
        if range_days > max_custom_range_days {
            return Err(CoreError::InvalidDateRange(format!(
                "range of {range_days} days exceeds maximum of {max_custom_range_days} days"
            )));
        }
        Ok(selector)
    }
}

fn parse_query_date(field: &str, value: Option<&str>) -> Result<NaiveDate, CoreError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::InvalidDateRange(format!("{field} is required for CUSTOM periods")))?;
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
        CoreError::InvalidDateRange(format!("{field} '{value}' is not a YYYY-MM-DD date: {e}"))
    })
}
