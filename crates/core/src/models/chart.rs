use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single point of the portfolio value series.
///
/// The core computes these; the frontend just renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSeriesPoint {
    /// Bucket date, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,

    /// Portfolio value at this date, rounded to 2 decimals
    pub value: f64,

    /// Percent change from the previous point (0 for the first point)
    pub change: f64,
}

/// Sampling step of a value series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
}

/// Longest custom range still sampled daily.
pub const DAILY_MAX_RANGE_DAYS: i64 = 30;

/// Longest custom range still sampled weekly.
pub const WEEKLY_MAX_RANGE_DAYS: i64 = 90;

impl Interval {
    /// Granularity for a custom range of `days` days (`end - start`).
    pub fn for_range_days(days: i64) -> Self {
        if days <= DAILY_MAX_RANGE_DAYS {
            Interval::Daily
        } else if days <= WEEKLY_MAX_RANGE_DAYS {
            Interval::Weekly
        } else {
            Interval::Monthly
        }
    }

    /// Snap `date` to the natural boundary of this interval.
    ///
    /// Monthly → first of the month, weekly → Monday of the ISO week, daily → unchanged.
    pub fn anchor(self, date: NaiveDate) -> NaiveDate {
        match self {
            Interval::Daily => date,
            Interval::Weekly => {
                let back = u64::from(date.weekday().num_days_from_monday());
                date.checked_sub_days(Days::new(back)).unwrap_or(date)
            }
            Interval::Monthly => date.with_day(1).unwrap_or(date),
        }
    }

    /// Next sample date after `date`. Month steps are calendar months, not 30 days.
    pub fn step(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Interval::Daily => date.checked_add_days(Days::new(1)),
            Interval::Weekly => date.checked_add_days(Days::new(7)),
            Interval::Monthly => date.checked_add_months(Months::new(1)),
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interval::Daily => write!(f, "daily"),
            Interval::Weekly => write!(f, "weekly"),
            Interval::Monthly => write!(f, "monthly"),
        }
    }
}
