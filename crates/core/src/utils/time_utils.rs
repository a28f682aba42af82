use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};

/// First instant of a UTC calendar day.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Last instant (millisecond precision) of a UTC calendar day.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::days(1) - Duration::milliseconds(1)
}

/// `[start, end]` of the UTC day containing `instant`.
pub fn day_bucket(instant: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = instant.date_naive();
    (start_of_day(day), end_of_day(day))
}

/// `[start, end]` of the UTC hour containing `instant`.
pub fn hour_bucket(instant: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let hour = NaiveTime::from_hms_opt(instant.hour(), 0, 0).unwrap_or(NaiveTime::MIN);
    let start = instant.date_naive().and_time(hour).and_utc();
    (start, start + Duration::hours(1) - Duration::milliseconds(1))
}

/// Round a monetary amount to 2 decimals, half away from zero.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
