//! # Report Math
//!
//! Calendar windows and series shaping for the dashboard. All days are UTC
//! calendar days; a window is the half-open range `[from, to)`.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::HashMap;
use ts_rs::TS;

use crate::money::Money;

/// Number of days in the dashboard's sales chart (today and six before).
pub const SERIES_DAYS: u64 = 7;

/// A half-open time range `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl Window {
    /// The window covering `[start_day 00:00, end_day + 1 00:00)`.
    pub fn days(start_day: NaiveDate, end_day: NaiveDate) -> Self {
        Window {
            from: midnight(start_day),
            to: midnight(end_day + Days::new(1)),
        }
    }

    pub fn day(day: NaiveDate) -> Self {
        Self::days(day, day)
    }

    /// Monday of `today`'s week through the end of `today`.
    pub fn week_to_date(today: NaiveDate) -> Self {
        let monday = today - Days::new(today.weekday().num_days_from_monday() as u64);
        Self::days(monday, today)
    }

    /// The first of `today`'s month through the end of `today`.
    pub fn month_to_date(today: NaiveDate) -> Self {
        let first = today.with_day(1).unwrap_or(today);
        Self::days(first, today)
    }
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::default()))
}

/// Sale count, revenue and profit over one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowSummary {
    pub sale_count: i64,
    pub total: Money,
    pub profit: Money,
}

/// One bar in the dashboard sales chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct DailySales {
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// `"Oct 16"`.
    pub label: String,
    pub total: Money,
}

/// Chart label for a day.
///
/// ```rust
/// use chrono::NaiveDate;
/// use tally_core::report::day_label;
///
/// assert_eq!(day_label(NaiveDate::from_ymd_opt(2026, 10, 6).unwrap()), "Oct 06");
/// ```
pub fn day_label(day: NaiveDate) -> String {
    day.format("%b %d").to_string()
}

/// The first day of the chart ending on `today`.
pub fn series_start(today: NaiveDate) -> NaiveDate {
    today - Days::new(SERIES_DAYS - 1)
}

/// Builds the chart for the seven days ending on `today`, oldest first,
/// filling days without sales with zero.
pub fn daily_series(today: NaiveDate, totals: &[(NaiveDate, Money)]) -> Vec<DailySales> {
    let by_day: HashMap<NaiveDate, Money> = totals.iter().copied().collect();
    let start = series_start(today);

    (0..SERIES_DAYS)
        .map(|offset| {
            let date = start + Days::new(offset);
            DailySales {
                date,
                label: day_label(date),
                total: by_day.get(&date).copied().unwrap_or_default(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_day_window_is_half_open() {
        let w = Window::day(d(2026, 10, 16));
        assert_eq!(w.from.to_rfc3339(), "2026-10-16T00:00:00+00:00");
        assert_eq!(w.to.to_rfc3339(), "2026-10-17T00:00:00+00:00");
    }

    #[test]
    fn test_week_starts_monday() {
        // 2026-10-16 is a Friday
        let w = Window::week_to_date(d(2026, 10, 16));
        assert_eq!(w.from.date_naive(), d(2026, 10, 12));
        assert_eq!(w.to.date_naive(), d(2026, 10, 17));

        let monday = Window::week_to_date(d(2026, 10, 12));
        assert_eq!(monday.from.date_naive(), d(2026, 10, 12));
    }

    #[test]
    fn test_month_to_date() {
        let w = Window::month_to_date(d(2026, 10, 16));
        assert_eq!(w.from.date_naive(), d(2026, 10, 1));
    }

    #[test]
    fn test_series_zero_fills_and_orders() {
        let today = d(2026, 10, 16);
        let totals = vec![
            (d(2026, 10, 16), Money::from_cents(2997)),
            (d(2026, 10, 11), Money::from_cents(500)),
            // outside the window, ignored
            (d(2026, 10, 1), Money::from_cents(9999)),
        ];
        let series = daily_series(today, &totals);

        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, d(2026, 10, 10));
        assert_eq!(series[0].label, "Oct 10");
        assert_eq!(series[0].total, Money::zero());
        assert_eq!(series[1].total.cents(), 500);
        assert_eq!(series[6].label, "Oct 16");
        assert_eq!(series[6].total.cents(), 2997);
    }

    #[test]
    fn test_series_crosses_month_boundary() {
        let series = daily_series(d(2026, 3, 2), &[]);
        assert_eq!(series[0].label, "Feb 24");
        assert!(series.iter().all(|p| p.total.is_zero()));
    }
}
