use chrono::NaiveDate;
use std::collections::HashMap;

use crate::dto::dashboard_dto::TrendPoint;

/// Densifies a sparse grouped-by-day result: the output has exactly `days`
/// entries, one per calendar day from `start`, ascending, zero-filled for
/// days without events.
pub fn fill_missing_dates(rows: Vec<(NaiveDate, i64)>, start: NaiveDate, days: i64) -> Vec<TrendPoint> {
    let by_day: HashMap<NaiveDate, i64> = rows.into_iter().collect();

    (0..days)
        .map(|offset| {
            let date = start + chrono::Duration::days(offset);
            TrendPoint {
                date,
                count: by_day.get(&date).copied().unwrap_or(0),
            }
        })
        .collect()
}

/// Percentage of `numerator` over `denominator`, one decimal. A zero
/// denominator yields 0.0, never NaN.
pub fn rate(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round1(numerator as f64 / denominator as f64 * 100.0)
}

/// Period-over-period delta, one decimal. With an empty previous period the
/// delta is 0.0 when the current period is also empty, otherwise 100.0.
pub fn percent_change(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        return if current == 0 { 0.0 } else { 100.0 };
    }
    round1((current - previous) as f64 / previous as f64 * 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn series_is_dense_and_ascending() {
        let rows = vec![(day(4), 3), (day(7), 1)];
        let series = fill_missing_dates(rows, day(3), 7);

        assert_eq!(series.len(), 7);
        for (i, point) in series.iter().enumerate() {
            assert_eq!(point.date, day(3) + chrono::Duration::days(i as i64));
        }
        assert_eq!(series[0].count, 0);
        assert_eq!(series[1].count, 3);
        assert_eq!(series[4].count, 1);
        assert_eq!(series[6].count, 0);
    }

    #[test]
    fn empty_input_yields_all_zeroes() {
        let series = fill_missing_dates(Vec::new(), day(1), 7);
        assert_eq!(series.len(), 7);
        assert!(series.iter().all(|p| p.count == 0));
    }

    #[test]
    fn rate_rounds_to_one_decimal() {
        assert_eq!(rate(1, 3), 33.3);
        assert_eq!(rate(2, 3), 66.7);
        assert_eq!(rate(5, 4), 125.0);
    }

    #[test]
    fn rate_survives_zero_denominator() {
        assert_eq!(rate(0, 0), 0.0);
        assert_eq!(rate(7, 0), 0.0);
    }

    #[test]
    fn percent_change_conventions() {
        assert_eq!(percent_change(0, 0), 0.0);
        assert_eq!(percent_change(5, 0), 100.0);
        assert_eq!(percent_change(15, 10), 50.0);
        assert_eq!(percent_change(5, 10), -50.0);
        assert_eq!(percent_change(10, 3), 233.3);
    }
}
