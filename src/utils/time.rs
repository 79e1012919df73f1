use chrono::{DateTime, NaiveDate, TimeZone, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Start of the trailing window: today minus (days - 1), at midnight UTC,
/// inclusive. A 7-day window therefore covers today and the six days
/// before it.
pub fn window_start(reference: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    let first_day = reference.date_naive() - chrono::Duration::days(days - 1);
    start_of_day(first_day)
}

pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).expect("midnight is valid"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_start_truncates_to_midnight() {
        let reference = Utc.with_ymd_and_hms(2026, 3, 10, 15, 42, 9).unwrap();
        let start = window_start(reference, 7);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).unwrap());
    }

    #[test]
    fn one_day_window_starts_today() {
        let reference = Utc.with_ymd_and_hms(2026, 3, 10, 1, 0, 0).unwrap();
        assert_eq!(
            window_start(reference, 1),
            Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn window_start_crosses_month_boundaries() {
        let reference = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let start = window_start(reference, 30);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 2, 9, 0, 0, 0).unwrap());
    }
}
