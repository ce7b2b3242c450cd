//! Calendar helpers shared by the statistics engine and the CLI.
//!
//! All calendar math is done on the UTC date so that a day key recorded
//! by one process matches the key computed by the next.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// The calendar day containing `now`.
pub fn today(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

/// `YYYY-MM-DD` key for a calendar day.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(offset)
}

/// Sunday of the ISO week containing `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date) + Duration::days(6)
}

/// Render seconds as `M:SS`, flooring fractional seconds.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Render a minute count as `1h 30m`, `2h` or `45m`.
pub fn format_minutes(total_minutes: u32) -> String {
    let hours = total_minutes / 60;
    let mins = total_minutes % 60;
    match (hours, mins) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn format_clock_matches_timer_display() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(60.0), "1:00");
        assert_eq!(format_clock(90.0), "1:30");
        assert_eq!(format_clock(61.0), "1:01");
        assert_eq!(format_clock(1800.0), "30:00");
        assert_eq!(format_clock(3599.0), "59:59");
        assert_eq!(format_clock(59.9), "0:59");
        assert_eq!(format_clock(-3.0), "0:00");
    }

    #[test]
    fn format_minutes_drops_zero_parts() {
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(120), "2h");
        assert_eq!(format_minutes(95), "1h 35m");
        assert_eq!(format_minutes(0), "0m");
    }

    #[test]
    fn monday_is_its_own_week_start() {
        // 2026-02-09 is a Monday
        assert_eq!(week_start(day(2026, 2, 9)), day(2026, 2, 9));
    }

    #[test]
    fn midweek_and_sunday_map_back_to_monday() {
        assert_eq!(week_start(day(2026, 2, 11)), day(2026, 2, 9));
        assert_eq!(week_start(day(2026, 2, 15)), day(2026, 2, 9));
        assert_eq!(week_start(day(2026, 2, 15)).weekday(), Weekday::Mon);
    }

    #[test]
    fn week_end_is_sunday() {
        let end = week_end(day(2026, 2, 9));
        assert_eq!(end, day(2026, 2, 15));
        assert_eq!(end.weekday(), Weekday::Sun);
    }

    #[test]
    fn week_crosses_month_boundary() {
        // 2026-03-01 is a Sunday
        assert_eq!(week_start(day(2026, 3, 1)), day(2026, 2, 23));
    }

    #[test]
    fn date_key_is_zero_padded() {
        assert_eq!(date_key(day(2026, 2, 9)), "2026-02-09");
    }
}
