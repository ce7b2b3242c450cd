//! Daily rows for export and their CSV rendering.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{DailyStats, Statistics};
use crate::error::{CoreError, Result};
use crate::time_util;

pub const CSV_HEADER: [&str; 6] = [
    "Date",
    "Sessions",
    "Focus Time (min)",
    "Break Time (min)",
    "Interrupted",
    "Fatigue Score",
];

/// Trailing window for [`ExportRange::Month`].
const MONTH_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportRange {
    Week,
    Month,
    All,
}

impl FromStr for ExportRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "week" => Ok(ExportRange::Week),
            "month" => Ok(ExportRange::Month),
            "all" => Ok(ExportRange::All),
            other => Err(CoreError::Custom(format!(
                "unknown export range '{other}' (expected week, month or all)"
            ))),
        }
    }
}

impl fmt::Display for ExportRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportRange::Week => "week",
            ExportRange::Month => "month",
            ExportRange::All => "all",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub date: NaiveDate,
    pub sessions: u32,
    pub focus_minutes: u32,
    pub break_minutes: u32,
    pub interrupted: u32,
    pub fatigue_score: u8,
}

impl From<&DailyStats> for ExportRow {
    fn from(day: &DailyStats) -> Self {
        Self {
            date: day.date,
            sessions: day.sessions,
            focus_minutes: day.total_focus_minutes,
            break_minutes: day.total_break_minutes,
            interrupted: day.interrupted_sessions,
            fatigue_score: day.fatigue_score,
        }
    }
}

impl ExportRow {
    fn fields(&self) -> [String; 6] {
        [
            time_util::date_key(self.date),
            self.sessions.to_string(),
            self.focus_minutes.to_string(),
            self.break_minutes.to_string(),
            self.interrupted.to_string(),
            self.fatigue_score.to_string(),
        ]
    }
}

/// Daily rows for `range`, sorted ascending by date.
///
/// `Week` reads the already computed `stats.week`; call
/// [`recompute_week`](super::recompute_week) first for a fresh view.
pub fn export_rows(stats: &Statistics, range: ExportRange, now: DateTime<Utc>) -> Vec<ExportRow> {
    let mut rows: Vec<ExportRow> = match range {
        ExportRange::Week => stats.week.daily_stats.iter().map(ExportRow::from).collect(),
        ExportRange::Month => {
            let cutoff = time_util::today(now) - Duration::days(MONTH_WINDOW_DAYS);
            stats
                .daily_stats_history
                .iter()
                .filter(|day| day.date >= cutoff)
                .chain(std::iter::once(&stats.today))
                .map(ExportRow::from)
                .collect()
        }
        ExportRange::All => stats
            .daily_stats_history
            .iter()
            .chain(std::iter::once(&stats.today))
            .map(ExportRow::from)
            .collect(),
    };
    rows.sort_by_key(|row| row.date);
    rows
}

/// Render rows as CSV with a header line and no trailing newline.
pub fn to_csv(rows: &[ExportRow]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.write_record(row.fields())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Io(e.into_error()))?;
    let mut out =
        String::from_utf8(bytes).map_err(|e| CoreError::Custom(format!("CSV output: {e}")))?;
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

pub fn export_csv(stats: &Statistics, range: ExportRange, now: DateTime<Utc>) -> Result<String> {
    to_csv(&export_rows(stats, range, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::recompute_week;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 11, 12, 0, 0).unwrap()
    }

    fn day(offset: i64, sessions: u32) -> DailyStats {
        let mut d = DailyStats::new(now().date_naive() - Duration::days(offset));
        d.sessions = sessions;
        d.total_focus_minutes = sessions * 30;
        d
    }

    fn sample() -> Statistics {
        let mut stats = Statistics::new(now());
        stats.daily_stats_history.push_back(day(45, 2));
        stats.daily_stats_history.push_back(day(3, 4));
        // out of order on purpose
        stats.daily_stats_history.push_back(day(10, 1));
        stats.today.sessions = 5;
        stats.today.total_break_minutes = 20;
        stats.today.interrupted_sessions = 1;
        stats.today.fatigue_score = 3;
        stats
    }

    #[test]
    fn range_parses_known_names() {
        assert_eq!("week".parse::<ExportRange>().unwrap(), ExportRange::Week);
        assert_eq!("Month".parse::<ExportRange>().unwrap(), ExportRange::Month);
        assert_eq!("all".parse::<ExportRange>().unwrap(), ExportRange::All);
        assert!("year".parse::<ExportRange>().is_err());
        assert_eq!(ExportRange::Month.to_string(), "month");
    }

    #[test]
    fn all_includes_today_sorted() {
        let rows = export_rows(&sample(), ExportRange::All, now());
        assert_eq!(rows.len(), 4);
        assert_eq!(rows.last().unwrap().date, now().date_naive());
        assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn month_drops_old_days() {
        let rows = export_rows(&sample(), ExportRange::Month, now());
        let dates: Vec<_> = rows.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![
                now().date_naive() - Duration::days(10),
                now().date_naive() - Duration::days(3),
                now().date_naive(),
            ]
        );
    }

    #[test]
    fn week_uses_computed_week() {
        let mut stats = sample();
        assert!(export_rows(&stats, ExportRange::Week, now()).is_empty());

        recompute_week(&mut stats, now());
        let rows = export_rows(&stats, ExportRange::Week, now());
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[2].sessions, 5);
    }

    #[test]
    fn csv_has_header_and_no_trailing_newline() {
        let csv = export_csv(&sample(), ExportRange::All, now()).unwrap();
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(
            lines[0],
            "Date,Sessions,Focus Time (min),Break Time (min),Interrupted,Fatigue Score"
        );
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4], "2026-02-11,5,0,20,1,3");
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn empty_rows_render_header_only() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(
            csv,
            "Date,Sessions,Focus Time (min),Break Time (min),Interrupted,Fatigue Score"
        );
    }
}
