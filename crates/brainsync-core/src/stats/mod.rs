//! Statistics module for BrainSync
//!
//! Rolling daily, weekly and all-time aggregates built from completed and
//! interrupted sessions, the fatigue score derived from them, and the
//! tabular export.

mod aggregate;
mod export;
mod fatigue;

pub use aggregate::{record_session, recompute_week};
pub use export::{export_csv, export_rows, to_csv, ExportRange, ExportRow, CSV_HEADER};
pub use fatigue::{
    calculate_break_skip_rate, calculate_consecutive_days, calculate_interruption_rate,
    estimate_fatigue_score, FatigueLevel, BREAK_SKIP_WINDOW_DAYS, CONSECUTIVE_DAYS_WINDOW,
    FATIGUE_SCORE_MAX,
};

use std::collections::VecDeque;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionRecord;

/// Session history capacity; oldest records are evicted first.
pub const MAX_HISTORY_RECORDS: usize = 1000;
/// Archived day capacity; oldest days are evicted first.
pub const MAX_DAILY_STATS_HISTORY: usize = 90;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    /// Completed work sessions.
    pub sessions: u32,
    #[serde(default)]
    pub total_focus_minutes: u32,
    #[serde(default)]
    pub total_break_minutes: u32,
    #[serde(default)]
    pub interrupted_sessions: u32,
    #[serde(default)]
    pub fatigue_score: u8,
}

impl DailyStats {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            sessions: 0,
            total_focus_minutes: 0,
            total_break_minutes: 0,
            interrupted_sessions: 0,
            fatigue_score: 0,
        }
    }

    pub fn has_activity(&self) -> bool {
        self.sessions > 0 || self.interrupted_sessions > 0
    }
}

/// Derived view over the Monday-Sunday week containing today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WeeklyStats {
    pub week_start: Option<NaiveDate>,
    pub week_end: Option<NaiveDate>,
    pub total_sessions: u32,
    pub total_focus_minutes: u32,
    pub daily_average: f64,
    pub fatigue_score: u8,
    pub daily_stats: Vec<DailyStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllTimeStats {
    pub total_sessions: u32,
    pub total_focus_minutes: u32,
    pub start_date: NaiveDate,
}

/// Aggregate root for all usage statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredStatistics")]
pub struct Statistics {
    pub today: DailyStats,
    #[serde(default)]
    pub week: WeeklyStats,
    pub all_time: AllTimeStats,
    /// Insertion-ordered, at most [`MAX_HISTORY_RECORDS`].
    pub history: VecDeque<SessionRecord>,
    /// Archived days in rollover order, at most [`MAX_DAILY_STATS_HISTORY`].
    pub daily_stats_history: VecDeque<DailyStats>,
}

/// On-disk shape. Only `today` and the two histories are required; a
/// missing `all_time` is rebuilt from the archived days.
#[derive(Deserialize)]
struct StoredStatistics {
    today: DailyStats,
    #[serde(default)]
    week: WeeklyStats,
    #[serde(default)]
    all_time: Option<AllTimeStats>,
    history: VecDeque<SessionRecord>,
    daily_stats_history: VecDeque<DailyStats>,
}

impl From<StoredStatistics> for Statistics {
    fn from(stored: StoredStatistics) -> Self {
        let all_time = stored.all_time.unwrap_or_else(|| {
            let days = || stored.daily_stats_history.iter().chain([&stored.today]);
            AllTimeStats {
                total_sessions: days().fold(0u32, |n, d| n.saturating_add(d.sessions)),
                total_focus_minutes: days()
                    .fold(0u32, |n, d| n.saturating_add(d.total_focus_minutes)),
                start_date: days().map(|d| d.date).min().unwrap_or(stored.today.date),
            }
        });
        Self {
            today: stored.today,
            week: stored.week,
            all_time,
            history: stored.history,
            daily_stats_history: stored.daily_stats_history,
        }
    }
}

impl Statistics {
    /// Empty statistics with "today" set to the day of `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        let today = crate::time_util::today(now);
        Self {
            today: DailyStats::new(today),
            week: WeeklyStats::default(),
            all_time: AllTimeStats {
                total_sessions: 0,
                total_focus_minutes: 0,
                start_date: today,
            },
            history: VecDeque::new(),
            daily_stats_history: VecDeque::new(),
        }
    }

    /// The archived entry for `date`, if any.
    pub fn archived_day(&self, date: NaiveDate) -> Option<&DailyStats> {
        self.daily_stats_history.iter().find(|d| d.date == date)
    }
}
