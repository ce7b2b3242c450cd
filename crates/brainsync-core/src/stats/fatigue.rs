//! Heuristic fatigue score.
//!
//! Five independent signals each contribute a bounded number of points:
//!
//! | Signal | Points |
//! |---|---|
//! | Completed sessions today | 0 / 3 / 5 / 10 / 15 |
//! | Completed sessions this week | 0 / 3 / 5 / 10 / 15 |
//! | Consecutive active days | 0 / 5 / 10 |
//! | Interruption rate today | 0 / 5 / 10 |
//! | Break-skip rate, trailing 7 days | 0 / 5 |
//!
//! The sum is clamped to [`FATIGUE_SCORE_MAX`].

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{DailyStats, Statistics};
use crate::session::{SessionKind, SessionRecord};
use crate::time_util;

pub const FATIGUE_SCORE_MAX: u8 = 45;
/// How far back the consecutive-day walk looks.
pub const CONSECUTIVE_DAYS_WINDOW: u32 = 14;
pub const BREAK_SKIP_WINDOW_DAYS: i64 = 7;

/// Breaks expected per completed work session.
const EXPECTED_BREAK_RATIO: f64 = 0.9;

/// Estimate the fatigue score for the aggregate as of `now`.
pub fn estimate_fatigue_score(stats: &Statistics, now: DateTime<Utc>) -> u8 {
    let score = daily_volume_points(stats.today.sessions)
        + weekly_volume_points(stats.week.total_sessions)
        + streak_points(calculate_consecutive_days(stats, now))
        + interruption_points(calculate_interruption_rate(&stats.today))
        + break_skip_points(calculate_break_skip_rate(&stats.history, now));

    score.min(u32::from(FATIGUE_SCORE_MAX)) as u8
}

fn daily_volume_points(sessions: u32) -> u32 {
    match sessions {
        12.. => 15,
        10..=11 => 10,
        8..=9 => 5,
        6..=7 => 3,
        _ => 0,
    }
}

fn weekly_volume_points(sessions: u32) -> u32 {
    match sessions {
        60.. => 15,
        50..=59 => 10,
        40..=49 => 5,
        30..=39 => 3,
        _ => 0,
    }
}

fn streak_points(days: u32) -> u32 {
    match days {
        7.. => 10,
        5..=6 => 5,
        _ => 0,
    }
}

fn interruption_points(rate: f64) -> u32 {
    if rate >= 0.5 {
        10
    } else if rate >= 0.3 {
        5
    } else {
        0
    }
}

fn break_skip_points(rate: f64) -> u32 {
    if rate >= 0.5 {
        5
    } else {
        0
    }
}

/// Count the run of consecutive days with at least one completed work
/// session, ending today (or yesterday when today has none yet).
pub fn calculate_consecutive_days(stats: &Statistics, now: DateTime<Utc>) -> u32 {
    let today = time_util::today(now);

    let mut active_days: HashSet<NaiveDate> = stats
        .daily_stats_history
        .iter()
        .filter(|day| day.sessions > 0)
        .map(|day| day.date)
        .collect();

    if stats.today.date == today && stats.today.sessions > 0 {
        active_days.insert(today);
    }

    // Raw history corroborates days that never made it into the archive.
    active_days.extend(
        stats
            .history
            .iter()
            .filter(|record| record.is_completed_work())
            .map(|record| record.start_time.date_naive()),
    );

    let start = if active_days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    (0..CONSECUTIVE_DAYS_WINDOW)
        .map(|offset| start - Duration::days(i64::from(offset)))
        .take_while(|day| active_days.contains(day))
        .count() as u32
}

/// Interrupted sessions as a share of all sessions that day.
pub fn calculate_interruption_rate(day: &DailyStats) -> f64 {
    let total = u64::from(day.sessions) + u64::from(day.interrupted_sessions);
    if total == 0 {
        return 0.0;
    }
    f64::from(day.interrupted_sessions) / total as f64
}

/// Shortfall of completed breaks against the expected 0.9 per completed
/// work session over the trailing seven days, in `[0, 1]`.
pub fn calculate_break_skip_rate<'a, I>(history: I, now: DateTime<Utc>) -> f64
where
    I: IntoIterator<Item = &'a SessionRecord>,
{
    let window_start = now - Duration::days(BREAK_SKIP_WINDOW_DAYS);

    let (work, breaks) = history
        .into_iter()
        .filter(|record| record.completed && record.start_time >= window_start)
        .fold((0u64, 0u64), |(work, breaks), record| match record.kind {
            SessionKind::Work => (work + 1, breaks),
            SessionKind::Break => (work, breaks + 1),
        });

    if work == 0 {
        return 0.0;
    }

    let expected = work as f64 * EXPECTED_BREAK_RATIO;
    let actual_rate = breaks as f64 / expected;
    (1.0 - actual_rate).clamp(0.0, 1.0)
}

/// Coarse band for presenting a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FatigueLevel {
    Good,
    Caution,
    Warning,
    Danger,
}

impl FatigueLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=10 => FatigueLevel::Good,
            11..=20 => FatigueLevel::Caution,
            21..=30 => FatigueLevel::Warning,
            _ => FatigueLevel::Danger,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FatigueLevel::Good => "Good",
            FatigueLevel::Caution => "Caution",
            FatigueLevel::Warning => "Warning",
            FatigueLevel::Danger => "Danger",
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            FatigueLevel::Good => "🟢",
            FatigueLevel::Caution => "🟡",
            FatigueLevel::Warning => "🟠",
            FatigueLevel::Danger => "🔴",
        }
    }
}
