use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::{
    estimate_fatigue_score, DailyStats, Statistics, MAX_DAILY_STATS_HISTORY, MAX_HISTORY_RECORDS,
};
use crate::session::{SessionKind, SessionRecord};
use crate::time_util;

/// Fold one finished session into the aggregate.
///
/// Rolls "today" over first when the calendar day has changed since the
/// last record, then updates the counters, appends to history and
/// refreshes today's fatigue score.
pub fn record_session(stats: &mut Statistics, session: SessionRecord, now: DateTime<Utc>) {
    roll_over(stats, now);

    match (session.kind, session.completed) {
        (SessionKind::Work, true) => {
            let minutes = session.duration_minutes;
            stats.today.sessions = stats.today.sessions.saturating_add(1);
            stats.today.total_focus_minutes =
                stats.today.total_focus_minutes.saturating_add(minutes);
            stats.all_time.total_sessions = stats.all_time.total_sessions.saturating_add(1);
            stats.all_time.total_focus_minutes =
                stats.all_time.total_focus_minutes.saturating_add(minutes);
        }
        (SessionKind::Work, false) => {
            stats.today.interrupted_sessions = stats.today.interrupted_sessions.saturating_add(1);
        }
        (SessionKind::Break, true) => {
            stats.today.total_break_minutes = stats
                .today
                .total_break_minutes
                .saturating_add(session.duration_minutes);
        }
        (SessionKind::Break, false) => {}
    }

    stats.history.push_back(session);
    while stats.history.len() > MAX_HISTORY_RECORDS {
        stats.history.pop_front();
    }

    stats.today.fatigue_score = estimate_fatigue_score(stats, now);
}

fn roll_over(stats: &mut Statistics, now: DateTime<Utc>) {
    let date = time_util::today(now);
    if stats.today.date == date {
        return;
    }

    let outgoing = std::mem::replace(&mut stats.today, DailyStats::new(date));
    debug!(from = %outgoing.date, to = %date, "day rollover");
    if outgoing.has_activity() {
        stats.daily_stats_history.push_back(outgoing);
        while stats.daily_stats_history.len() > MAX_DAILY_STATS_HISTORY {
            stats.daily_stats_history.pop_front();
        }
    }
}

/// Rebuild the weekly view for the Monday-Sunday week containing `now`.
///
/// Only `stats.week` is written; calling this repeatedly is harmless.
pub fn recompute_week(stats: &mut Statistics, now: DateTime<Utc>) {
    let today = time_util::today(now);
    let start = time_util::week_start(today);
    let end = time_util::week_end(today);

    let daily_stats: Vec<DailyStats> = (0..7)
        .map(|offset| {
            let date = start + Duration::days(offset);
            if stats.today.date == date {
                stats.today.clone()
            } else {
                stats
                    .archived_day(date)
                    .cloned()
                    .unwrap_or_else(|| DailyStats::new(date))
            }
        })
        .collect();

    let total_sessions = daily_stats
        .iter()
        .fold(0u32, |acc, day| acc.saturating_add(day.sessions));
    let total_focus_minutes = daily_stats
        .iter()
        .fold(0u32, |acc, day| acc.saturating_add(day.total_focus_minutes));

    stats.week.week_start = Some(start);
    stats.week.week_end = Some(end);
    stats.week.total_sessions = total_sessions;
    stats.week.total_focus_minutes = total_focus_minutes;
    stats.week.daily_average = (f64::from(total_sessions) / 7.0 * 10.0).round() / 10.0;
    stats.week.daily_stats = daily_stats;
    stats.week.fatigue_score = estimate_fatigue_score(stats, now);
}
