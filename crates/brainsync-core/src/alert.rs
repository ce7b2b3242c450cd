//! Fatigue alert gating.
//!
//! An alert fires at most once per day, unless the score climbs again by
//! [`REALERT_SCORE_DELTA`] points or more since the last alert.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::storage::Config;

pub const REALERT_SCORE_DELTA: u8 = 5;

/// Last alert that reached the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertState {
    pub last_alert_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_alert_score: u8,
}

impl AlertState {
    /// State after alerting on `today` with `score`.
    pub fn record(today: NaiveDate, score: u8) -> Self {
        Self {
            last_alert_date: Some(today),
            last_alert_score: score,
        }
    }
}

pub fn should_alert(score: u8, config: &Config, state: &AlertState, today: NaiveDate) -> bool {
    if !config.fatigue_alert.enabled || !config.notifications.enabled {
        return false;
    }
    if score < config.fatigue_alert.threshold {
        return false;
    }
    match state.last_alert_date {
        Some(date) if date == today => {
            score.saturating_sub(state.last_alert_score) >= REALERT_SCORE_DELTA
        }
        _ => true,
    }
}
