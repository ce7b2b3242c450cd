use serde::{Deserialize, Serialize};

use crate::session::SessionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    #[default]
    Idle,
    Working,
    Breaking,
    Paused,
}

impl TimerState {
    /// `true` while an interval is counting down.
    pub fn is_active(self) -> bool {
        matches!(self, TimerState::Working | TimerState::Breaking)
    }
}

/// A state that can be paused and resumed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveState {
    Working,
    Breaking,
}

impl ActiveState {
    pub fn from_state(state: TimerState) -> Option<Self> {
        match state {
            TimerState::Working => Some(ActiveState::Working),
            TimerState::Breaking => Some(ActiveState::Breaking),
            _ => None,
        }
    }

    pub fn state(self) -> TimerState {
        match self {
            ActiveState::Working => TimerState::Working,
            ActiveState::Breaking => TimerState::Breaking,
        }
    }

    pub fn session_kind(self) -> SessionKind {
        match self {
            ActiveState::Working => SessionKind::Work,
            ActiveState::Breaking => SessionKind::Break,
        }
    }
}

/// Persisted timer state.
///
/// `start_timestamp_ms` is set only while working or breaking, and
/// `previous_state` only while paused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    #[serde(default)]
    pub previous_state: Option<ActiveState>,
    pub remaining_secs: f64,
    #[serde(default)]
    pub total_duration_secs: f64,
    /// Position within the long-break cycle, starting at 1.
    pub set_index: u32,
    #[serde(default)]
    pub start_timestamp_ms: Option<i64>,
    #[serde(default)]
    pub paused_at_ms: Option<i64>,
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self {
            state: TimerState::Idle,
            previous_state: None,
            remaining_secs: 0.0,
            total_duration_secs: 0.0,
            set_index: 1,
            start_timestamp_ms: None,
            paused_at_ms: None,
        }
    }
}

impl TimerSnapshot {
    /// Idle defaults carrying over the cycle position.
    pub fn idle_with_set_index(set_index: u32) -> Self {
        Self {
            set_index: set_index.max(1),
            ..Self::default()
        }
    }

    /// The active state this snapshot belongs to, looking through a pause.
    pub fn active_state(&self) -> Option<ActiveState> {
        match self.state {
            TimerState::Paused => self.previous_state,
            state => ActiveState::from_state(state),
        }
    }
}
