use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Work,
    Break,
}

/// One finished interval, completed or interrupted.
///
/// Records are appended to history and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Rounded minutes.
    pub duration_minutes: u32,
    pub kind: SessionKind,
    /// `true` when the interval ran to natural expiry.
    pub completed: bool,
}

impl SessionRecord {
    pub fn new(
        kind: SessionKind,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        duration_minutes: u32,
        completed: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start_time,
            end_time,
            duration_minutes,
            kind,
            completed,
        }
    }

    pub fn completed(
        kind: SessionKind,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        duration_minutes: u32,
    ) -> Self {
        Self::new(kind, start_time, end_time, duration_minutes, true)
    }

    pub fn aborted(
        kind: SessionKind,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        duration_minutes: u32,
    ) -> Self {
        Self::new(kind, start_time, end_time, duration_minutes, false)
    }

    pub fn is_completed_work(&self) -> bool {
        self.kind == SessionKind::Work && self.completed
    }
}

/// Round a second count to whole minutes, never negative.
pub fn rounded_minutes(seconds: f64) -> u32 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds / 60.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_get_unique_ids() {
        let now = Utc::now();
        let a = SessionRecord::completed(SessionKind::Work, now, now, 30);
        let b = SessionRecord::completed(SessionKind::Work, now, now, 30);
        assert_ne!(a.id, b.id);
        assert!(a.is_completed_work());
    }

    #[test]
    fn rounded_minutes_rounds_half_up() {
        assert_eq!(rounded_minutes(1800.0), 30);
        assert_eq!(rounded_minutes(89.0), 1);
        assert_eq!(rounded_minutes(90.0), 2);
        assert_eq!(rounded_minutes(29.0), 0);
        assert_eq!(rounded_minutes(-5.0), 0);
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SessionKind::Break).unwrap(), "\"break\"");
    }
}
