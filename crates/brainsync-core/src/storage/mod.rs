//! Persistence collaborator.
//!
//! Three snapshot kinds are stored, each as a single JSON document that is
//! replaced on every write: the timer snapshot, the statistics aggregate and
//! the fatigue alert state. Reads that fail validation fall back to
//! defaults; write failures are logged and never reach the caller.

mod config;
pub mod database;
mod memory;

pub use config::{Config, ConfigFile, ConfigProvider, FatigueAlertConfig, NotificationsConfig, TimerConfig};
pub use database::KvStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::alert::AlertState;
use crate::error::{ConfigError, Result};
use crate::stats::Statistics;
use crate::timer::TimerSnapshot;

/// The kinds of snapshot the store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    TimerData,
    Statistics,
    AlertState,
}

impl StoreKind {
    pub fn key(self) -> &'static str {
        match self {
            StoreKind::TimerData => "brainsync.timerData",
            StoreKind::Statistics => "brainsync.statistics",
            StoreKind::AlertState => "brainsync.alertState",
        }
    }
}

/// Key-value storage with atomic replace-on-write per kind.
///
/// `set` is fire-and-forget: implementations log failures instead of
/// returning them, and the caller's in-memory state stays authoritative.
pub trait Store {
    fn get(&self, kind: StoreKind) -> Option<serde_json::Value>;
    fn set(&self, kind: StoreKind, value: serde_json::Value);
    fn remove(&self, kind: StoreKind);
}

/// Read and deserialize one snapshot, discarding malformed payloads.
pub fn load_value<T: DeserializeOwned>(store: &dyn Store, kind: StoreKind) -> Option<T> {
    let value = store.get(kind)?;
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(key = kind.key(), error = %e, "stored snapshot is invalid, using defaults");
            None
        }
    }
}

pub fn save_value<T: Serialize>(store: &dyn Store, kind: StoreKind, value: &T) {
    match serde_json::to_value(value) {
        Ok(json) => store.set(kind, json),
        Err(e) => tracing::error!(key = kind.key(), error = %e, "failed to serialize snapshot"),
    }
}

pub fn load_timer(store: &dyn Store) -> TimerSnapshot {
    load_value::<TimerSnapshot>(store, StoreKind::TimerData)
        .filter(|snapshot| {
            let ok = snapshot.set_index >= 1;
            if !ok {
                tracing::warn!("stored timer snapshot has set_index 0, using defaults");
            }
            ok
        })
        .unwrap_or_default()
}

pub fn save_timer(store: &dyn Store, snapshot: &TimerSnapshot) {
    save_value(store, StoreKind::TimerData, snapshot);
}

pub fn load_statistics(store: &dyn Store, now: DateTime<Utc>) -> Statistics {
    load_value(store, StoreKind::Statistics).unwrap_or_else(|| Statistics::new(now))
}

pub fn save_statistics(store: &dyn Store, stats: &Statistics) {
    save_value(store, StoreKind::Statistics, stats);
}

pub fn load_alert_state(store: &dyn Store) -> AlertState {
    load_value(store, StoreKind::AlertState).unwrap_or_default()
}

pub fn save_alert_state(store: &dyn Store, state: &AlertState) {
    save_value(store, StoreKind::AlertState, state);
}

/// Drop every snapshot kind.
pub fn reset_all(store: &dyn Store) {
    store.remove(StoreKind::Statistics);
    store.remove(StoreKind::TimerData);
    store.remove(StoreKind::AlertState);
}

/// Drop statistics and alert state, keeping the running timer.
pub fn reset_statistics(store: &dyn Store) {
    store.remove(StoreKind::Statistics);
    store.remove(StoreKind::AlertState);
}

/// Returns the data directory.
///
/// `BRAINSYNC_HOME` wins when set; otherwise `~/.config/brainsync[-dev]/`
/// based on `BRAINSYNC_ENV` (set it to `dev` for a development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("BRAINSYNC_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("BRAINSYNC_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("brainsync-dev")
            } else {
                base_dir.join("brainsync")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerState;
    use serde_json::json;

    #[test]
    fn missing_snapshots_fall_back_to_defaults() {
        let store = MemoryStore::new();
        let timer = load_timer(&store);
        assert_eq!(timer.state, TimerState::Idle);
        assert_eq!(timer.set_index, 1);
        assert_eq!(load_alert_state(&store), AlertState::default());
    }

    #[test]
    fn malformed_timer_snapshot_is_replaced_by_default() {
        let store = MemoryStore::new();
        store.set(StoreKind::TimerData, json!({ "state": "working" }));
        let timer = load_timer(&store);
        assert_eq!(timer.state, TimerState::Idle);

        store.set(StoreKind::TimerData, json!("garbage"));
        assert_eq!(load_timer(&store).state, TimerState::Idle);
    }

    #[test]
    fn zero_set_index_is_rejected() {
        let store = MemoryStore::new();
        let mut snapshot = TimerSnapshot::default();
        snapshot.set_index = 0;
        save_timer(&store, &snapshot);
        assert_eq!(load_timer(&store).set_index, 1);
    }

    #[test]
    fn malformed_statistics_fall_back_to_fresh_day() {
        let store = MemoryStore::new();
        store.set(StoreKind::Statistics, json!({ "today": { "date": 7 } }));
        let now = Utc::now();
        let stats = load_statistics(&store, now);
        assert_eq!(stats.today.date, now.date_naive());
        assert!(stats.history.is_empty());
    }

    #[test]
    fn reset_statistics_keeps_timer() {
        let store = MemoryStore::new();
        let now = Utc::now();
        save_timer(&store, &TimerSnapshot::default());
        save_statistics(&store, &Statistics::new(now));
        save_alert_state(&store, &AlertState::default());

        reset_statistics(&store);
        assert!(store.get(StoreKind::TimerData).is_some());
        assert!(store.get(StoreKind::Statistics).is_none());
        assert!(store.get(StoreKind::AlertState).is_none());

        reset_all(&store);
        assert!(store.get(StoreKind::TimerData).is_none());
    }
}
