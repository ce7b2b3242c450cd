//! # BrainSync Core Library
//!
//! Core logic for the BrainSync focus timer: a Pomodoro-style work/break
//! cycle whose history feeds a heuristic fatigue score. Every operation is
//! available to the `brainsync` CLI, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine that requires the caller
//!   to periodically invoke `tick()` for progress updates
//! - **Statistics**: Daily, weekly and all-time aggregates with day rollover
//!   and a bounded session history
//! - **Fatigue scoring**: A 0-45 score from session volume, streaks,
//!   interruptions and skipped breaks
//! - **Storage**: SQLite key-value snapshots and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`FocusApp`]: Timer, statistics and fatigue alert wired together
//! - [`KvStore`]: Snapshot persistence
//! - [`Config`]: Application configuration management

pub mod alert;
pub mod app;
pub mod clock;
pub mod error;
pub mod events;
pub mod session;
pub mod stats;
pub mod storage;
pub mod time_util;
pub mod timer;

pub use alert::AlertState;
pub use app::{FocusApp, Notice};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError};
pub use events::{CycleStatus, Event, EventLog, NoopEvents, TimerEvents};
pub use session::{SessionKind, SessionRecord};
pub use stats::{DailyStats, ExportRange, FatigueLevel, Statistics, WeeklyStats};
pub use storage::{Config, ConfigFile, ConfigProvider, KvStore, MemoryStore, Store, StoreKind};
pub use timer::{ActiveState, Ticker, TimerEngine, TimerSnapshot, TimerState};
