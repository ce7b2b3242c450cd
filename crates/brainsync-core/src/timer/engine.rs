//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` about
//! once a second while [`TimerEngine::is_ticking`] reports an armed tick.
//! Remaining time is always recomputed from the start timestamp, so a
//! late or missed tick never drifts the countdown.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Working -> (Paused -> Working) -> Idle
//! Idle -> Breaking -> (Paused -> Breaking) -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(store, config, clock);
//! engine.restore(&mut events);
//! engine.start_work(&mut events);
//! // Once a second:
//! engine.tick(&mut events);
//! ```

use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};

use super::snapshot::{ActiveState, TimerSnapshot, TimerState};
use crate::clock::Clock;
use crate::events::{CycleStatus, TimerEvents};
use crate::session::{rounded_minutes, SessionKind, SessionRecord};
use crate::storage::{self, ConfigProvider, Store, TimerConfig};

/// Elapsed time beyond which a restored active snapshot is considered
/// corrupt.
pub const MAX_PLAUSIBLE_ELAPSED_SECS: f64 = 86_400.0;

/// Core timer engine.
///
/// Owns the [`TimerSnapshot`] and persists it through the store after
/// every mutation.
pub struct TimerEngine {
    data: TimerSnapshot,
    /// Configuration as of the last operation.
    config: TimerConfig,
    /// Start of the current session, kept in memory only.
    session_started_at: Option<DateTime<Utc>>,
    ticking: bool,
    store: Rc<dyn Store>,
    config_source: Rc<dyn ConfigProvider>,
    clock: Rc<dyn Clock>,
}

impl TimerEngine {
    /// Create an idle engine. Call [`TimerEngine::restore`] to pick up a
    /// persisted snapshot.
    pub fn new(
        store: Rc<dyn Store>,
        config_source: Rc<dyn ConfigProvider>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let config = config_source.config().timer;
        Self {
            data: TimerSnapshot::default(),
            config,
            session_started_at: None,
            ticking: false,
            store,
            config_source,
            clock,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.data.state
    }

    pub fn previous_state(&self) -> Option<ActiveState> {
        self.data.previous_state
    }

    pub fn remaining_secs(&self) -> f64 {
        self.data.remaining_secs
    }

    pub fn set_index(&self) -> u32 {
        self.data.set_index
    }

    pub fn snapshot(&self) -> &TimerSnapshot {
        &self.data
    }

    /// Whether a periodic tick is armed.
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    /// `true` between a work completion that crossed the long-break
    /// interval and the counter wrapping back to 1, which only the
    /// `on_work_complete` callback can observe.
    pub fn is_long_break_due(&self) -> bool {
        self.data.set_index > self.config.long_break_interval()
    }

    /// Breaking, or paused while breaking.
    pub fn is_breaking(&self) -> bool {
        self.data.active_state() == Some(ActiveState::Breaking)
    }

    /// Re-read configuration without changing state.
    pub fn reload_config(&mut self) {
        self.config = self.config_source.config().timer;
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Reload the persisted snapshot at process start, reconciling time
    /// spent while the process was not running.
    pub fn restore(&mut self, events: &mut dyn TimerEvents) {
        self.reload_config();
        let mut saved = storage::load_timer(self.store.as_ref());
        if saved.set_index > self.config.long_break_interval().saturating_add(1) {
            tracing::warn!(
                set_index = saved.set_index,
                "stored set index is out of range, restarting cycle"
            );
            saved.set_index = 1;
        }

        match saved.state {
            TimerState::Idle => {
                self.data = TimerSnapshot::idle_with_set_index(saved.set_index);
                self.session_started_at = None;
                tracing::debug!(set_index = saved.set_index, "restored idle timer");
            }
            TimerState::Paused => {
                if saved.previous_state.is_none() {
                    tracing::warn!("paused timer snapshot has no previous state, resetting");
                    self.discard_corrupt(saved.set_index);
                    return;
                }
                let mut data = saved;
                data.start_timestamp_ms = None;
                data.remaining_secs = data.remaining_secs.max(0.0);
                data.total_duration_secs = data.total_duration_secs.max(data.remaining_secs);
                self.session_started_at = data.paused_at_ms.and_then(|paused_at| {
                    let ran_ms = ((data.total_duration_secs - data.remaining_secs) * 1000.0) as i64;
                    from_epoch_ms(paused_at.saturating_sub(ran_ms.max(0)))
                });
                self.data = data;
                tracing::info!(remaining_secs = self.data.remaining_secs, "restored paused timer");
                events.on_state_change(self.data.state);
                events.on_tick(self.data.remaining_secs, self.data.state);
            }
            TimerState::Working | TimerState::Breaking => {
                let Some(start_ms) = saved.start_timestamp_ms else {
                    tracing::warn!("active timer snapshot has no start timestamp, resetting");
                    self.discard_corrupt(saved.set_index);
                    return;
                };
                let elapsed = self.clock.now_ms().saturating_sub(start_ms) as f64 / 1000.0;
                if !(0.0..=MAX_PLAUSIBLE_ELAPSED_SECS).contains(&elapsed) {
                    tracing::warn!(elapsed_secs = elapsed, "timer data is abnormal, resetting");
                    self.discard_corrupt(saved.set_index);
                    return;
                }

                let remaining = saved.total_duration_secs - elapsed;
                self.data = saved;
                self.data.previous_state = None;
                self.data.paused_at_ms = None;
                self.session_started_at = from_epoch_ms(start_ms);

                if remaining <= 0.0 {
                    tracing::info!(elapsed_secs = elapsed, "interval expired while away, completing");
                    self.data.remaining_secs = 0.0;
                    self.complete(events);
                    return;
                }

                self.data.remaining_secs = remaining;
                self.ticking = true;
                tracing::info!(remaining_secs = remaining, state = ?self.data.state, "resumed running timer");
                events.on_state_change(self.data.state);
                events.on_tick(self.data.remaining_secs, self.data.state);
            }
        }
    }

    pub fn start_work(&mut self, events: &mut dyn TimerEvents) {
        self.reload_config();
        let duration = self.config.work_secs();
        self.begin(TimerState::Working, duration, events);
    }

    pub fn start_break(&mut self, is_long: bool, events: &mut dyn TimerEvents) {
        self.reload_config();
        let duration = self.config.break_secs(is_long);
        self.begin(TimerState::Breaking, duration, events);
    }

    pub fn toggle_pause(&mut self, events: &mut dyn TimerEvents) {
        match self.data.state {
            TimerState::Paused => self.resume(events),
            TimerState::Working | TimerState::Breaking => self.pause(events),
            TimerState::Idle => {}
        }
    }

    pub fn pause(&mut self, events: &mut dyn TimerEvents) {
        let Some(active) = ActiveState::from_state(self.data.state) else {
            return;
        };

        self.ticking = false;
        self.data.remaining_secs = self.remaining_now();
        self.data.previous_state = Some(active);
        self.data.state = TimerState::Paused;
        self.data.start_timestamp_ms = None;
        self.data.paused_at_ms = Some(self.clock.now_ms());

        self.persist();
        tracing::debug!(remaining_secs = self.data.remaining_secs, "timer paused");
        events.on_state_change(self.data.state);
        events.on_tick(self.data.remaining_secs, self.data.state);
    }

    pub fn resume(&mut self, events: &mut dyn TimerEvents) {
        if self.data.state != TimerState::Paused {
            return;
        }
        let Some(previous) = self.data.previous_state else {
            return;
        };

        self.data.state = previous.state();
        self.data.previous_state = None;
        self.data.total_duration_secs = self.data.remaining_secs;
        self.data.start_timestamp_ms = Some(self.clock.now_ms());
        self.data.paused_at_ms = None;

        self.persist();
        self.ticking = true;
        tracing::debug!(remaining_secs = self.data.remaining_secs, "timer resumed");
        events.on_state_change(self.data.state);
        events.on_tick(self.data.remaining_secs, self.data.state);
    }

    /// Abandon the current interval.
    ///
    /// Returns an interrupted record when a session was running or paused.
    /// The set counter is preserved.
    pub fn reset(&mut self, events: &mut dyn TimerEvents) -> Option<SessionRecord> {
        self.ticking = false;

        let record = match (self.data.active_state(), self.session_started_at) {
            (Some(active), Some(started_at)) => {
                let ran_secs = self.data.total_duration_secs - self.remaining_now();
                Some(SessionRecord::aborted(
                    active.session_kind(),
                    started_at,
                    self.clock.now(),
                    rounded_minutes(ran_secs),
                ))
            }
            _ => None,
        };

        self.data = TimerSnapshot::idle_with_set_index(self.data.set_index);
        self.session_started_at = None;

        self.persist();
        tracing::debug!(aborted = record.is_some(), "timer reset");
        events.on_state_change(self.data.state);
        events.on_tick(0.0, self.data.state);

        record
    }

    /// Drop the current break, without a completion record, and start
    /// working. Ignored unless breaking or paused while breaking.
    pub fn skip_break(&mut self, events: &mut dyn TimerEvents) {
        if !self.is_breaking() {
            return;
        }
        self.ticking = false;
        self.session_started_at = None;
        tracing::debug!("break skipped");
        self.start_work(events);
    }

    /// Periodic update. Completes the interval once the wall clock says it
    /// is over.
    pub fn tick(&mut self, events: &mut dyn TimerEvents) {
        if !self.ticking || !self.data.state.is_active() {
            return;
        }

        self.data.remaining_secs = self.remaining_now();
        if self.data.remaining_secs <= 0.0 {
            self.complete(events);
        } else {
            events.on_tick(self.data.remaining_secs, self.data.state);
        }
    }

    /// Stop the periodic tick. The persisted snapshot is left untouched so
    /// the next process can restore it.
    pub fn dispose(&mut self) {
        self.ticking = false;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn begin(&mut self, state: TimerState, duration_secs: f64, events: &mut dyn TimerEvents) {
        let now = self.clock.now();
        self.data.state = state;
        self.data.previous_state = None;
        self.data.remaining_secs = duration_secs;
        self.data.total_duration_secs = duration_secs;
        self.data.start_timestamp_ms = Some(now.timestamp_millis());
        self.data.paused_at_ms = None;
        self.session_started_at = Some(now);

        self.persist();
        self.ticking = true;
        tracing::debug!(?state, duration_secs, "interval started");
        events.on_state_change(self.data.state);
        events.on_tick(self.data.remaining_secs, self.data.state);
    }

    /// Run when an active interval reaches zero.
    ///
    /// For work intervals the set counter is incremented *before*
    /// `on_work_complete` and wrapped to 1 only after it returns.
    fn complete(&mut self, events: &mut dyn TimerEvents) {
        self.ticking = false;

        let end = self.clock.now();
        let kind = if self.data.state == TimerState::Working {
            SessionKind::Work
        } else {
            SessionKind::Break
        };
        let record = SessionRecord::completed(
            kind,
            self.session_started_at.unwrap_or(end),
            end,
            rounded_minutes(self.data.total_duration_secs),
        );

        match kind {
            SessionKind::Work => {
                self.data.set_index = self.data.set_index.saturating_add(1);
                let cycle = CycleStatus {
                    set_index: self.data.set_index,
                    long_break_interval: self.config.long_break_interval(),
                };
                tracing::info!(set_index = cycle.set_index, minutes = record.duration_minutes, "work interval completed");
                events.on_work_complete(&record, cycle);

                if self.data.set_index > self.config.long_break_interval() {
                    self.data.set_index = 1;
                }
            }
            SessionKind::Break => {
                tracing::info!(minutes = record.duration_minutes, "break interval completed");
                events.on_break_complete(&record);
            }
        }

        self.data = TimerSnapshot::idle_with_set_index(self.data.set_index);
        self.session_started_at = None;

        self.persist();
        events.on_state_change(self.data.state);
    }

    fn discard_corrupt(&mut self, set_index: u32) {
        self.ticking = false;
        self.data = TimerSnapshot::idle_with_set_index(set_index);
        self.session_started_at = None;
        self.persist();
    }

    /// Remaining seconds as of now: recomputed from the start timestamp
    /// while active, frozen otherwise.
    fn remaining_now(&self) -> f64 {
        match self.data.start_timestamp_ms {
            Some(start_ms) if self.data.state.is_active() => {
                let elapsed = self.clock.now_ms().saturating_sub(start_ms) as f64 / 1000.0;
                (self.data.total_duration_secs - elapsed).max(0.0)
            }
            _ => self.data.remaining_secs,
        }
    }

    fn persist(&self) {
        storage::save_timer(self.store.as_ref(), &self.data);
    }
}

fn from_epoch_ms(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}
