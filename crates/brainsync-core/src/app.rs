//! Wiring between the timer, the statistics aggregate and the fatigue
//! alert.
//!
//! [`FocusApp`] owns the engine and routes every finished session into
//! the persisted statistics. Anything that should reach the user is
//! queued as a [`Notice`]; how notices are shown is up to the caller.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::alert::{self, AlertState};
use crate::clock::Clock;
use crate::error::Result;
use crate::events::{CycleStatus, EventLog, TimerEvents};
use crate::session::{SessionKind, SessionRecord};
use crate::stats::{self, ExportRange, FatigueLevel, Statistics};
use crate::storage::{self, ConfigProvider, Store};
use crate::time_util;
use crate::timer::{TimerEngine, TimerState};

/// Outcome worth telling the user about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notice {
    WorkCompleted {
        session: SessionRecord,
        long_break_due: bool,
        fatigue_score: u8,
    },
    BreakCompleted {
        session: SessionRecord,
    },
    FatigueAlert {
        score: u8,
        level: FatigueLevel,
    },
}

enum Completion {
    Work(SessionRecord, CycleStatus),
    Break(SessionRecord),
}

/// Forwards every callback to the caller's sink and keeps completions
/// for processing once the engine call has returned.
struct Relay<'a> {
    inner: &'a mut dyn TimerEvents,
    completions: Vec<Completion>,
}

impl TimerEvents for Relay<'_> {
    fn on_tick(&mut self, remaining_secs: f64, state: TimerState) {
        self.inner.on_tick(remaining_secs, state);
    }

    fn on_state_change(&mut self, state: TimerState) {
        self.inner.on_state_change(state);
    }

    fn on_work_complete(&mut self, session: &SessionRecord, cycle: CycleStatus) {
        self.inner.on_work_complete(session, cycle);
        self.completions.push(Completion::Work(session.clone(), cycle));
    }

    fn on_break_complete(&mut self, session: &SessionRecord) {
        self.inner.on_break_complete(session);
        self.completions.push(Completion::Break(session.clone()));
    }
}

pub struct FocusApp {
    engine: TimerEngine,
    store: Rc<dyn Store>,
    config_source: Rc<dyn ConfigProvider>,
    clock: Rc<dyn Clock>,
    notices: Vec<Notice>,
}

impl FocusApp {
    pub fn new(
        store: Rc<dyn Store>,
        config_source: Rc<dyn ConfigProvider>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let engine = TimerEngine::new(store.clone(), config_source.clone(), clock.clone());
        Self {
            engine,
            store,
            config_source,
            clock,
            notices: Vec::new(),
        }
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn state(&self) -> TimerState {
        self.engine.state()
    }

    /// An empty event log stamped by this app's clock.
    pub fn event_log(&self) -> EventLog {
        EventLog::with_clock(self.clock.clone())
    }

    /// Notices queued since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Restore the persisted timer. An interval that ran out while the
    /// process was gone is recorded like any other completion.
    pub fn restore(&mut self, events: &mut dyn TimerEvents) {
        self.drive(events, |engine, sink| engine.restore(sink));
    }

    pub fn dispose(&mut self) {
        self.engine.dispose();
    }

    /// Start working from idle, or resume a paused interval.
    pub fn start(&mut self, events: &mut dyn TimerEvents) {
        match self.engine.state() {
            TimerState::Idle => self.drive(events, |engine, sink| engine.start_work(sink)),
            TimerState::Paused => self.drive(events, |engine, sink| engine.resume(sink)),
            TimerState::Working | TimerState::Breaking => {}
        }
    }

    pub fn start_break(&mut self, is_long: bool, events: &mut dyn TimerEvents) {
        self.drive(events, |engine, sink| engine.start_break(is_long, sink));
    }

    pub fn toggle_pause(&mut self, events: &mut dyn TimerEvents) {
        self.drive(events, |engine, sink| engine.toggle_pause(sink));
    }

    pub fn skip_break(&mut self, events: &mut dyn TimerEvents) {
        self.drive(events, |engine, sink| engine.skip_break(sink));
    }

    pub fn tick(&mut self, events: &mut dyn TimerEvents) {
        self.drive(events, |engine, sink| engine.tick(sink));
    }

    /// Abandon the current interval. Interrupted work counts against the
    /// day's interruption rate; interrupted breaks are not recorded.
    pub fn reset(&mut self, events: &mut dyn TimerEvents) -> Option<SessionRecord> {
        let record = self.drive(events, |engine, sink| engine.reset(sink));
        if let Some(record) = &record {
            if record.kind == SessionKind::Work && !record.completed {
                self.record(record.clone());
            }
        }
        record
    }

    /// Statistics with the weekly view brought up to date.
    pub fn stats_view(&self) -> Statistics {
        let now = self.clock.now();
        let mut stats = storage::load_statistics(self.store.as_ref(), now);
        stats::recompute_week(&mut stats, now);
        storage::save_statistics(self.store.as_ref(), &stats);
        stats
    }

    pub fn export_csv(&self, range: ExportRange) -> Result<String> {
        let stats = self.stats_view();
        stats::export_csv(&stats, range, self.clock.now())
    }

    /// Clear statistics and alert state. The timer keeps running.
    pub fn reset_statistics(&self) {
        storage::reset_statistics(self.store.as_ref());
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn drive<R>(
        &mut self,
        events: &mut dyn TimerEvents,
        op: impl FnOnce(&mut TimerEngine, &mut dyn TimerEvents) -> R,
    ) -> R {
        let mut relay = Relay {
            inner: &mut *events,
            completions: Vec::new(),
        };
        let out = op(&mut self.engine, &mut relay);
        let completions = relay.completions;

        for completion in completions {
            match completion {
                Completion::Work(session, cycle) => self.on_work_complete(session, cycle, events),
                Completion::Break(session) => self.on_break_complete(session, events),
            }
        }
        out
    }

    fn on_work_complete(
        &mut self,
        session: SessionRecord,
        cycle: CycleStatus,
        events: &mut dyn TimerEvents,
    ) {
        let stats = self.record(session.clone());
        let score = stats.today.fatigue_score;
        let long_break_due = cycle.is_long_break_due();

        self.notices.push(Notice::WorkCompleted {
            session,
            long_break_due,
            fatigue_score: score,
        });
        self.check_fatigue_alert(score);

        if self.config_source.config().timer.auto_start_break
            && self.engine.state() == TimerState::Idle
        {
            tracing::debug!(long_break_due, "auto-starting break");
            self.drive(events, |engine, sink| engine.start_break(long_break_due, sink));
        }
    }

    fn on_break_complete(&mut self, session: SessionRecord, events: &mut dyn TimerEvents) {
        self.record(session.clone());
        self.notices.push(Notice::BreakCompleted { session });

        if self.config_source.config().timer.auto_start_work
            && self.engine.state() == TimerState::Idle
        {
            tracing::debug!("auto-starting work");
            self.drive(events, |engine, sink| engine.start_work(sink));
        }
    }

    fn record(&self, session: SessionRecord) -> Statistics {
        let now = self.clock.now();
        let mut stats = storage::load_statistics(self.store.as_ref(), now);
        stats::record_session(&mut stats, session, now);
        stats::recompute_week(&mut stats, now);
        storage::save_statistics(self.store.as_ref(), &stats);
        stats
    }

    fn check_fatigue_alert(&mut self, score: u8) {
        let config = self.config_source.config();
        let today = time_util::today(self.clock.now());
        let state = storage::load_alert_state(self.store.as_ref());

        if !alert::should_alert(score, &config, &state, today) {
            return;
        }

        storage::save_alert_state(self.store.as_ref(), &AlertState::record(today, score));
        let level = FatigueLevel::from_score(score);
        tracing::info!(score, level = level.label(), "fatigue alert");
        self.notices.push(Notice::FatigueAlert { score, level });
    }
}
