use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::session::SessionRecord;
use crate::timer::TimerState;

/// Position in the long-break cycle as seen at the moment a work interval
/// completes, before the set counter wraps back to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleStatus {
    pub set_index: u32,
    pub long_break_interval: u32,
}

impl CycleStatus {
    pub fn is_long_break_due(&self) -> bool {
        self.set_index > self.long_break_interval
    }
}

/// Listener for timer lifecycle events.
///
/// Callbacks run synchronously inside the transition that produced them
/// and must not block.
pub trait TimerEvents {
    fn on_tick(&mut self, remaining_secs: f64, state: TimerState);
    fn on_state_change(&mut self, state: TimerState);
    fn on_work_complete(&mut self, session: &SessionRecord, cycle: CycleStatus);
    fn on_break_complete(&mut self, session: &SessionRecord);
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvents;

impl TimerEvents for NoopEvents {
    fn on_tick(&mut self, _remaining_secs: f64, _state: TimerState) {}
    fn on_state_change(&mut self, _state: TimerState) {}
    fn on_work_complete(&mut self, _session: &SessionRecord, _cycle: CycleStatus) {}
    fn on_break_complete(&mut self, _session: &SessionRecord) {}
}

/// Serializable form of a timer callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerTick {
        remaining_secs: f64,
        state: TimerState,
        at: DateTime<Utc>,
    },
    StateChanged {
        state: TimerState,
        at: DateTime<Utc>,
    },
    WorkCompleted {
        session: SessionRecord,
        cycle: CycleStatus,
        at: DateTime<Utc>,
    },
    BreakCompleted {
        session: SessionRecord,
        at: DateTime<Utc>,
    },
}

/// Records every callback in order, stamped by its clock.
#[derive(Clone)]
pub struct EventLog {
    events: Vec<Event>,
    clock: Rc<dyn Clock>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_clock(Rc::new(SystemClock))
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp events with `clock` instead of the system time. Pass the
    /// engine's clock so `at` agrees with session times.
    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self {
            events: Vec::new(),
            clock,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn ticks(&self) -> impl Iterator<Item = (f64, TimerState)> + '_ {
        self.events.iter().filter_map(|e| match e {
            Event::TimerTick {
                remaining_secs,
                state,
                ..
            } => Some((*remaining_secs, *state)),
            _ => None,
        })
    }

    pub fn state_changes(&self) -> impl Iterator<Item = TimerState> + '_ {
        self.events.iter().filter_map(|e| match e {
            Event::StateChanged { state, .. } => Some(*state),
            _ => None,
        })
    }

    pub fn completions(&self) -> impl Iterator<Item = &SessionRecord> + '_ {
        self.events.iter().filter_map(|e| match e {
            Event::WorkCompleted { session, .. } | Event::BreakCompleted { session, .. } => {
                Some(session)
            }
            _ => None,
        })
    }
}

impl TimerEvents for EventLog {
    fn on_tick(&mut self, remaining_secs: f64, state: TimerState) {
        self.events.push(Event::TimerTick {
            remaining_secs,
            state,
            at: self.clock.now(),
        });
    }

    fn on_state_change(&mut self, state: TimerState) {
        self.events.push(Event::StateChanged {
            state,
            at: self.clock.now(),
        });
    }

    fn on_work_complete(&mut self, session: &SessionRecord, cycle: CycleStatus) {
        self.events.push(Event::WorkCompleted {
            session: session.clone(),
            cycle,
            at: self.clock.now(),
        });
    }

    fn on_break_complete(&mut self, session: &SessionRecord) {
        self.events.push(Event::BreakCompleted {
            session: session.clone(),
            at: self.clock.now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_status_flags_long_break_after_interval() {
        let on_fourth = CycleStatus { set_index: 4, long_break_interval: 4 };
        let past_fourth = CycleStatus { set_index: 5, long_break_interval: 4 };
        assert!(!on_fourth.is_long_break_due());
        assert!(past_fourth.is_long_break_due());
    }

    #[test]
    fn log_stamps_events_with_its_clock() {
        use crate::clock::ManualClock;
        use chrono::TimeZone;

        let start = Utc.with_ymd_and_hms(2026, 2, 11, 9, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let mut log = EventLog::with_clock(Rc::new(clock.clone()));

        log.on_state_change(TimerState::Working);
        clock.advance_secs(30);
        log.on_tick(1770.0, TimerState::Working);

        let stamps: Vec<_> = log
            .events()
            .iter()
            .map(|e| match e {
                Event::StateChanged { at, .. } | Event::TimerTick { at, .. } => *at,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(stamps, vec![start, start + chrono::Duration::seconds(30)]);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = Event::StateChanged {
            state: TimerState::Paused,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "StateChanged");
        assert_eq!(json["state"], "paused");
    }
}
