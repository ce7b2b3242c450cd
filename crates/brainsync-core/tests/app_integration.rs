//! End-to-end tests for `FocusApp` over an on-disk database and config
//! file, simulating separate process runs against the same data.

use std::path::Path;
use std::rc::Rc;

use brainsync_core::storage::{self, Config};
use brainsync_core::{
    Clock, ConfigFile, EventLog, ExportRange, FocusApp, KvStore, ManualClock, NoopEvents, Notice,
    TimerState,
};
use chrono::{TimeZone, Utc};

fn open_app(dir: &Path, clock: &ManualClock) -> FocusApp {
    let store = KvStore::open_at(&dir.join("brainsync.db")).unwrap();
    FocusApp::new(
        Rc::new(store),
        Rc::new(ConfigFile::new(dir.join("config.toml"))),
        Rc::new(clock.clone()),
    )
}

fn write_config(dir: &Path, edit: impl FnOnce(&mut Config)) {
    let mut config = Config::default();
    edit(&mut config);
    config.save_to(&dir.join("config.toml")).unwrap();
}

#[test]
fn test_work_session_survives_restart_and_completes() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), |c| c.timer.auto_start_break = false);
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 2, 11, 9, 0, 0).unwrap());

    {
        let mut app = open_app(dir.path(), &clock);
        app.restore(&mut NoopEvents);
        app.start(&mut NoopEvents);
        clock.advance_secs(600);
        app.tick(&mut NoopEvents);
        app.dispose();
    }

    clock.advance_secs(600);
    let mut app = open_app(dir.path(), &clock);
    let mut log = EventLog::new();
    app.restore(&mut log);
    assert_eq!(app.state(), TimerState::Working);
    assert_eq!(app.timer().remaining_secs(), 600.0);

    clock.advance_secs(600);
    app.tick(&mut log);
    assert_eq!(app.state(), TimerState::Idle);
    assert_eq!(log.completions().count(), 1);

    let stats = app.stats_view();
    assert_eq!(stats.today.sessions, 1);
    assert_eq!(stats.all_time.total_focus_minutes, 30);
    assert!(matches!(
        app.take_notices().as_slice(),
        [Notice::WorkCompleted { long_break_due: false, .. }]
    ));
}

#[test]
fn test_config_edits_apply_to_next_interval() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), |_| {});
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 2, 11, 9, 0, 0).unwrap());
    let mut app = open_app(dir.path(), &clock);

    app.start(&mut NoopEvents);
    assert_eq!(app.timer().remaining_secs(), 1800.0);
    app.reset(&mut NoopEvents);

    write_config(dir.path(), |c| {
        c.timer.work_duration = 45;
        c.timer.short_break = 10;
    });
    app.start(&mut NoopEvents);
    assert_eq!(app.timer().remaining_secs(), 2700.0);

    clock.advance_secs(2700);
    app.tick(&mut NoopEvents);
    assert_eq!(app.state(), TimerState::Breaking);
    assert_eq!(app.timer().remaining_secs(), 600.0);
}

#[test]
fn test_expired_break_on_restore_auto_starts_work() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), |c| c.timer.auto_start_work = true);
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 2, 11, 9, 0, 0).unwrap());

    {
        let mut app = open_app(dir.path(), &clock);
        app.start_break(false, &mut NoopEvents);
    }

    clock.advance_secs(3600);
    let mut app = open_app(dir.path(), &clock);
    app.restore(&mut NoopEvents);

    assert_eq!(app.state(), TimerState::Working);
    assert!(matches!(app.take_notices().as_slice(), [Notice::BreakCompleted { .. }]));
    assert_eq!(app.stats_view().today.total_break_minutes, 5);
}

#[test]
fn test_export_and_reset_statistics() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), |c| c.timer.auto_start_break = false);
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 2, 11, 9, 0, 0).unwrap());
    let mut app = open_app(dir.path(), &clock);

    for _ in 0..2 {
        app.start(&mut NoopEvents);
        clock.advance_secs(1800);
        app.tick(&mut NoopEvents);
    }

    let csv = app.export_csv(ExportRange::All).unwrap();
    assert_eq!(
        csv,
        "Date,Sessions,Focus Time (min),Break Time (min),Interrupted,Fatigue Score\n2026-02-11,2,60,0,0,5"
    );

    app.reset_statistics();
    let store = KvStore::open_at(&dir.path().join("brainsync.db")).unwrap();
    assert_eq!(storage::load_statistics(&store, clock.now()).today.sessions, 0);
}
