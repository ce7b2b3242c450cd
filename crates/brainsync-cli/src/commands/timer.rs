use std::io::{self, Write};
use std::ops::ControlFlow;

use brainsync_core::time_util::format_clock;
use brainsync_core::{Event, EventLog, FocusApp, Notice, Ticker, TimerState};
use clap::Subcommand;
use serde::Serialize;

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a work interval, or resume a paused one
    Start,
    /// Start a break
    Break {
        /// Take the long break
        #[arg(long)]
        long: bool,
    },
    /// Pause the running interval
    Pause,
    /// Resume a paused interval
    Resume,
    /// Pause or resume
    Toggle,
    /// Abandon the current interval
    Reset,
    /// Drop the current break and start working
    SkipBreak,
    /// Print current timer state as JSON
    Status,
    /// Stay in the foreground and tick until the current interval ends
    Watch,
}

#[derive(Serialize)]
struct TimerReport {
    state: TimerState,
    remaining_secs: f64,
    remaining: String,
    set_index: u32,
    events: Vec<Event>,
    notices: Vec<Notice>,
}

impl TimerReport {
    fn new(app: &mut FocusApp, log: &mut EventLog) -> Self {
        let timer = app.timer();
        Self {
            state: timer.state(),
            remaining_secs: timer.remaining_secs(),
            remaining: format_clock(timer.remaining_secs()),
            set_index: timer.set_index(),
            events: log.drain(),
            notices: app.take_notices(),
        }
    }
}

pub fn run(action: TimerAction) -> CliResult {
    let mut app = open_app()?;
    let mut log = app.event_log();
    app.restore(&mut log);

    match action {
        TimerAction::Start => app.start(&mut log),
        TimerAction::Break { long } => app.start_break(long, &mut log),
        TimerAction::Pause => {
            if app.state().is_active() {
                app.toggle_pause(&mut log);
            }
        }
        TimerAction::Resume => {
            if app.state() == TimerState::Paused {
                app.toggle_pause(&mut log);
            }
        }
        TimerAction::Toggle => app.toggle_pause(&mut log),
        TimerAction::Reset => {
            app.reset(&mut log);
        }
        TimerAction::SkipBreak => app.skip_break(&mut log),
        TimerAction::Status => {}
        TimerAction::Watch => return watch(app, log),
    }

    let report = TimerReport::new(&mut app, &mut log);
    app.dispose();
    print_json(&report)
}

fn watch(mut app: FocusApp, mut log: EventLog) -> CliResult {
    if !app.timer().is_ticking() {
        let report = TimerReport::new(&mut app, &mut log);
        return print_json(&report);
    }
    // Restore may have finished an interval and auto-started the next one.
    flush_pending(&mut app, &mut log, &mut io::stdout())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let ticker = Ticker::every_second();

    let finished = runtime.block_on(async {
        let ticking = ticker.run(|| match watch_step(&mut app, &mut log, &mut io::stdout()) {
            Ok(flow) => flow,
            Err(e) => {
                tracing::warn!(error = %e, "failed to write watch output");
                ControlFlow::Break(())
            }
        });

        tokio::select! {
            _ = ticking => true,
            _ = tokio::signal::ctrl_c() => false,
        }
    });

    if !finished {
        tracing::info!("watch interrupted, timer state kept");
    }
    app.dispose();
    Ok(())
}

/// Print whatever is already queued. Returns the number of notices.
fn flush_pending(
    app: &mut FocusApp,
    log: &mut EventLog,
    out: &mut impl Write,
) -> io::Result<usize> {
    let notices = app.take_notices();
    print_progress(out, log.drain(), &notices)?;
    Ok(notices.len())
}

/// One tick. Breaks once the running interval has produced a notice.
fn watch_step(
    app: &mut FocusApp,
    log: &mut EventLog,
    out: &mut impl Write,
) -> io::Result<ControlFlow<()>> {
    app.tick(log);
    if flush_pending(app, log, out)? == 0 {
        Ok(ControlFlow::Continue(()))
    } else {
        Ok(ControlFlow::Break(()))
    }
}

fn print_progress(
    out: &mut impl Write,
    events: Vec<Event>,
    notices: &[Notice],
) -> io::Result<()> {
    for event in events {
        if let Event::TimerTick {
            remaining_secs,
            state,
            ..
        } = event
        {
            writeln!(out, "{state:?} {}", format_clock(remaining_secs))?;
        }
    }
    for notice in notices {
        writeln!(out, "{}", serde_json::to_string(notice)?)?;
    }
    Ok(())
}
