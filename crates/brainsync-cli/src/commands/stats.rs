use std::path::PathBuf;

use brainsync_core::time_util::format_minutes;
use brainsync_core::{DailyStats, ExportRange, FatigueLevel};
use clap::Subcommand;
use serde::Serialize;

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's statistics
    Today,
    /// This week's statistics (Monday to Sunday)
    Week,
    /// All-time totals
    All,
    /// Export daily rows as CSV
    Export {
        /// week, month or all
        #[arg(long, default_value = "week")]
        range: ExportRange,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Clear statistics and fatigue alert state
    Reset,
}

#[derive(Serialize)]
struct TodayReport<'a> {
    #[serde(flatten)]
    day: &'a DailyStats,
    focus_time: String,
    fatigue_level: FatigueLevel,
    fatigue_indicator: &'static str,
}

pub fn run(action: StatsAction) -> CliResult {
    let app = open_app()?;

    match action {
        StatsAction::Today => {
            let stats = app.stats_view();
            let level = FatigueLevel::from_score(stats.today.fatigue_score);
            print_json(&TodayReport {
                day: &stats.today,
                focus_time: format_minutes(stats.today.total_focus_minutes),
                fatigue_level: level,
                fatigue_indicator: level.indicator(),
            })?;
        }
        StatsAction::Week => print_json(&app.stats_view().week)?,
        StatsAction::All => print_json(&app.stats_view().all_time)?,
        StatsAction::Export { range, output } => {
            let csv = app.export_csv(range)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, format!("{csv}\n"))?;
                    eprintln!("exported {range} statistics to {}", path.display());
                }
                None => println!("{csv}"),
            }
        }
        StatsAction::Reset => {
            app.reset_statistics();
            println!("statistics reset");
        }
    }
    Ok(())
}
