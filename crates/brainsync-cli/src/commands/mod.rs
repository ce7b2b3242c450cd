pub mod config;
pub mod stats;
pub mod timer;

use std::rc::Rc;

use brainsync_core::{ConfigFile, FocusApp, KvStore, SystemClock};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// The app over the on-disk store and config, not yet restored.
pub fn open_app() -> Result<FocusApp, Box<dyn std::error::Error>> {
    let store = KvStore::open()?;
    let config = ConfigFile::default_location()?;
    Ok(FocusApp::new(
        Rc::new(store),
        Rc::new(config),
        Rc::new(SystemClock),
    ))
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
