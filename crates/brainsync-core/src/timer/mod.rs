mod engine;
mod snapshot;
mod ticker;

pub use engine::{TimerEngine, MAX_PLAUSIBLE_ELAPSED_SECS};
pub use snapshot::{ActiveState, TimerSnapshot, TimerState};
pub use ticker::Ticker;
