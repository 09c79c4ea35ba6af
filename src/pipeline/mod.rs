//! Pipeline entry points for relay operations.
//!
//! - `ChangeDetector::run_cycle`: Detect and deliver new items once
//! - `run_poll_loop`: Repeat cycles on a fixed delay

pub mod detect;
pub mod poll;

pub use detect::{ChangeDetector, CycleReport, SourceOutcome};
pub use poll::run_poll_loop;
