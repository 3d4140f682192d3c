//! Cycle entry points.
//!
//! - `detect`: Compare a parsed listing against a board's watermark
//! - `Orchestrator::run_cycle`: Fetch, detect, dispatch and persist for every board

pub mod cycle;
pub mod detect;

pub use cycle::{BoardReport, BoardState, CycleReport, Orchestrator, RunMode};
pub use detect::{Candidate, Detection, detect};
