//! Scheduler layer
//!
//! Runs collection cycles, either once or on a fixed interval, and reports
//! how each cycle went.

pub mod collector;

pub use collector::{Collector, CycleOutcome, GatherReport, log_report};
