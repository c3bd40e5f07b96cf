//! Core domain types
//!
//! These types mirror what the CI server returns from its JSON API and are
//! shared between the HTTP client (which decodes them) and the collector
//! (which walks and normalizes them).

pub mod build;
pub mod job;
pub mod node;

pub use build::{BuildDetail, is_too_old, map_result_code};
pub use job::{ChildJob, JobListing, JobPath, JobRequest, LastBuild};
pub use node::{
    ComputerSet, Label, MonitorData, NodeRecord, Overview, ResponseTimeMonitor, SpaceMonitor,
    SwapSpaceMonitor,
};
