//! Vigil Collector
//!
//! Polls a Jenkins-style CI server and turns its jobs, builds and nodes into
//! normalized metric events.
//!
//! Architecture:
//! - Configuration: every tunable of a collection cycle
//! - Repository: trait-based access to the server's JSON API
//! - Services: job tree crawler, node poller, concurrency limiter
//! - Scheduler: collection cycles and the periodic loop
//! - Sinks: where events go (line protocol on a writer, or memory)
//!
//! Each cycle starts from scratch: nothing is cached or retried between
//! cycles, and a failed request only costs the branch that issued it.

pub mod config;
pub mod error;
pub mod repository;
pub mod scheduler;
pub mod service;
pub mod sink;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::CollectError;
pub use scheduler::{Collector, CycleOutcome, GatherReport};
