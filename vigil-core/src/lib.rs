//! Vigil Core
//!
//! Core types and abstractions shared by the Vigil collector and client.
//!
//! This crate contains:
//! - Domain types: decoded job, build and node records from the CI server
//! - Metrics: the normalized event shape handed to sinks
//! - Filtering: include/exclude glob matching over job and node names

pub mod domain;
pub mod filter;
pub mod metric;

pub use filter::{Filter, FilterError};
pub use metric::{FieldValue, MetricEvent, MetricKind};
