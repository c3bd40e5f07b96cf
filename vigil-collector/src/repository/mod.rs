//! Repository layer
//!
//! Repositories abstract the CI server's API behind a trait so the crawler
//! and poller can run against the real HTTP client or an in-memory fake.

mod jobs;

pub use jobs::{HttpJobSource, JobSource};
