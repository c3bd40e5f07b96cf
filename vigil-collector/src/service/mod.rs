//! Service layer
//!
//! Services hold the collection logic. They drive the repository through the
//! shared limiter and hand their results to the cycle's accumulator.

pub mod accumulator;
pub mod crawler;
pub mod limiter;
pub mod nodes;

pub use accumulator::Accumulator;
pub use crawler::{CrawlSettings, JobCrawler};
pub use limiter::Limiter;
pub use nodes::NodePoller;
