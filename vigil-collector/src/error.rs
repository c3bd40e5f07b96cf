//! Collection errors
//!
//! Config errors are fatal and stop a cycle before any request is sent.
//! Fetch and data errors belong to one branch of the traversal: they are
//! collected, reported with the cycle, and never abort sibling branches.

use thiserror::Error;
use vigil_client::ClientError;
use vigil_core::FilterError;

#[derive(Debug, Error)]
pub enum CollectError {
    /// Invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),

    /// A job or node filter pattern did not compile
    #[error("error compiling {scope} filters: {source}")]
    Filter {
        scope: &'static str,
        #[source]
        source: FilterError,
    },

    /// Transport failure, non-2xx response or undecodable body
    #[error("error fetching {resource}: {source}")]
    Fetch {
        resource: String,
        #[source]
        source: ClientError,
    },

    /// A record was decoded but is missing or has an unusable value
    #[error("invalid data for {resource}: {reason}")]
    Data { resource: String, reason: String },

    /// A crawl task panicked or was cancelled before finishing its subtree
    #[error("crawl task failed: {0}")]
    Task(String),
}

impl CollectError {
    pub fn fetch(resource: impl Into<String>, source: ClientError) -> Self {
        Self::Fetch {
            resource: resource.into(),
            source,
        }
    }

    pub fn data(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Data {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error prevents any collection from happening
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Filter { .. })
    }
}
