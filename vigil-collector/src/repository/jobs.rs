//! Job source repository
//!
//! Every request shape the collector issues against the CI server:
//! - Top-level job listing and nested listings
//! - Build details for one build number
//! - Executor overview and the node collection

use async_trait::async_trait;
use vigil_client::{JenkinsClient, Result};
use vigil_core::domain::{BuildDetail, JobListing, JobPath, NodeRecord, Overview};

/// Repository trait for reading the job hierarchy and nodes
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Lists the jobs at the root of the hierarchy
    async fn list_top_level_jobs(&self) -> Result<JobListing>;

    /// Fetches a job's last build summary and its immediate children
    async fn list_children(&self, path: &JobPath) -> Result<JobListing>;

    /// Fetches one build of a job
    async fn get_build(&self, path: &JobPath, number: i64) -> Result<BuildDetail>;

    /// Fetches the busy/total executor counters
    async fn get_overview(&self) -> Result<Overview>;

    /// Fetches every registered worker node
    async fn list_nodes(&self) -> Result<Vec<NodeRecord>>;
}

/// HTTP implementation of JobSource
pub struct HttpJobSource {
    client: JenkinsClient,
}

impl HttpJobSource {
    pub fn new(client: JenkinsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobSource for HttpJobSource {
    async fn list_top_level_jobs(&self) -> Result<JobListing> {
        self.client.list_top_level_jobs().await
    }

    async fn list_children(&self, path: &JobPath) -> Result<JobListing> {
        self.client.list_children(path).await
    }

    async fn get_build(&self, path: &JobPath, number: i64) -> Result<BuildDetail> {
        self.client.get_build(path, number).await
    }

    async fn get_overview(&self) -> Result<Overview> {
        self.client.get_overview().await
    }

    async fn list_nodes(&self) -> Result<Vec<NodeRecord>> {
        Ok(self.client.get_computers().await?.computers)
    }
}
