//! Job-related API endpoints

use crate::JenkinsClient;
use crate::error::Result;
use reqwest::Url;
use vigil_core::domain::{BuildDetail, JobListing, JobPath};

const API_JSON: [&str; 2] = ["api", "json"];

impl JenkinsClient {
    // =============================================================================
    // Job Hierarchy
    // =============================================================================

    /// List the jobs at the top of the hierarchy
    ///
    /// # Returns
    /// A listing whose `jobs` holds bare names, without any path prefix
    pub async fn list_top_level_jobs(&self) -> Result<JobListing> {
        let url = self.endpoint(API_JSON)?;
        self.get_json(url).await
    }

    /// Get a job's listing: its last build summary and immediate children
    ///
    /// # Arguments
    /// * `path` - Full path of the job, root first
    pub async fn list_children(&self, path: &JobPath) -> Result<JobListing> {
        let url = self.job_url(path)?;
        self.get_json(url).await
    }

    /// Get the details of one build of a job
    ///
    /// # Arguments
    /// * `path` - Full path of the job, root first
    /// * `number` - Build number
    pub async fn get_build(&self, path: &JobPath, number: i64) -> Result<BuildDetail> {
        let url = self.build_url(path, number)?;
        self.get_json(url).await
    }

    /// `<base>/job/<a>/job/<b>/api/json`
    pub(crate) fn job_url(&self, path: &JobPath) -> Result<Url> {
        self.endpoint(job_segments(path).chain(API_JSON))
    }

    /// `<base>/job/<a>/job/<b>/<number>/api/json`
    pub(crate) fn build_url(&self, path: &JobPath, number: i64) -> Result<Url> {
        let number = number.to_string();
        self.endpoint(
            job_segments(path)
                .chain(std::iter::once(number.as_str()))
                .chain(API_JSON),
        )
    }
}

fn job_segments(path: &JobPath) -> impl Iterator<Item = &str> {
    path.segments()
        .iter()
        .flat_map(|segment| ["job", segment.as_str()])
}
