//! Job hierarchy types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered path of job names from the root of the hierarchy down to one job.
///
/// A path is never empty. Children are always addressed strictly below their
/// parent, so a traversal never revisits a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobPath {
    segments: Vec<String>,
}

impl JobPath {
    /// Creates a path for a top-level job
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// Derives the path of a child job nested directly below this one
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(name.into());
        Self { segments }
    }

    /// All segments, root first
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The job's own name (last segment)
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Segments above the job itself
    pub fn parents(&self) -> &[String] {
        &self.segments[..self.segments.len().saturating_sub(1)]
    }

    /// Full hierarchical name, e.g. `folder/pipeline/main`
    pub fn hierarchy_name(&self) -> String {
        self.segments.join("/")
    }

    /// Parent segments joined by `/`; empty for top-level jobs
    pub fn parents_name(&self) -> String {
        self.parents().join("/")
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for JobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hierarchy_name())
    }
}

/// One scheduled step of the traversal: a job path and its depth (root = 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    path: JobPath,
    depth: usize,
}

impl JobRequest {
    /// Request for a top-level job at depth 0
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            path: JobPath::root(name),
            depth: 0,
        }
    }

    /// Request for a child of this job, one layer deeper
    pub fn child(&self, name: impl Into<String>) -> Self {
        Self {
            path: self.path.child(name),
            depth: self.depth + 1,
        }
    }

    pub fn path(&self) -> &JobPath {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Decoded `api/json` response for the server root or a single job.
///
/// For the server root only `jobs` is populated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    #[serde(default)]
    pub name: Option<String>,

    /// Summary of the most recent build; `null` when the job never ran
    #[serde(default)]
    pub last_build: Option<LastBuild>,

    /// Immediate children, in the order the server lists them
    #[serde(default)]
    pub jobs: Vec<ChildJob>,
}

impl JobListing {
    /// Number of the last build, if there is one worth reporting
    pub fn last_build_number(&self) -> Option<i64> {
        self.last_build
            .as_ref()
            .map(|b| b.number)
            .filter(|n| *n >= 1)
    }

    /// The last `limit` children in listing order.
    ///
    /// Servers append new jobs at the end of the listing, so the tail is the
    /// most recently added part of a layer.
    pub fn newest_children(&self, limit: usize) -> &[ChildJob] {
        let skip = self.jobs.len().saturating_sub(limit);
        &self.jobs[skip..]
    }
}

/// Build reference embedded in a job listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastBuild {
    #[serde(default)]
    pub number: i64,
    #[serde(default)]
    pub url: Option<String>,
}

/// Child job descriptor; only the name is used for traversal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildJob {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}
