//! In-memory job source for tests

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use vigil_client::{ClientError, Result};
use vigil_core::domain::{
    BuildDetail, ChildJob, JobListing, JobPath, LastBuild, NodeRecord, Overview,
};

use crate::repository::JobSource;

/// Fake CI server keyed by hierarchical job name.
///
/// Unknown paths answer 404. Every call is recorded as `top`, `list:<path>`,
/// `build:<path>#<n>`, `overview` or `nodes`.
#[derive(Default)]
pub struct FakeSource {
    top_level: Vec<String>,
    listings: HashMap<String, JobListing>,
    builds: HashMap<(String, i64), BuildDetail>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    overview: Overview,
    nodes: Vec<NodeRecord>,
    delay: Option<Duration>,
    unreachable: bool,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A server that answers every request with a 503
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn top_level(mut self, names: &[&str]) -> Self {
        self.top_level = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Registers a job listing at `path` (`a/b/c`)
    pub fn job(mut self, path: &str, last_build: Option<i64>, children: &[&str]) -> Self {
        let listing = JobListing {
            name: path.rsplit('/').next().map(str::to_string),
            last_build: last_build.map(|number| LastBuild { number, url: None }),
            jobs: children
                .iter()
                .map(|name| ChildJob {
                    name: name.to_string(),
                    url: None,
                    color: None,
                })
                .collect(),
        };
        self.listings.insert(path.to_string(), listing);
        self
    }

    pub fn build(mut self, path: &str, build: BuildDetail) -> Self {
        self.builds.insert((path.to_string(), build.number), build);
        self
    }

    /// Makes the listing at `path` fail with a 500
    pub fn failing(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    /// Makes the listing at `path` panic inside the calling task
    pub fn panicking(mut self, path: &str) -> Self {
        self.panicking.insert(path.to_string());
        self
    }

    pub fn overview(mut self, busy: i64, total: i64) -> Self {
        self.overview = Overview {
            busy_executors: busy,
            total_executors: total,
        };
        self
    }

    pub fn nodes(mut self, nodes: Vec<NodeRecord>) -> Self {
        self.nodes = nodes;
        self
    }

    /// Holds every call open for `delay` to expose concurrency
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, call: &str) -> bool {
        self.calls().iter().any(|c| c == call)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn record<T>(&self, call: String, result: Result<T>) -> Result<T> {
        self.calls.lock().unwrap().push(call);
        let result = if self.unreachable {
            Err(ClientError::api_error(503, "service unavailable"))
        } else {
            result
        };
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl JobSource for FakeSource {
    async fn list_top_level_jobs(&self) -> Result<JobListing> {
        let listing = JobListing {
            jobs: self
                .top_level
                .iter()
                .map(|name| ChildJob {
                    name: name.clone(),
                    url: None,
                    color: None,
                })
                .collect(),
            ..Default::default()
        };
        self.record("top".to_string(), Ok(listing)).await
    }

    async fn list_children(&self, path: &JobPath) -> Result<JobListing> {
        let key = path.hierarchy_name();
        if self.panicking.contains(&key) {
            panic!("listing {key} blew up");
        }
        let result = if self.failing.contains(&key) {
            Err(ClientError::api_error(500, "internal error"))
        } else {
            self.listings
                .get(&key)
                .cloned()
                .ok_or_else(|| ClientError::api_error(404, "not found"))
        };
        self.record(format!("list:{key}"), result).await
    }

    async fn get_build(&self, path: &JobPath, number: i64) -> Result<BuildDetail> {
        let key = path.hierarchy_name();
        let result = self
            .builds
            .get(&(key.clone(), number))
            .cloned()
            .ok_or_else(|| ClientError::api_error(404, "not found"));
        self.record(format!("build:{key}#{number}"), result).await
    }

    async fn get_overview(&self) -> Result<Overview> {
        self.record("overview".to_string(), Ok(self.overview)).await
    }

    async fn list_nodes(&self) -> Result<Vec<NodeRecord>> {
        self.record("nodes".to_string(), Ok(self.nodes.clone())).await
    }
}

/// A finished build that started `minutes_ago` minutes before now
pub fn finished_build(number: i64, result: &str, minutes_ago: i64) -> BuildDetail {
    BuildDetail {
        building: false,
        duration: 25558,
        number,
        result: Some(result.to_string()),
        timestamp: Utc::now().timestamp_millis() - minutes_ago * 60_000,
    }
}

pub fn node(name: &str) -> NodeRecord {
    NodeRecord {
        display_name: name.to_string(),
        num_executors: 2,
        ..Default::default()
    }
}
