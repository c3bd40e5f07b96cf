//! Job tree crawler
//!
//! Walks the job hierarchy of one collection cycle. Every job gets its own
//! task; a job first schedules its (newest) children, waits for all of them,
//! then decides whether its own last build is worth reporting:
//!
//! 1. depth limit reached: stop before fetching anything
//! 2. path rejected by the job filter: no build fetch
//! 3. no build yet, build still running, or build too old: no event
//! 4. otherwise one `jenkins_job` event stamped with the build start time
//!
//! A failed request only ends its own branch. The parent still evaluates and
//! siblings keep going.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use vigil_core::domain::{BuildDetail, JobPath, JobRequest, is_too_old};
use vigil_core::metric::{MEASUREMENT_JOB, MEASUREMENT_OVERVIEW};
use vigil_core::{Filter, MetricEvent, MetricKind};

use crate::config::{Config, ServerTags};
use crate::error::CollectError;
use crate::repository::JobSource;
use crate::service::accumulator::Accumulator;
use crate::service::limiter::Limiter;

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Traversal limits
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Depth at which a branch stops, 0 means unbounded
    pub max_depth: usize,
    /// Children descended into per job
    pub max_children_per_layer: usize,
    pub max_build_age: Duration,
}

impl CrawlSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_depth: config.max_subjob_depth,
            max_children_per_layer: config.max_subjob_per_layer,
            max_build_age: config.max_build_age,
        }
    }
}

/// Crawler state shared by every task of one cycle
pub struct JobCrawler {
    source: Arc<dyn JobSource>,
    limiter: Limiter,
    filter: Arc<Filter>,
    settings: CrawlSettings,
    tags: ServerTags,
    acc: Arc<Accumulator>,
}

impl JobCrawler {
    pub fn new(
        source: Arc<dyn JobSource>,
        limiter: Limiter,
        filter: Arc<Filter>,
        settings: CrawlSettings,
        tags: ServerTags,
        acc: Arc<Accumulator>,
    ) -> Self {
        Self {
            source,
            limiter,
            filter,
            settings,
            tags,
            acc,
        }
    }

    /// Emits the executor overview event
    pub async fn gather_overview(&self) {
        match self.limiter.run(self.source.get_overview()).await {
            Ok(overview) => {
                let event = MetricEvent::new(MEASUREMENT_OVERVIEW, Utc::now())
                    .with_kind(MetricKind::Gauge)
                    .tag("source", &self.tags.source)
                    .tag("port", &self.tags.port)
                    .field("busy_executors", overview.busy_executors)
                    .field("total_executors", overview.total_executors);
                self.acc.emit(event);
            }
            Err(e) => self.acc.add_error(CollectError::fetch("executor overview", e)),
        }
    }

    /// Crawls every top-level job and waits for the whole tree
    pub async fn crawl_all(self: Arc<Self>) {
        let top = match self.limiter.run(self.source.list_top_level_jobs()).await {
            Ok(listing) => listing,
            Err(e) => {
                self.acc.add_error(CollectError::fetch("top-level jobs", e));
                return;
            }
        };

        debug!("Crawling {} top-level job(s)", top.jobs.len());

        let mut tasks = JoinSet::new();
        for job in &top.jobs {
            tasks.spawn(Arc::clone(&self).crawl(JobRequest::root(job.name.as_str())));
        }
        self.join_all(tasks).await;
    }

    fn crawl(self: Arc<Self>, request: JobRequest) -> BoxFuture {
        Box::pin(async move {
            if let Err(e) = self.crawl_job(&request).await {
                self.acc.add_error(e);
            }
        })
    }

    async fn crawl_job(self: &Arc<Self>, request: &JobRequest) -> Result<(), CollectError> {
        let path = request.path();

        if self.settings.max_depth > 0 && request.depth() == self.settings.max_depth {
            debug!(job = %path, "Depth limit reached");
            return Ok(());
        }

        let listing = self
            .limiter
            .run(self.source.list_children(path))
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    warn!(job = %path, "Job disappeared while crawling");
                }
                CollectError::fetch(path.to_string(), e)
            })?;

        let mut children = JoinSet::new();
        for child in listing.newest_children(self.settings.max_children_per_layer) {
            children.spawn(Arc::clone(self).crawl(request.child(child.name.as_str())));
        }
        self.join_all(children).await;

        if !self.filter.matches(&path.hierarchy_name()) {
            debug!(job = %path, "Job filtered out");
            return Ok(());
        }

        let Some(number) = listing.last_build_number() else {
            return Ok(());
        };

        let build = self
            .limiter
            .run(self.source.get_build(path, number))
            .await
            .map_err(|e| CollectError::fetch(format!("{path} build {number}"), e))?;

        if build.building {
            debug!(job = %path, build = number, "Ignoring running build");
            return Ok(());
        }

        let started_at = build.started_at().ok_or_else(|| {
            CollectError::data(
                format!("{path} build {number}"),
                format!("timestamp {} out of range", build.timestamp),
            )
        })?;

        if is_too_old(started_at, Utc::now(), self.settings.max_build_age) {
            debug!(job = %path, build = number, "Ignoring old build");
            return Ok(());
        }

        self.acc
            .emit(job_build_event(path, &build, started_at, &self.tags));
        Ok(())
    }

    /// Waits for every task; a task that died takes its subtree with it
    async fn join_all(&self, mut tasks: JoinSet<()>) {
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                self.acc.add_error(CollectError::Task(e.to_string()));
            }
        }
    }
}

fn job_build_event(
    path: &JobPath,
    build: &BuildDetail,
    started_at: DateTime<Utc>,
    tags: &ServerTags,
) -> MetricEvent {
    MetricEvent::new(MEASUREMENT_JOB, started_at)
        .tag("name", path.name())
        .tag("parents", path.parents_name())
        .tag("result", build.result())
        .tag("source", &tags.source)
        .tag("port", &tags.port)
        .field("duration", build.duration)
        .field("result_code", build.result_code())
        .field("number", build.number)
}
