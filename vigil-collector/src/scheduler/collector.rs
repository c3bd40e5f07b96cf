//! Collection cycles
//!
//! A [`Collector`] owns everything that is fixed across cycles: the config,
//! the compiled filters, the server tags and the job source. Each call to
//! [`Collector::gather`] builds fresh per-cycle state (limiter, accumulator)
//! and runs overview, nodes and jobs in that order.

use std::sync::Arc;
use tokio::time;
use tracing::{debug, error, info, warn};
use vigil_client::JenkinsClient;
use vigil_core::Filter;

use crate::config::{Config, ServerTags};
use crate::error::CollectError;
use crate::repository::{HttpJobSource, JobSource};
use crate::service::{Accumulator, CrawlSettings, JobCrawler, Limiter, NodePoller};
use crate::sink::MetricSink;

/// How a cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No errors
    Complete,
    /// Some events and some errors
    Partial,
    /// Errors and nothing emitted
    Failed,
}

/// Summary of one collection cycle
#[derive(Debug)]
pub struct GatherReport {
    /// Events delivered to the sink
    pub events: usize,
    /// Every non-fatal error raised during the cycle
    pub errors: Vec<CollectError>,
}

impl GatherReport {
    pub fn outcome(&self) -> CycleOutcome {
        match (self.events, self.errors.len()) {
            (_, 0) => CycleOutcome::Complete,
            (0, _) => CycleOutcome::Failed,
            _ => CycleOutcome::Partial,
        }
    }
}

pub struct Collector {
    config: Config,
    source: Arc<dyn JobSource>,
    job_filter: Arc<Filter>,
    node_filter: Arc<Filter>,
    tags: ServerTags,
}

impl Collector {
    /// Creates a collector that talks to the configured server over HTTP
    pub fn new(config: Config) -> Result<Self, CollectError> {
        let config = config.normalized();
        config.validate()?;

        let client = JenkinsClient::with_options(&config.url, config.client_options())
            .map_err(|e| CollectError::Config(e.to_string()))?;

        Self::with_source(config, Arc::new(HttpJobSource::new(client)))
    }

    /// Creates a collector over any job source
    ///
    /// Fails before any request is made if the config or a filter is invalid.
    pub fn with_source(config: Config, source: Arc<dyn JobSource>) -> Result<Self, CollectError> {
        let config = config.normalized();
        config.validate()?;

        Ok(Self {
            tags: config.server_tags()?,
            job_filter: Arc::new(config.job_filter()?),
            node_filter: Arc::new(config.node_filter()?),
            source,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs one collection cycle
    pub async fn gather(&self, sink: Arc<dyn MetricSink>) -> GatherReport {
        let acc = Arc::new(Accumulator::new(sink));
        let limiter = Limiter::new(self.config.max_connections);

        let crawler = Arc::new(JobCrawler::new(
            Arc::clone(&self.source),
            limiter.clone(),
            Arc::clone(&self.job_filter),
            CrawlSettings::from_config(&self.config),
            self.tags.clone(),
            Arc::clone(&acc),
        ));
        let nodes = NodePoller::new(
            Arc::clone(&self.source),
            limiter,
            Arc::clone(&self.node_filter),
            self.config.node_labels_as_tag,
            self.tags.clone(),
            Arc::clone(&acc),
        );

        crawler.gather_overview().await;
        nodes.gather().await;
        crawler.crawl_all().await;

        GatherReport {
            events: acc.emitted(),
            errors: acc.take_errors(),
        }
    }

    /// Collects every `interval` until the task is dropped
    pub async fn run(&self, sink: Arc<dyn MetricSink>) {
        info!(
            "Starting collection loop (interval: {:?})",
            self.config.interval
        );

        let mut interval = time::interval(self.config.interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            debug!("Collecting from {}", self.config.url);
            let report = self.gather(Arc::clone(&sink)).await;
            log_report(&report);
        }
    }
}

/// Logs the result of a cycle
pub fn log_report(report: &GatherReport) {
    match report.outcome() {
        CycleOutcome::Complete => info!("Collected {} metric(s)", report.events),
        CycleOutcome::Partial => warn!(
            "Collected {} metric(s) with {} error(s)",
            report.events,
            report.errors.len()
        ),
        CycleOutcome::Failed => error!(
            "Collection failed with {} error(s)",
            report.errors.len()
        ),
    }
}
