//! Node poller
//!
//! Single request, no recursion: fetch every node, drop the ones the node
//! filter rejects, and emit one `jenkins_node` event for each of the rest.
//! Monitors the server did not report are left out of the event entirely.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;
use vigil_core::domain::NodeRecord;
use vigil_core::metric::MEASUREMENT_NODE;
use vigil_core::{Filter, MetricEvent, MetricKind};

use crate::config::ServerTags;
use crate::error::CollectError;
use crate::repository::JobSource;
use crate::service::accumulator::Accumulator;
use crate::service::limiter::Limiter;

pub struct NodePoller {
    source: Arc<dyn JobSource>,
    limiter: Limiter,
    filter: Arc<Filter>,
    labels_as_tag: bool,
    tags: ServerTags,
    acc: Arc<Accumulator>,
}

impl NodePoller {
    pub fn new(
        source: Arc<dyn JobSource>,
        limiter: Limiter,
        filter: Arc<Filter>,
        labels_as_tag: bool,
        tags: ServerTags,
        acc: Arc<Accumulator>,
    ) -> Self {
        Self {
            source,
            limiter,
            filter,
            labels_as_tag,
            tags,
            acc,
        }
    }

    /// Fetches the node list
    pub async fn poll(&self) -> Result<Vec<NodeRecord>, CollectError> {
        self.limiter
            .run(self.source.list_nodes())
            .await
            .map_err(|e| CollectError::fetch("nodes", e))
    }

    /// Polls and emits one event per matching node
    pub async fn gather(&self) {
        let nodes = match self.poll().await {
            Ok(nodes) => nodes,
            Err(e) => {
                self.acc.add_error(e);
                return;
            }
        };

        let now = Utc::now();
        for node in &nodes {
            match self.node_event(node, now) {
                Ok(Some(event)) => self.acc.emit(event),
                Ok(None) => debug!(node = %node.display_name, "Node filtered out"),
                Err(e) => self.acc.add_error(e),
            }
        }
    }

    /// Builds the event for one node, `None` if the filter rejects it
    fn node_event(
        &self,
        node: &NodeRecord,
        now: DateTime<Utc>,
    ) -> Result<Option<MetricEvent>, CollectError> {
        if node.display_name.is_empty() {
            return Err(CollectError::data("node", "empty node name"));
        }

        if !self.filter.matches(&node.display_name) {
            return Ok(None);
        }

        let monitors = &node.monitor_data;
        let status = if node.offline { "offline" } else { "online" };

        let mut event = MetricEvent::new(MEASUREMENT_NODE, now)
            .with_kind(MetricKind::Gauge)
            .tag("node_name", &node.display_name)
            .tag("status", status)
            .tag("source", &self.tags.source)
            .tag("port", &self.tags.port)
            .field("num_executors", node.num_executors);

        if let Some(arch) = monitors.architecture.as_deref().filter(|a| !a.is_empty()) {
            event = event.tag("arch", arch);
        }

        if self.labels_as_tag {
            event = event.tag("labels", labels_tag(node));
        }

        if let Some(rt) = &monitors.response_time {
            event = event.field("response_time", rt.average);
        }
        if let Some(disk) = &monitors.disk_space {
            event = event
                .tag("disk_path", &disk.path)
                .field("disk_available", disk.size);
        }
        if let Some(temp) = &monitors.temporary_space {
            event = event
                .tag("temp_path", &temp.path)
                .field("temp_available", temp.size);
        }
        if let Some(swap) = &monitors.swap_space {
            event = event
                .field("swap_available", swap.swap_available)
                .field("memory_available", swap.memory_available)
                .field("swap_total", swap.swap_total)
                .field("memory_total", swap.memory_total);
        }

        Ok(Some(event))
    }
}

/// Sorted, comma-joined label names; `none` when the node has no labels
fn labels_tag(node: &NodeRecord) -> String {
    let mut labels: Vec<String> = node
        .assigned_labels
        .iter()
        .map(|l| l.name.replace(',', "_"))
        .collect();

    if labels.is_empty() {
        return "none".to_string();
    }

    labels.sort();
    labels.join(",")
}
