//! Worker node records from `computer/api/json`

use serde::{Deserialize, Serialize};

/// Decoded `computer/api/json` response: executor totals plus every node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputerSet {
    #[serde(default, rename = "computer")]
    pub computers: Vec<NodeRecord>,
    #[serde(default)]
    pub busy_executors: i64,
    #[serde(default)]
    pub total_executors: i64,
}

impl ComputerSet {
    pub fn overview(&self) -> Overview {
        Overview {
            busy_executors: self.busy_executors,
            total_executors: self.total_executors,
        }
    }
}

/// Aggregate executor utilization for the whole server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Overview {
    pub busy_executors: i64,
    pub total_executors: i64,
}

/// Snapshot of one worker node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub offline: bool,
    #[serde(default)]
    pub num_executors: i64,
    #[serde(default)]
    pub monitor_data: MonitorData,
    #[serde(default)]
    pub assigned_labels: Vec<Label>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Optional node monitors. A missing monitor means "unknown", not zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorData {
    #[serde(default, rename = "hudson.node_monitors.ArchitectureMonitor")]
    pub architecture: Option<String>,
    #[serde(default, rename = "hudson.node_monitors.DiskSpaceMonitor")]
    pub disk_space: Option<SpaceMonitor>,
    #[serde(default, rename = "hudson.node_monitors.ResponseTimeMonitor")]
    pub response_time: Option<ResponseTimeMonitor>,
    #[serde(default, rename = "hudson.node_monitors.SwapSpaceMonitor")]
    pub swap_space: Option<SwapSpaceMonitor>,
    #[serde(default, rename = "hudson.node_monitors.TemporarySpaceMonitor")]
    pub temporary_space: Option<SpaceMonitor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceMonitor {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub size: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseTimeMonitor {
    #[serde(default)]
    pub average: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapSpaceMonitor {
    #[serde(default, rename = "availableSwapSpace")]
    pub swap_available: f64,
    #[serde(default, rename = "totalSwapSpace")]
    pub swap_total: f64,
    #[serde(default, rename = "availablePhysicalMemory")]
    pub memory_available: f64,
    #[serde(default, rename = "totalPhysicalMemory")]
    pub memory_total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_computer_set() {
        let set: ComputerSet = serde_json::from_str(
            r#"{
                "busyExecutors": 4,
                "totalExecutors": 8,
                "computer": [{
                    "displayName": "master",
                    "offline": false,
                    "numExecutors": 2,
                    "assignedLabels": [{"name": "linux"}],
                    "monitorData": {
                        "hudson.node_monitors.ArchitectureMonitor": "linux (amd64)",
                        "hudson.node_monitors.ResponseTimeMonitor": {"average": 12},
                        "hudson.node_monitors.DiskSpaceMonitor": {"path": "/var/lib", "size": 1024.5},
                        "hudson.node_monitors.SwapSpaceMonitor": {
                            "availableSwapSpace": 1.0,
                            "totalSwapSpace": 2.0,
                            "availablePhysicalMemory": 3.0,
                            "totalPhysicalMemory": 4.0
                        },
                        "hudson.node_monitors.TemporarySpaceMonitor": null
                    }
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(
            set.overview(),
            Overview {
                busy_executors: 4,
                total_executors: 8
            }
        );
        let node = &set.computers[0];
        assert_eq!(node.display_name, "master");
        assert_eq!(node.monitor_data.architecture.as_deref(), Some("linux (amd64)"));
        assert_eq!(node.monitor_data.response_time.as_ref().map(|r| r.average), Some(12));
        assert!(node.monitor_data.temporary_space.is_none());
        let swap = node.monitor_data.swap_space.as_ref().unwrap();
        assert_eq!(swap.memory_total, 4.0);
    }

    #[test]
    fn test_decode_node_without_monitors() {
        let node: NodeRecord = serde_json::from_str(r#"{"displayName":"agent-1"}"#).unwrap();
        assert!(node.monitor_data.disk_space.is_none());
        assert!(node.assigned_labels.is_empty());
        assert_eq!(node.num_executors, 0);
    }
}
