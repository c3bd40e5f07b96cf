//! Normalized metric events
//!
//! Every value the collector produces ends up as a [`MetricEvent`]: a
//! measurement name, string tags, typed fields and a timestamp. Sinks consume
//! events without knowing where they came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Aggregate executor counters for the whole server
pub const MEASUREMENT_OVERVIEW: &str = "jenkins";

/// One event per worker node
pub const MEASUREMENT_NODE: &str = "jenkins_node";

/// One event per finished, recent build
pub const MEASUREMENT_JOB: &str = "jenkins_job";

/// How a sink should interpret the fields of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    #[default]
    Untyped,
    Gauge,
    Counter,
    Histogram,
    Summary,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Untyped => write!(f, "untyped"),
            MetricKind::Gauge => write!(f, "gauge"),
            MetricKind::Counter => write!(f, "counter"),
            MetricKind::Histogram => write!(f, "histogram"),
            MetricKind::Summary => write!(f, "summary"),
        }
    }
}

/// A single field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

/// Normalized metric event
///
/// Built once with the chained setters and then handed to a sink by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEvent {
    pub measurement: String,
    pub kind: MetricKind,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
    pub timestamp: DateTime<Utc>,
}

impl MetricEvent {
    pub fn new(measurement: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            measurement: measurement.into(),
            kind: MetricKind::Untyped,
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp,
        }
    }

    pub fn with_kind(mut self, kind: MetricKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets a tag, replacing any previous value for the key
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Sets a field, replacing any previous value for the key
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get_tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn get_field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_keys_unique() {
        let event = MetricEvent::new(MEASUREMENT_NODE, Utc::now())
            .tag("status", "online")
            .tag("status", "offline")
            .field("num_executors", 2_i64)
            .field("num_executors", 4_i64);

        assert_eq!(event.tags.len(), 1);
        assert_eq!(event.get_tag("status"), Some("offline"));
        assert_eq!(event.get_field("num_executors"), Some(&FieldValue::Int(4)));
        assert_eq!(event.kind, MetricKind::Untyped);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(MetricKind::Gauge.to_string(), "gauge");
        assert_eq!(MetricKind::default().to_string(), "untyped");
    }
}
