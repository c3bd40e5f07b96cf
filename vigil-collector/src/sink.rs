//! Metric sinks
//!
//! A sink receives finished events from many tasks at once. Each `emit` is
//! atomic with respect to the others; arrival order is unspecified.

use std::io::Write;
use std::sync::{Mutex, PoisonError};
use tracing::warn;
use vigil_core::{FieldValue, MetricEvent};

pub trait MetricSink: Send + Sync {
    fn emit(&self, event: MetricEvent);
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<MetricEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far
    pub fn events(&self) -> Vec<MetricEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn measurement(&self, name: &str) -> Vec<MetricEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.measurement == name)
            .collect()
    }
}

impl MetricSink for MemorySink {
    fn emit(&self, event: MetricEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// Writes one influx line-protocol line per event
pub struct LineProtocolSink<W: Write + Send> {
    out: Mutex<W>,
}

impl LineProtocolSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> LineProtocolSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> MetricSink for LineProtocolSink<W> {
    fn emit(&self, event: MetricEvent) {
        let Some(line) = to_line_protocol(&event) else {
            warn!(measurement = %event.measurement, "Dropping event without fields");
            return;
        };

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            warn!("Failed to write metric: {}", e);
        }
    }
}

/// Renders an event as a line-protocol line.
///
/// Empty tag values and non-finite floats are left out. Returns `None` when
/// no field remains.
pub fn to_line_protocol(event: &MetricEvent) -> Option<String> {
    let mut line = escape(&event.measurement, &[',', ' ']);

    for (key, value) in &event.tags {
        if value.is_empty() {
            continue;
        }
        line.push(',');
        line.push_str(&escape(key, &[',', '=', ' ']));
        line.push('=');
        line.push_str(&escape(value, &[',', '=', ' ']));
    }

    let fields: Vec<String> = event
        .fields
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                FieldValue::Int(i) => format!("{i}i"),
                FieldValue::Float(f) if f.is_finite() => f.to_string(),
                FieldValue::Float(_) => return None,
                FieldValue::Str(s) => format!("\"{}\"", escape(s, &['"', '\\'])),
            };
            Some(format!("{}={}", escape(key, &[',', '=', ' ']), value))
        })
        .collect();

    if fields.is_empty() {
        return None;
    }

    line.push(' ');
    line.push_str(&fields.join(","));

    if let Some(nanos) = event.timestamp.timestamp_nanos_opt() {
        line.push(' ');
        line.push_str(&nanos.to_string());
    }

    Some(line)
}

fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
