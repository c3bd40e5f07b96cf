//! Per-cycle accumulator
//!
//! Forwards events to the sink and gathers the non-fatal errors raised by
//! concurrent branches. A fresh accumulator is created for every cycle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, warn};
use vigil_core::MetricEvent;

use crate::error::CollectError;
use crate::sink::MetricSink;

pub struct Accumulator {
    sink: Arc<dyn MetricSink>,
    emitted: AtomicUsize,
    errors: Mutex<Vec<CollectError>>,
}

impl Accumulator {
    pub fn new(sink: Arc<dyn MetricSink>) -> Self {
        Self {
            sink,
            emitted: AtomicUsize::new(0),
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn emit(&self, event: MetricEvent) {
        self.sink.emit(event);
        self.emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_error(&self, err: CollectError) {
        if err.is_fatal() {
            error!("{}", err);
        } else {
            warn!("{}", err);
        }
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(err);
    }

    pub fn emitted(&self) -> usize {
        self.emitted.load(Ordering::Relaxed)
    }

    /// Takes the errors collected so far
    pub fn take_errors(&self) -> Vec<CollectError> {
        std::mem::take(&mut *self.errors.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use chrono::Utc;

    #[test]
    fn test_counts_events_and_collects_errors() {
        let sink = Arc::new(MemorySink::new());
        let acc = Accumulator::new(sink.clone());

        acc.emit(MetricEvent::new("jenkins", Utc::now()).field("x", 1_i64));
        acc.add_error(CollectError::data("node", "empty name"));

        assert_eq!(acc.emitted(), 1);
        assert_eq!(sink.events().len(), 1);
        assert_eq!(acc.take_errors().len(), 1);
        assert!(acc.take_errors().is_empty());
    }
}
