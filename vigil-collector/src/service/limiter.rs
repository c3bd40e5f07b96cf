//! Concurrency limiter
//!
//! One counting gate shared by every request of a collection cycle. Tasks may
//! be spawned freely; only the number of requests actually on the wire is
//! bounded.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::DEFAULT_MAX_CONNECTIONS;

#[derive(Debug, Clone)]
pub struct Limiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// A held slot; the slot frees when the permit is released or dropped
#[derive(Debug)]
pub struct Permit {
    _permit: Option<OwnedSemaphorePermit>,
}

impl Limiter {
    /// Creates a limiter with `capacity` slots (0 means the default of 5)
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_MAX_CONNECTIONS
        } else {
            capacity
        };
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits until a slot is free and takes it
    pub async fn acquire(&self) -> Permit {
        // The semaphore is never closed, so acquisition only ever waits.
        let permit = Arc::clone(&self.semaphore).acquire_owned().await.ok();
        Permit { _permit: permit }
    }

    pub fn release(&self, permit: Permit) {
        drop(permit);
    }

    /// Runs one request while holding a slot
    pub async fn run<F: Future>(&self, request: F) -> F::Output {
        let permit = self.acquire().await;
        let output = request.await;
        self.release(permit);
        output
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }
}
