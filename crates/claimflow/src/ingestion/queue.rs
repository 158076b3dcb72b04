//! Bounded drop-oldest queue of extraction requests.
//!
//! Producers never wait: when the queue is full the oldest pending request is
//! discarded to make room. A single consumer awaits [`ExtractionQueue::dequeue`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::Notify;

/// Default number of pending requests kept.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Request to fill in the extracted fields of one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtractionRequest {
    pub invoice_id: i32,
}

/// Point-in-time counters, exposed for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub pending: usize,
    pub capacity: usize,
    pub enqueued: u64,
    pub dropped: u64,
}

pub struct ExtractionQueue {
    pending: Mutex<VecDeque<ExtractionRequest>>,
    capacity: usize,
    notify: Notify,
    enqueued: AtomicU64,
    dropped: AtomicU64,
    closed: AtomicBool,
}

impl ExtractionQueue {
    /// Creates a queue holding at most `capacity` requests (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            pending: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
            capacity,
            notify: Notify::new(),
            enqueued: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ExtractionRequest>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a request, returning the request it displaced when full.
    ///
    /// Requests offered after [`close`](Self::close) are ignored.
    pub fn enqueue(&self, request: ExtractionRequest) -> Option<ExtractionRequest> {
        if self.is_closed() {
            log::debug!(
                "Extraction queue closed, ignoring invoice {}",
                request.invoice_id
            );
            return None;
        }

        let displaced = {
            let mut pending = self.lock();
            let displaced = if pending.len() >= self.capacity {
                pending.pop_front()
            } else {
                None
            };
            pending.push_back(request);
            displaced
        };

        self.enqueued.fetch_add(1, Ordering::Relaxed);
        if let Some(old) = displaced {
            let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            log::warn!(
                "Extraction queue full ({}), dropped request for invoice {} ({} dropped so far)",
                self.capacity,
                old.invoice_id,
                total
            );
        }

        self.notify.notify_one();
        displaced
    }

    pub fn try_dequeue(&self) -> Option<ExtractionRequest> {
        self.lock().pop_front()
    }

    /// Waits for the next request. Returns `None` once the queue is closed and
    /// drained.
    pub async fn dequeue(&self) -> Option<ExtractionRequest> {
        loop {
            let notified = self.notify.notified();
            if let Some(request) = self.try_dequeue() {
                return Some(request);
            }
            if self.is_closed() {
                return None;
            }
            notified.await;
        }
    }

    /// Stops accepting requests and wakes the consumer.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            pending: self.len(),
            capacity: self.capacity,
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped_count(),
        }
    }
}

impl Default for ExtractionQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
