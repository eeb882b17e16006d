//! # Bus Diagnostics
//!
//! Running dispatch statistics plus a bounded history ring, kept for
//! debug overlays and the editor's event inspector.

use crate::events::EventEnvelope;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

/// Point-in-time statistics snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct BusStats {
    /// Events dispatched synchronously (deferred events count on dispatch).
    pub total_events: u64,
    /// Handler invocations across all dispatches.
    pub total_handlers: u64,
    /// `total_handlers / total_events`, 0 when nothing dispatched yet.
    pub average_handlers_per_event: f64,
    /// Mean synchronous dispatch cost in milliseconds.
    pub average_duration_per_event_ms: f64,
    /// Handler faults, synchronous and supervised-async combined.
    pub error_count: u64,
    /// Emissions refused by the loop detector.
    pub dropped_events: u64,
    /// Events waiting in the deferred queue.
    pub queue_size: usize,
    /// Live subscriptions across all event types.
    pub subscription_count: usize,
}

/// One completed synchronous dispatch.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// The envelope as dispatched (timestamp filled).
    pub envelope: EventEnvelope,
    /// Handlers invoked during the pass.
    pub handlers_invoked: usize,
    /// Wall-clock cost of the pass.
    pub duration: Duration,
}

/// Running accumulators behind the stats snapshot.
#[derive(Default)]
pub(crate) struct DispatchStats {
    total_events: u64,
    total_handlers: u64,
    total_duration: Duration,
    error_count: u64,
    dropped_events: u64,
}

impl DispatchStats {
    pub fn record_dispatch(&mut self, handlers: usize, duration: Duration) {
        self.total_events += 1;
        self.total_handlers += handlers as u64;
        self.total_duration += duration;
    }

    pub fn record_error(&mut self) {
        self.error_count += 1;
    }

    pub fn record_dropped(&mut self) {
        self.dropped_events += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self, queue_size: usize, subscription_count: usize) -> BusStats {
        let (average_handlers, average_duration_ms) = if self.total_events == 0 {
            (0.0, 0.0)
        } else {
            (
                self.total_handlers as f64 / self.total_events as f64,
                self.total_duration.as_secs_f64() * 1000.0 / self.total_events as f64,
            )
        };

        BusStats {
            total_events: self.total_events,
            total_handlers: self.total_handlers,
            average_handlers_per_event: average_handlers,
            average_duration_per_event_ms: average_duration_ms,
            error_count: self.error_count,
            dropped_events: self.dropped_events,
            queue_size,
            subscription_count,
        }
    }
}

/// Bounded FIFO of completed dispatches; oldest entries are evicted first.
pub(crate) struct EventHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl EventHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Most recent `count` entries, oldest first.
    pub fn recent(&self, count: usize) -> Vec<HistoryEntry> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
