//! # Event Bus
//!
//! The single coordination point for all game systems: synchronous
//! priority-ordered dispatch, a deferred queue drained cooperatively, and
//! `wait_for` for one-off reactions with a deadline.

use crate::diagnostics::{BusStats, DispatchStats, EventHistory, HistoryEntry};
use crate::events::{EventEnvelope, EventType};
use crate::loop_guard::LoopDetector;
use crate::registry::{
    EventHandler, HandlerOutcome, HandlerResult, PendingWork, SubscribeOptions, Subscription,
    SubscriptionId, SubscriptionRegistry,
};
use crate::stream::EventStream;
use crate::{DEFAULT_HISTORY_CAPACITY, DRAIN_YIELD_INTERVAL, UNKNOWN_SOURCE};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors surfaced to bus callers.
///
/// Handler faults never appear here; they are contained at the dispatch
/// boundary and only show up in [`BusStats::error_count`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BusError {
    /// `wait_for` hit its deadline before a matching event arrived.
    #[error("timed out waiting for {event_type:?}")]
    WaitTimeout { event_type: EventType },

    /// `wait_for` lost its subscription before a match, e.g. to `clear`.
    #[error("wait for {event_type:?} was cancelled")]
    WaitCancelled { event_type: EventType },
}

/// Tuning knobs for one bus instance.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Loop-detector ceiling per `(event type, source)` window.
    pub loop_ceiling: u32,
    /// Loop-detector sliding window.
    pub loop_window: Duration,
    /// Bound on the dispatch history ring.
    pub history_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            loop_ceiling: LoopDetector::DEFAULT_CEILING,
            loop_window: LoopDetector::DEFAULT_WINDOW,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

struct BusInner {
    registry: RwLock<SubscriptionRegistry>,
    loop_guard: Mutex<LoopDetector>,
    queue: Mutex<VecDeque<EventEnvelope>>,
    draining: AtomicBool,
    stats: Mutex<DispatchStats>,
    history: Mutex<EventHistory>,
}

/// Cloneable handle to one bus instance.
///
/// The game constructs exactly one bus and injects a clone into every
/// system at construction time; clones share all state. No lock is held
/// while a handler runs, so handlers may re-enter any bus operation.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Create a bus with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Create a bus with custom tuning.
    #[must_use]
    pub fn with_config(config: BusConfig) -> Self {
        Self {
            inner: Arc::new(BusInner {
                registry: RwLock::new(SubscriptionRegistry::new()),
                loop_guard: Mutex::new(LoopDetector::with_config(
                    config.loop_ceiling,
                    config.loop_window,
                )),
                queue: Mutex::new(VecDeque::new()),
                draining: AtomicBool::new(false),
                stats: Mutex::new(DispatchStats::default()),
                history: Mutex::new(EventHistory::with_capacity(config.history_capacity)),
            }),
        }
    }

    // =========================================================================
    // SUBSCRIPTIONS
    // =========================================================================

    /// Register a handler for one event type.
    ///
    /// Insertion keeps the type's list sorted by priority; equal
    /// priorities keep arrival order.
    pub fn subscribe<F>(
        &self,
        event_type: EventType,
        handler: F,
        options: SubscribeOptions,
    ) -> SubscriptionId
    where
        F: Fn(&EventEnvelope) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe_handler(event_type, Arc::new(handler), options)
    }

    fn subscribe_handler(
        &self,
        event_type: EventType,
        handler: EventHandler,
        options: SubscribeOptions,
    ) -> SubscriptionId {
        let id = SubscriptionId::generate();
        let subscription = Subscription {
            id,
            handler,
            priority: options.priority,
            once: options.once,
            source: options.source,
        };

        debug!(
            event = ?event_type,
            subscription = %id,
            priority = ?subscription.priority,
            once = subscription.once,
            source = subscription.source.as_deref(),
            "Subscription created"
        );

        self.inner.registry.write().insert(event_type, subscription);
        id
    }

    /// Remove one subscription. Returns whether it was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.inner.registry.write().remove(id);
        if removed {
            debug!(subscription = %id, "Subscription removed");
        }
        removed
    }

    /// Remove every subscription owned by `source`, across all event
    /// types. Returns the number removed.
    pub fn unsubscribe_source(&self, source: &str) -> usize {
        let removed = self.inner.registry.write().remove_source(source);
        if removed > 0 {
            debug!(source, removed, "Source subscriptions removed");
        }
        removed
    }

    /// Live subscriptions across all event types.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner.registry.read().len()
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Dispatch an event to its current subscribers, synchronously and in
    /// priority order, before returning.
    ///
    /// Returns the number of handlers invoked; 0 when the loop detector
    /// refused the emission. A missing timestamp is filled first. Handler
    /// faults are logged and counted without stopping siblings.
    pub fn emit(&self, envelope: impl Into<EventEnvelope>) -> usize {
        let mut envelope = envelope.into();
        if envelope.timestamp_ms.is_none() {
            envelope.timestamp_ms = Some(unix_millis());
        }
        self.dispatch(envelope)
    }

    /// Queue an event for deferred dispatch and return immediately.
    ///
    /// Deferred events are dispatched in FIFO order relative to each
    /// other; no order is guaranteed relative to `emit` calls made while
    /// the queue drains.
    pub fn emit_async(&self, envelope: impl Into<EventEnvelope>) {
        let mut envelope = envelope.into();
        if envelope.timestamp_ms.is_none() {
            envelope.timestamp_ms = Some(unix_millis());
        }

        self.inner.queue.lock().push_back(envelope);
        self.trigger_drain();
    }

    fn dispatch(&self, envelope: EventEnvelope) -> usize {
        let event_type = envelope.event_type();
        let loop_source = envelope.source.as_deref().unwrap_or(UNKNOWN_SOURCE);

        let admission = self.inner.loop_guard.lock().admit(event_type, loop_source);
        if let Err(refused) = admission {
            error!(
                event = ?event_type,
                source = loop_source,
                window_count = refused.count,
                "Feedback loop ceiling reached; event dropped"
            );
            self.inner.stats.lock().record_dropped();
            return 0;
        }

        let snapshot = self.inner.registry.read().snapshot(event_type);
        let started = Instant::now();
        let mut invoked = 0usize;

        for subscription in snapshot {
            if subscription.once {
                // Removing first keeps one-shot delivery exact even when
                // the handler re-enters emit for its own event type.
                self.inner.registry.write().remove(subscription.id);
            }

            invoked += 1;
            match (subscription.handler)(&envelope) {
                Ok(HandlerOutcome::Completed) => {}
                Ok(HandlerOutcome::Pending(work)) => self.supervise(event_type, work),
                Err(fault) => {
                    warn!(
                        event = ?event_type,
                        subscription = %subscription.id,
                        error = %fault,
                        "Handler fault; remaining handlers unaffected"
                    );
                    self.inner.stats.lock().record_error();
                }
            }
        }

        let duration = started.elapsed();
        self.inner.history.lock().push(HistoryEntry {
            envelope,
            handlers_invoked: invoked,
            duration,
        });
        self.inner.stats.lock().record_dispatch(invoked, duration);

        invoked
    }

    /// Spawn a handler continuation on its own task; an eventual failure
    /// is logged and counted, never surfaced to the emitter.
    fn supervise(&self, event_type: EventType, work: PendingWork) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(
                event = ?event_type,
                "No async runtime; handler continuation dropped"
            );
            return;
        };

        let bus = self.clone();
        handle.spawn(async move {
            if let Err(fault) = work.await {
                error!(event = ?event_type, error = %fault, "Async handler fault");
                bus.inner.stats.lock().record_error();
            }
        });
    }

    // =========================================================================
    // DEFERRED QUEUE
    // =========================================================================

    fn trigger_drain(&self) {
        // Single drainer: a trigger while one runs is a no-op; the
        // running loop re-checks the queue every iteration.
        if self
            .inner
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            self.inner.draining.store(false, Ordering::Release);
            warn!("No async runtime; deferred queue drains on the next trigger");
            return;
        };

        let bus = self.clone();
        handle.spawn(async move {
            bus.drain().await;
        });
    }

    async fn drain(&self) {
        let mut processed: u32 = 0;
        loop {
            let next = self.inner.queue.lock().pop_front();
            let Some(envelope) = next else { break };

            self.dispatch(envelope);
            processed += 1;
            if processed % DRAIN_YIELD_INTERVAL == 0 {
                tokio::task::yield_now().await;
            }
        }

        self.inner.draining.store(false, Ordering::Release);
        debug!(processed, "Deferred queue drained");

        // An append that raced the flag clear must not strand its event.
        if !self.inner.queue.lock().is_empty() {
            self.trigger_drain();
        }
    }

    /// Events currently waiting in the deferred queue.
    #[must_use]
    pub fn queue_size(&self) -> usize {
        self.inner.queue.lock().len()
    }

    // =========================================================================
    // WAITING
    // =========================================================================

    /// Resolve with the next event of `event_type`, or fail after
    /// `timeout`.
    pub async fn wait_for(
        &self,
        event_type: EventType,
        timeout: Duration,
    ) -> Result<EventEnvelope, BusError> {
        self.wait_for_matching(event_type, timeout, |_| true).await
    }

    /// Resolve with the next event of `event_type` passing `filter`, or
    /// fail after `timeout`. The temporary subscription is removed exactly
    /// once on both outcomes.
    pub async fn wait_for_matching<F>(
        &self,
        event_type: EventType,
        timeout: Duration,
        filter: F,
    ) -> Result<EventEnvelope, BusError>
    where
        F: Fn(&EventEnvelope) -> bool + Send + Sync + 'static,
    {
        let (tx, rx) = tokio::sync::oneshot::channel::<EventEnvelope>();
        let slot = Mutex::new(Some(tx));

        let id = self.subscribe(
            event_type,
            move |envelope| {
                if filter(envelope) {
                    if let Some(tx) = slot.lock().take() {
                        let _ = tx.send(envelope.clone());
                    }
                }
                Ok(HandlerOutcome::Completed)
            },
            SubscribeOptions::default().from_source("bus-waiter"),
        );

        let outcome = tokio::time::timeout(timeout, rx).await;

        // Sole cleanup point, shared by match, timeout, and cancellation.
        self.unsubscribe(id);

        match outcome {
            Ok(Ok(envelope)) => Ok(envelope),
            Ok(Err(_)) => Err(BusError::WaitCancelled { event_type }),
            Err(_) => Err(BusError::WaitTimeout { event_type }),
        }
    }

    // =========================================================================
    // STREAMS
    // =========================================================================

    /// Consume events of one type as an async stream.
    ///
    /// The stream buffers up to `capacity` events; a slower consumer
    /// loses the overflow (the bus stays best-effort). Dropping the
    /// stream removes its subscription.
    #[must_use]
    pub fn stream(&self, event_type: EventType, capacity: usize) -> EventStream {
        EventStream::attach(self, event_type, capacity)
    }

    // =========================================================================
    // DIAGNOSTICS
    // =========================================================================

    /// Point-in-time statistics.
    #[must_use]
    pub fn stats(&self) -> BusStats {
        let queue_size = self.queue_size();
        let subscription_count = self.subscription_count();
        self.inner.stats.lock().snapshot(queue_size, subscription_count)
    }

    /// Most recent `count` dispatches, oldest first.
    #[must_use]
    pub fn event_history(&self, count: usize) -> Vec<HistoryEntry> {
        self.inner.history.lock().recent(count)
    }

    /// Reset every piece of bus state: subscriptions, deferred queue,
    /// history, loop counts, and statistics. Only for full teardown or
    /// restart boundaries.
    pub fn clear(&self) {
        self.inner.registry.write().clear();
        self.inner.queue.lock().clear();
        self.inner.history.lock().clear();
        self.inner.loop_guard.lock().clear();
        self.inner.stats.lock().reset();
        info!("Event bus cleared");
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
