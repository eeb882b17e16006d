//! # Event Streams
//!
//! Lets async consumers (UI panels, the editor's inspector) read one
//! event type as a stream instead of registering a callback.

use crate::bus::EventBus;
use crate::events::{EventEnvelope, EventType};
use crate::registry::{HandlerOutcome, SubscribeOptions, SubscriptionId};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tracing::debug;

/// A bounded stream of one event type.
///
/// Backed by an internal subscription that is removed when the stream is
/// dropped. Events past the buffer capacity are dropped for the slow
/// consumer only; the bus itself is unaffected.
pub struct EventStream {
    receiver: mpsc::Receiver<EventEnvelope>,
    bus: EventBus,
    id: SubscriptionId,
    event_type: EventType,
}

impl EventStream {
    pub(crate) fn attach(bus: &EventBus, event_type: EventType, capacity: usize) -> Self {
        let (tx, receiver) = mpsc::channel(capacity);

        let id = bus.subscribe(
            event_type,
            move |envelope| {
                match tx.try_send(envelope.clone()) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        debug!(event = ?envelope.event_type(), "Stream buffer full; event dropped");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        // Receiver already dropped; unsubscribe is racing us.
                    }
                }
                Ok(HandlerOutcome::Completed)
            },
            SubscribeOptions::default().from_source("bus-stream"),
        );

        Self {
            receiver,
            bus: bus.clone(),
            id,
            event_type,
        }
    }

    /// Receive the next event, or `None` once the stream is detached.
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        self.receiver.recv().await
    }

    /// Receive without waiting.
    pub fn try_recv(&mut self) -> Option<EventEnvelope> {
        self.receiver.try_recv().ok()
    }

    /// The event type this stream carries.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        self.event_type
    }
}

impl Stream for EventStream {
    type Item = EventEnvelope;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
        debug!(event = ?self.event_type, "Event stream detached");
    }
}
