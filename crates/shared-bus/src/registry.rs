//! # Subscription Registry
//!
//! Maps each event type to its ordered list of subscriptions. Insertion
//! keeps every list sorted by priority, with ties preserving arrival
//! order, so dispatch can iterate a snapshot front to back.

use crate::events::{EventEnvelope, EventPriority, EventType};
use shared_types::HandlerError;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

/// Identifier of one subscription.
///
/// Ids are v4 UUIDs: unique for the process lifetime and never reused,
/// even across [`clear`](crate::EventBus::clear).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Continuation work a handler may hand back to the bus.
pub type PendingWork = Pin<Box<dyn Future<Output = Result<(), HandlerError>> + Send>>;

/// What a handler did with the event.
pub enum HandlerOutcome {
    /// The handler finished synchronously.
    Completed,
    /// The handler produced follow-up work. The bus spawns it on a
    /// supervised task, logs and counts an eventual failure, and never
    /// awaits it: completion order among concurrent continuations is
    /// unspecified.
    Pending(PendingWork),
}

impl HandlerOutcome {
    /// Box a continuation future into a [`HandlerOutcome::Pending`].
    pub fn pending<F>(work: F) -> Self
    where
        F: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Self::Pending(Box::pin(work))
    }
}

impl fmt::Debug for HandlerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "Completed"),
            Self::Pending(_) => write!(f, "Pending(..)"),
        }
    }
}

/// Result of one handler invocation.
pub type HandlerResult = Result<HandlerOutcome, HandlerError>;

/// A registered event handler.
pub type EventHandler = Arc<dyn Fn(&EventEnvelope) -> HandlerResult + Send + Sync>;

/// Options accepted by `subscribe`.
#[derive(Debug, Clone, Default)]
pub struct SubscribeOptions {
    /// Dispatch priority within the event type's list.
    pub priority: EventPriority,
    /// Remove the subscription after its first invocation.
    pub once: bool,
    /// Owner name, used for batch removal and as the loop-detection origin.
    pub source: Option<String>,
}

impl SubscribeOptions {
    /// Set the dispatch priority.
    #[must_use]
    pub fn with_priority(mut self, priority: EventPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Mark the subscription one-shot.
    #[must_use]
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    /// Set the owner name.
    #[must_use]
    pub fn from_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// One registry entry.
#[derive(Clone)]
pub(crate) struct Subscription {
    pub id: SubscriptionId,
    pub handler: EventHandler,
    pub priority: EventPriority,
    pub once: bool,
    pub source: Option<String>,
}

/// Event type -> ordered subscription list.
#[derive(Default)]
pub(crate) struct SubscriptionRegistry {
    by_type: HashMap<EventType, Vec<Subscription>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert in priority order: before the first entry of strictly lower
    /// priority, after every entry of equal or higher priority.
    pub fn insert(&mut self, event_type: EventType, subscription: Subscription) {
        let list = self.by_type.entry(event_type).or_default();
        let position = list
            .iter()
            .position(|existing| existing.priority < subscription.priority)
            .unwrap_or(list.len());
        list.insert(position, subscription);
    }

    /// Remove by id from whichever list holds it. Returns whether a
    /// subscription was removed; an emptied list entry is dropped.
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let mut removed = false;
        let mut emptied = None;
        for (event_type, list) in &mut self.by_type {
            if let Some(position) = list.iter().position(|sub| sub.id == id) {
                list.remove(position);
                removed = true;
                if list.is_empty() {
                    emptied = Some(*event_type);
                }
                break;
            }
        }
        if let Some(event_type) = emptied {
            self.by_type.remove(&event_type);
        }
        removed
    }

    /// Remove every subscription whose source equals `name`.
    pub fn remove_source(&mut self, name: &str) -> usize {
        let mut removed = 0;
        self.by_type.retain(|_, list| {
            let before = list.len();
            list.retain(|sub| sub.source.as_deref() != Some(name));
            removed += before - list.len();
            !list.is_empty()
        });
        removed
    }

    /// Copy the current list for one event type. Dispatch iterates this
    /// snapshot so handlers can mutate the registry mid-pass.
    pub fn snapshot(&self, event_type: EventType) -> Vec<Subscription> {
        self.by_type.get(&event_type).cloned().unwrap_or_default()
    }

    /// Total live subscriptions across all event types.
    pub fn len(&self) -> usize {
        self.by_type.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.by_type.clear();
    }
}
