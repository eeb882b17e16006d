//! # System Lifecycle Layer
//!
//! The contract every game system implements to participate in the
//! event-driven architecture, plus the base state each instance embeds.
//!
//! ## Lifecycle
//!
//! ```text
//! uninitialized ──initialize()──► initialized ──destroy()──► destroyed
//!                                                            (terminal)
//! ```
//!
//! - `initialize` and `destroy` are idempotent: repeat calls warn and do
//!   nothing.
//! - A destroyed system refuses new subscriptions; that is a programming
//!   error in teardown ordering, not a runtime condition.
//! - `destroy` releases every subscription the instance created before it
//!   returns, so no handler of a dead system can ever fire again.

use crate::bus::EventBus;
use crate::events::{EventEnvelope, EventType};
use crate::registry::{HandlerResult, SubscribeOptions, SubscriptionId};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use shared_types::SystemError;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Snapshot of one system's lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemInfo {
    /// The system's name, stamped as event origin.
    pub name: String,
    /// Whether the setup hook has completed.
    pub initialized: bool,
    /// Whether the system has been torn down.
    pub destroyed: bool,
    /// Subscriptions the instance currently tracks.
    pub subscription_count: usize,
}

/// Per-instance state embedded by every game system.
///
/// The base is the only bus access path a system has: it stamps the
/// system's name on everything it subscribes or emits, records created
/// subscription ids for bulk release, and enforces the destroyed-instance
/// contract.
pub struct SystemBase {
    name: String,
    bus: EventBus,
    owned: Mutex<Vec<SubscriptionId>>,
    initialized: AtomicBool,
    destroyed: AtomicBool,
}

impl SystemBase {
    /// Create base state for a named system on the injected bus.
    #[must_use]
    pub fn new(name: impl Into<String>, bus: EventBus) -> Self {
        Self {
            name: name.into(),
            bus,
            owned: Mutex::new(Vec::new()),
            initialized: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
        }
    }

    /// The system's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the system is between `initialize` and `destroy`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.initialized.load(Ordering::Acquire) && !self.destroyed.load(Ordering::Acquire)
    }

    /// Subscribe on behalf of this system.
    ///
    /// The system's name is filled in as `source` unless the caller set
    /// one, and the returned id is tracked for release on `destroy`.
    ///
    /// # Errors
    ///
    /// [`SystemError::Destroyed`] when called after `destroy`.
    pub fn subscribe<F>(
        &self,
        event_type: EventType,
        handler: F,
        options: SubscribeOptions,
    ) -> Result<SubscriptionId, SystemError>
    where
        F: Fn(&EventEnvelope) -> HandlerResult + Send + Sync + 'static,
    {
        if self.destroyed.load(Ordering::Acquire) {
            return Err(SystemError::destroyed(&self.name, "subscribe"));
        }

        let mut options = options;
        if options.source.is_none() {
            options.source = Some(self.name.clone());
        }

        let id = self.bus.subscribe(event_type, handler, options);
        self.owned.lock().push(id);
        Ok(id)
    }

    /// Release one subscription created through this base.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.owned.lock().retain(|owned| *owned != id);
        self.bus.unsubscribe(id)
    }

    /// Emit with this system stamped as origin (unless already set).
    pub fn emit(&self, envelope: impl Into<EventEnvelope>) -> usize {
        self.bus.emit(self.stamped(envelope.into()))
    }

    /// Deferred emit with this system stamped as origin.
    pub fn emit_async(&self, envelope: impl Into<EventEnvelope>) {
        self.bus.emit_async(self.stamped(envelope.into()));
    }

    /// Run `operation` only while the system is active.
    ///
    /// The standard guard for every system method reachable from event
    /// handlers: an event arriving before setup or after teardown is
    /// logged and ignored instead of acting on dead state.
    pub fn execute_if_active<T>(&self, operation: &str, run: impl FnOnce() -> T) -> Option<T> {
        if !self.is_active() {
            warn!(
                system = %self.name,
                operation,
                "Call ignored while system is inactive"
            );
            return None;
        }
        Some(run())
    }

    /// Lifecycle snapshot.
    #[must_use]
    pub fn info(&self) -> SystemInfo {
        SystemInfo {
            name: self.name.clone(),
            initialized: self.initialized.load(Ordering::Acquire),
            destroyed: self.destroyed.load(Ordering::Acquire),
            subscription_count: self.owned.lock().len(),
        }
    }

    /// A clonable emit handle stamped with this system's name.
    ///
    /// Event handlers cannot borrow the base they were created from, so
    /// setup hooks hand clones of this into their closures.
    #[must_use]
    pub fn emitter(&self) -> SystemEmitter {
        SystemEmitter {
            bus: self.bus.clone(),
            source: self.name.clone(),
        }
    }

    fn stamped(&self, mut envelope: EventEnvelope) -> EventEnvelope {
        if envelope.source.is_none() {
            envelope.source = Some(self.name.clone());
        }
        envelope
    }
}

/// Emit-only handle for one system, safe to move into handlers.
#[derive(Clone)]
pub struct SystemEmitter {
    bus: EventBus,
    source: String,
}

impl SystemEmitter {
    /// Emit with the owning system stamped as origin (unless set).
    pub fn emit(&self, envelope: impl Into<EventEnvelope>) -> usize {
        self.bus.emit(self.stamped(envelope.into()))
    }

    /// Deferred emit with the owning system stamped as origin.
    pub fn emit_async(&self, envelope: impl Into<EventEnvelope>) {
        self.bus.emit_async(self.stamped(envelope.into()));
    }

    fn stamped(&self, mut envelope: EventEnvelope) -> EventEnvelope {
        if envelope.source.is_none() {
            envelope.source = Some(self.source.clone());
        }
        envelope
    }
}

/// The contract every game system implements.
///
/// Implementors embed a [`SystemBase`] and expose it through `base`; the
/// provided lifecycle methods drive the state machine around the
/// system-specific hooks.
#[async_trait]
pub trait GameSystem: Send + Sync {
    /// The instance's embedded base state.
    fn base(&self) -> &SystemBase;

    /// System-specific setup: subscribe to events, load resources.
    async fn on_init(&self) -> Result<(), SystemError>;

    /// System-specific teardown: flush pending work, release resources.
    /// Subscriptions are released by `destroy` afterwards either way.
    async fn on_teardown(&self) -> Result<(), SystemError>;

    /// Run the setup hook and mark the system initialized.
    ///
    /// Idempotent: a second call warns and does nothing. A hook error
    /// propagates and leaves the system uninitialized, so a later retry
    /// is possible.
    async fn initialize(&self) -> Result<(), SystemError> {
        let base = self.base();
        if base.destroyed.load(Ordering::Acquire) {
            warn!(system = %base.name, "Initialize after destroy; ignoring");
            return Ok(());
        }
        if base.initialized.load(Ordering::Acquire) {
            warn!(system = %base.name, "System already initialized; ignoring");
            return Ok(());
        }

        self.on_init().await?;
        base.initialized.store(true, Ordering::Release);
        info!(system = %base.name, "System initialized");
        Ok(())
    }

    /// Run the teardown hook, release every tracked subscription, and
    /// mark the system destroyed (terminal).
    ///
    /// Idempotent: a second call warns and does nothing. Subscription
    /// cleanup runs even when the hook fails; the hook's error is
    /// returned afterwards.
    async fn destroy(&self) -> Result<(), SystemError> {
        let base = self.base();
        if base.destroyed.load(Ordering::Acquire) {
            warn!(system = %base.name, "System already destroyed; ignoring");
            return Ok(());
        }

        let teardown = self.on_teardown().await;

        let owned: Vec<SubscriptionId> = base.owned.lock().drain(..).collect();
        for id in &owned {
            base.bus.unsubscribe(*id);
        }
        // Safety net on top of id tracking: anything else registered
        // under this system's name goes too.
        let swept = base.bus.unsubscribe_source(&base.name);
        if swept > 0 {
            debug!(system = %base.name, swept, "Stray subscriptions removed by source");
        }

        base.destroyed.store(true, Ordering::Release);
        info!(system = %base.name, released = owned.len(), "System destroyed");
        teardown
    }

    /// Lifecycle snapshot for monitoring.
    fn system_info(&self) -> SystemInfo {
        self.base().info()
    }
}
