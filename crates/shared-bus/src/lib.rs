//! # Shared Bus - Event Coordination for Gearlock Game Systems
//!
//! Every Gearlock subsystem (physics stepping, shape lifecycle, screw
//! collection, progress tracking, rendering, persistence, the editor)
//! reacts to the others without holding a reference to any of them. This
//! crate is the single point of coupling: a publish/subscribe bus with
//! priority-ordered dispatch, feedback-loop protection, deferred delivery,
//! and the lifecycle wrapper systems use to register and retire their
//! subscriptions safely.
//!
//! ## Coordination Rules
//!
//! - All inter-system communication goes through the bus ONLY
//! - **Direct calls between game systems are FORBIDDEN**
//! - Systems access the bus through their [`SystemBase`] wrapper
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │   Physics    │                    │    Screw     │
//! │   System     │      emit()        │  Collection  │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Guarantees
//!
//! - **Ordering:** subscribers run in priority order, ties in arrival order
//! - **Isolation:** a faulting handler never stops its siblings
//! - **Reentrancy:** handlers may emit, subscribe, and unsubscribe freely;
//!   dispatch iterates a snapshot, never the live list
//! - **Loop protection:** repeated emissions of one `(event, source)` pair
//!   are capped inside a sliding window instead of cascading forever

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bus;
pub mod diagnostics;
pub mod events;
pub mod loop_guard;
pub mod registry;
pub mod stream;
pub mod system;

// Re-export main types
pub use bus::{BusConfig, BusError, EventBus};
pub use diagnostics::{BusStats, HistoryEntry};
pub use events::{EventEnvelope, EventPriority, EventType, GameEvent};
pub use loop_guard::{LoopDetector, LoopRefused};
pub use registry::{EventHandler, HandlerOutcome, HandlerResult, SubscribeOptions, SubscriptionId};
pub use stream::EventStream;
pub use system::{GameSystem, SystemBase, SystemEmitter, SystemInfo};

/// Deferred-queue events processed between cooperative yields.
pub const DRAIN_YIELD_INTERVAL: u32 = 10;

/// Default bound on the dispatch history ring buffer.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Loop-detection source used for events emitted without an origin.
pub const UNKNOWN_SOURCE: &str = "unknown";
