//! # Game Events
//!
//! Defines all event types that flow through the shared bus.
//! Grouped by the system that originates them.

use serde::{Deserialize, Serialize};
use shared_types::{ContainerId, LayerId, LevelId, LevelOutcome, ScrewColor, ScrewId, ShapeId};

/// All events that can be published to the event bus.
///
/// The set is closed: systems react to these variants and nothing else.
/// Adding a gameplay notification means adding a variant here and a
/// matching [`EventType`] discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    // =========================================================================
    // PHYSICS
    // =========================================================================
    /// The physics engine advanced one fixed step.
    PhysicsStepped {
        /// Monotonic step counter since level load.
        step: u64,
        /// Wall-clock cost of the step in milliseconds.
        elapsed_ms: f32,
    },

    /// Every body on the board went to sleep.
    PhysicsSettled {
        /// Number of bodies asleep when the board settled.
        sleeping_bodies: usize,
    },

    // =========================================================================
    // SHAPE / LAYER LIFECYCLE
    // =========================================================================
    /// A shape entered the board.
    ShapeSpawned { shape: ShapeId, layer: LayerId },

    /// A shape lost its last screw and fell off the board.
    ShapeDestroyed { shape: ShapeId, layer: LayerId },

    /// A covered layer became interactable.
    LayerUnlocked { layer: LayerId },

    /// The last shape of a layer was destroyed.
    LayerCleared { layer: LayerId },

    // =========================================================================
    // SCREW COLLECTION
    // =========================================================================
    /// The player unfastened a screw from a shape.
    ScrewUnfastened {
        screw: ScrewId,
        shape: ShapeId,
        color: ScrewColor,
    },

    /// An unfastened screw was routed to a container.
    ScrewCollected {
        screw: ScrewId,
        color: ScrewColor,
        container: ContainerId,
    },

    /// A collected screw finished its travel animation and occupied a slot.
    ScrewPlaced {
        screw: ScrewId,
        container: ContainerId,
        slot: u8,
    },

    /// A new container slid into the tray.
    ContainerSpawned {
        container: ContainerId,
        color: ScrewColor,
        capacity: u8,
    },

    /// A container received its last screw.
    ContainerFilled {
        container: ContainerId,
        color: ScrewColor,
    },

    // =========================================================================
    // PROGRESS
    // =========================================================================
    /// A level finished loading and the board is playable.
    LevelLoaded { level: LevelId },

    /// The level ended.
    LevelCompleted {
        level: LevelId,
        outcome: LevelOutcome,
    },

    /// The attempt ended early.
    LevelFailed { level: LevelId, reason: String },

    // =========================================================================
    // PERSISTENCE
    // =========================================================================
    /// Something asked for the current progress to be written out.
    SaveRequested { level: LevelId },

    /// The save system finished writing.
    SaveCompleted { level: LevelId, bytes: usize },

    // =========================================================================
    // RENDERING
    // =========================================================================
    /// The renderer must redraw; `layer` limits the redraw when present.
    RenderInvalidated { layer: Option<LayerId> },

    // =========================================================================
    // EDITOR
    // =========================================================================
    /// The companion editor took or released control of the board.
    EditorModeChanged { active: bool },

    /// The editor exported a level definition.
    LevelExported { level: LevelId, path: String },

    // =========================================================================
    // RUNTIME
    // =========================================================================
    /// A game system finished initializing.
    SystemReady { system: String },

    /// An orderly shutdown was requested.
    ShutdownRequested { reason: String },
}

impl GameEvent {
    /// Get the discriminant used as the dispatch-table key.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        match self {
            Self::PhysicsStepped { .. } => EventType::PhysicsStepped,
            Self::PhysicsSettled { .. } => EventType::PhysicsSettled,
            Self::ShapeSpawned { .. } => EventType::ShapeSpawned,
            Self::ShapeDestroyed { .. } => EventType::ShapeDestroyed,
            Self::LayerUnlocked { .. } => EventType::LayerUnlocked,
            Self::LayerCleared { .. } => EventType::LayerCleared,
            Self::ScrewUnfastened { .. } => EventType::ScrewUnfastened,
            Self::ScrewCollected { .. } => EventType::ScrewCollected,
            Self::ScrewPlaced { .. } => EventType::ScrewPlaced,
            Self::ContainerSpawned { .. } => EventType::ContainerSpawned,
            Self::ContainerFilled { .. } => EventType::ContainerFilled,
            Self::LevelLoaded { .. } => EventType::LevelLoaded,
            Self::LevelCompleted { .. } => EventType::LevelCompleted,
            Self::LevelFailed { .. } => EventType::LevelFailed,
            Self::SaveRequested { .. } => EventType::SaveRequested,
            Self::SaveCompleted { .. } => EventType::SaveCompleted,
            Self::RenderInvalidated { .. } => EventType::RenderInvalidated,
            Self::EditorModeChanged { .. } => EventType::EditorModeChanged,
            Self::LevelExported { .. } => EventType::LevelExported,
            Self::SystemReady { .. } => EventType::SystemReady,
            Self::ShutdownRequested { .. } => EventType::ShutdownRequested,
        }
    }
}

/// Event discriminants, one per [`GameEvent`] variant.
///
/// Handler registration binds to one of these; the registry keys its
/// dispatch table on this enum rather than on a runtime string tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    PhysicsStepped,
    PhysicsSettled,
    ShapeSpawned,
    ShapeDestroyed,
    LayerUnlocked,
    LayerCleared,
    ScrewUnfastened,
    ScrewCollected,
    ScrewPlaced,
    ContainerSpawned,
    ContainerFilled,
    LevelLoaded,
    LevelCompleted,
    LevelFailed,
    SaveRequested,
    SaveCompleted,
    RenderInvalidated,
    EditorModeChanged,
    LevelExported,
    SystemReady,
    ShutdownRequested,
}

/// Subscription priority. Higher priorities are dispatched first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum EventPriority {
    /// Cosmetic reactions (effects, audio).
    Low,
    /// Everyday gameplay reactions.
    #[default]
    Normal,
    /// Reactions that later handlers depend on (state bookkeeping).
    High,
    /// Must-run-first reactions (shutdown, save).
    Critical,
}

/// An event plus the metadata the bus attaches to it.
///
/// Envelopes are value data. The bus fills a missing `timestamp_ms` when
/// it first touches the envelope and never mutates it otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// The event payload.
    pub event: GameEvent,
    /// Unix milliseconds; assigned by the bus if absent.
    pub timestamp_ms: Option<u64>,
    /// Name of the originating system, when known.
    pub source: Option<String>,
    /// Optional urgency hint carried for consumers; does not affect
    /// dispatch order (subscription priority does).
    pub priority: Option<EventPriority>,
}

impl EventEnvelope {
    /// Wrap an event with no metadata.
    #[must_use]
    pub fn new(event: GameEvent) -> Self {
        Self {
            event,
            timestamp_ms: None,
            source: None,
            priority: None,
        }
    }

    /// Set the originating system name.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the urgency hint.
    #[must_use]
    pub fn with_priority(mut self, priority: EventPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Discriminant of the wrapped event.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        self.event.event_type()
    }
}

impl From<GameEvent> for EventEnvelope {
    fn from(event: GameEvent) -> Self {
        Self::new(event)
    }
}
