//! # System Registry
//!
//! Runtime roster of game systems. Systems are enabled or disabled by
//! configuration, communicate ONLY through the event bus, and a missing
//! optional system never crashes the game.

use parking_lot::RwLock;
use shared_bus::{EventBus, GameEvent, GameSystem, SystemInfo};
use shared_types::SystemError;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Game system identifiers.
///
/// Declaration order is startup order: every system appears after its
/// dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemId {
    /// Fixed-step physics integration.
    Physics = 1,
    /// Pointer and gesture handling.
    Input = 2,
    /// Sound effect playback.
    Audio = 3,
    /// Shape and layer bookkeeping.
    ShapeLifecycle = 4,
    /// Screw unfastening and routing.
    ScrewCollection = 5,
    /// Container slots and fill state.
    ContainerTracking = 6,
    /// Level goals and scoring.
    Progress = 7,
    /// Save/load of progress.
    Persistence = 8,
    /// Canvas drawing.
    Rendering = 9,
    /// Particles and screen shake.
    Effects = 10,
    /// First-level guidance overlays.
    Tutorial = 11,
    /// Companion level editor tooling.
    EditorTools = 12,
}

impl SystemId {
    /// The system's name; also its event origin.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Physics => "physics",
            Self::Input => "input",
            Self::Audio => "audio",
            Self::ShapeLifecycle => "shape-lifecycle",
            Self::ScrewCollection => "screw-collection",
            Self::ContainerTracking => "container-tracking",
            Self::Progress => "progress",
            Self::Persistence => "persistence",
            Self::Rendering => "rendering",
            Self::Effects => "effects",
            Self::Tutorial => "tutorial",
            Self::EditorTools => "editor-tools",
        }
    }

    /// Systems that MUST be enabled for this one to work.
    #[must_use]
    pub fn dependencies(&self) -> Vec<SystemId> {
        match self {
            Self::Physics | Self::Input | Self::Audio => vec![],
            Self::ShapeLifecycle => vec![Self::Physics],
            Self::ScrewCollection => vec![Self::ShapeLifecycle],
            Self::ContainerTracking => vec![Self::ScrewCollection],
            Self::Progress => vec![Self::ScrewCollection],
            Self::Persistence => vec![Self::Progress],
            Self::Rendering => vec![Self::ShapeLifecycle],
            Self::Effects => vec![Self::Rendering],
            Self::Tutorial => vec![Self::Input, Self::Progress],
            Self::EditorTools => vec![Self::ShapeLifecycle],
        }
    }

    /// Whether the game cannot run without this system.
    #[must_use]
    pub fn is_core(&self) -> bool {
        matches!(
            self,
            Self::Physics | Self::ShapeLifecycle | Self::ScrewCollection | Self::Progress
        )
    }

    /// All system ids, in startup order.
    #[must_use]
    pub fn all() -> Vec<SystemId> {
        vec![
            Self::Physics,
            Self::Input,
            Self::Audio,
            Self::ShapeLifecycle,
            Self::ScrewCollection,
            Self::ContainerTracking,
            Self::Progress,
            Self::Persistence,
            Self::Rendering,
            Self::Effects,
            Self::Tutorial,
            Self::EditorTools,
        ]
    }
}

/// Runtime status of one system slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemStatus {
    /// Nothing registered for this id.
    NotRegistered,
    /// Registered, not yet initialized.
    Registered,
    /// Initialization in progress.
    Starting,
    /// Initialized and handling events.
    Running,
    /// Destroyed gracefully.
    Stopped,
    /// Initialization or teardown failed.
    Failed,
    /// Disabled by configuration.
    Disabled,
}

/// Configuration for which systems are enabled.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    /// Map of system id to enabled status.
    pub enabled: HashMap<SystemId, bool>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut enabled = HashMap::new();

        // Core gameplay (always on by default)
        enabled.insert(SystemId::Physics, true);
        enabled.insert(SystemId::ShapeLifecycle, true);
        enabled.insert(SystemId::ScrewCollection, true);
        enabled.insert(SystemId::ContainerTracking, true);
        enabled.insert(SystemId::Progress, true);
        enabled.insert(SystemId::Persistence, true);
        enabled.insert(SystemId::Rendering, true);
        enabled.insert(SystemId::Input, true);
        enabled.insert(SystemId::Audio, true);

        // Optional
        enabled.insert(SystemId::Effects, true);
        enabled.insert(SystemId::Tutorial, true);
        enabled.insert(SystemId::EditorTools, false); // editor builds only

        Self { enabled }
    }
}

impl SystemConfig {
    /// Check if a system is enabled.
    #[must_use]
    pub fn is_enabled(&self, id: SystemId) -> bool {
        self.enabled.get(&id).copied().unwrap_or(false)
    }

    /// Enable a system.
    pub fn enable(&mut self, id: SystemId) {
        self.enabled.insert(id, true);
    }

    /// Disable a system.
    pub fn disable(&mut self, id: SystemId) {
        self.enabled.insert(id, false);
    }

    /// Validate that every enabled system has its dependencies enabled.
    pub fn validate(&self) -> Result<(), Vec<SystemError>> {
        let mut errors = Vec::new();

        for id in SystemId::all() {
            if self.is_enabled(id) {
                for dependency in id.dependencies() {
                    if !self.is_enabled(dependency) {
                        errors.push(SystemError::MissingDependency {
                            system: id.name().to_owned(),
                            dependency: dependency.name().to_owned(),
                        });
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Load from environment variables (`GEARLOCK_SYSTEM_<NAME>=0|1`).
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        for id in SystemId::all() {
            let env_key = format!(
                "GEARLOCK_SYSTEM_{}",
                id.name().to_uppercase().replace('-', "_")
            );
            if let Ok(value) = std::env::var(&env_key) {
                let enabled = value == "1" || value.to_lowercase() == "true";
                config.enabled.insert(id, enabled);
            }
        }

        config
    }
}

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A system was registered twice for the same id.
    #[error("system '{}' is already registered", .id.name())]
    AlreadyRegistered { id: SystemId },

    /// A core system failed to initialize; the game cannot run.
    #[error("core system '{}' failed to initialize: {}", .id.name(), .source)]
    CoreSystemFailed {
        id: SystemId,
        #[source]
        source: SystemError,
    },
}

/// The central system registry.
///
/// Owns the single explicitly constructed event bus; systems receive
/// clones at construction time and communicate ONLY through it.
pub struct SystemRegistry {
    systems: RwLock<HashMap<SystemId, Arc<dyn GameSystem>>>,
    status: RwLock<HashMap<SystemId, SystemStatus>>,
    config: SystemConfig,
    bus: EventBus,
}

impl SystemRegistry {
    /// Create a registry around an injected bus.
    #[must_use]
    pub fn new(config: SystemConfig, bus: EventBus) -> Self {
        Self {
            systems: RwLock::new(HashMap::new()),
            status: RwLock::new(HashMap::new()),
            config,
            bus,
        }
    }

    /// A clone of the shared bus, for constructing systems.
    #[must_use]
    pub fn bus(&self) -> EventBus {
        self.bus.clone()
    }

    /// Register a system implementation for an id.
    ///
    /// A disabled id is recorded as [`SystemStatus::Disabled`] and the
    /// implementation is dropped; the game keeps running without it.
    pub fn register(
        &self,
        id: SystemId,
        system: Arc<dyn GameSystem>,
    ) -> Result<(), RegistryError> {
        if !self.config.is_enabled(id) {
            warn!(system = id.name(), "System disabled by configuration; not registered");
            self.status.write().insert(id, SystemStatus::Disabled);
            return Ok(());
        }

        let mut systems = self.systems.write();
        if systems.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered { id });
        }

        systems.insert(id, system);
        self.status.write().insert(id, SystemStatus::Registered);
        info!(system = id.name(), "System registered");
        Ok(())
    }

    /// Initialize every registered system, in startup order.
    ///
    /// A failing optional system is recorded as [`SystemStatus::Failed`]
    /// and skipped; a failing core system aborts with an error.
    pub async fn initialize_all(&self) -> Result<(), RegistryError> {
        for id in SystemId::all() {
            let system = self.systems.read().get(&id).cloned();
            let Some(system) = system else { continue };

            self.status.write().insert(id, SystemStatus::Starting);
            match system.initialize().await {
                Ok(()) => {
                    self.status.write().insert(id, SystemStatus::Running);
                    self.bus.emit(GameEvent::SystemReady {
                        system: id.name().to_owned(),
                    });
                }
                Err(source) => {
                    self.status.write().insert(id, SystemStatus::Failed);
                    if id.is_core() {
                        error!(system = id.name(), error = %source, "Core system failed");
                        return Err(RegistryError::CoreSystemFailed { id, source });
                    }
                    warn!(
                        system = id.name(),
                        error = %source,
                        "Optional system failed; continuing without it"
                    );
                }
            }
        }
        Ok(())
    }

    /// Destroy every registered system, in reverse startup order.
    ///
    /// Teardown errors are logged and do not stop the remaining systems.
    pub async fn shutdown_all(&self) {
        for id in SystemId::all().into_iter().rev() {
            let system = self.systems.read().get(&id).cloned();
            let Some(system) = system else { continue };

            match system.destroy().await {
                Ok(()) => {
                    self.status.write().insert(id, SystemStatus::Stopped);
                }
                Err(err) => {
                    self.status.write().insert(id, SystemStatus::Failed);
                    warn!(system = id.name(), error = %err, "Teardown failed");
                }
            }
        }
    }

    /// Status of one system slot.
    #[must_use]
    pub fn status(&self, id: SystemId) -> SystemStatus {
        self.status
            .read()
            .get(&id)
            .copied()
            .unwrap_or(SystemStatus::NotRegistered)
    }

    /// Lifecycle snapshots of every registered system.
    #[must_use]
    pub fn infos(&self) -> Vec<SystemInfo> {
        SystemId::all()
            .into_iter()
            .filter_map(|id| self.systems.read().get(&id).map(|s| s.system_info()))
            .collect()
    }
}
