//! # Runtime Configuration
//!
//! Unified configuration for the bus and the system roster.

use crate::registry::SystemConfig;
use shared_bus::BusConfig;
use std::time::Duration;
use thiserror::Error;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Which game systems run.
    pub systems: SystemConfig,
    /// Event bus tuning.
    pub bus: BusTuning,
}

impl RuntimeConfig {
    /// Load from environment variables, starting from defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            systems: SystemConfig::from_env(),
            bus: BusTuning::from_env(),
        }
    }

    /// Validate the configuration before building a registry.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroLoopCeiling`] when loop protection is tuned off
    /// - [`ConfigError::UnsatisfiedDependency`] per enabled system whose
    ///   dependency is disabled
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        if self.bus.loop_ceiling == 0 {
            errors.push(ConfigError::ZeroLoopCeiling);
        }

        errors.extend(
            self.systems
                .validate()
                .err()
                .unwrap_or_default()
                .into_iter()
                .map(|err| ConfigError::UnsatisfiedDependency(err.to_string())),
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The loop-detector ceiling must admit at least one emission.
    #[error("loop ceiling is 0; every emission would be refused")]
    ZeroLoopCeiling,

    /// An enabled system depends on a disabled one.
    #[error("{0}")]
    UnsatisfiedDependency(String),
}

/// Event bus tuning knobs.
#[derive(Debug, Clone)]
pub struct BusTuning {
    /// Loop-detector ceiling per `(event type, source)` window.
    pub loop_ceiling: u32,
    /// Loop-detector sliding window in milliseconds.
    pub loop_window_ms: u64,
    /// Bound on the dispatch history ring.
    pub history_capacity: usize,
}

impl BusTuning {
    /// Load from `GEARLOCK_LOOP_CEILING`, `GEARLOCK_LOOP_WINDOW_MS`, and
    /// `GEARLOCK_HISTORY_CAPACITY`, keeping defaults for unset or
    /// unparseable values.
    #[must_use]
    pub fn from_env() -> Self {
        let mut tuning = Self::default();
        if let Some(ceiling) = env_parse("GEARLOCK_LOOP_CEILING") {
            tuning.loop_ceiling = ceiling;
        }
        if let Some(window_ms) = env_parse("GEARLOCK_LOOP_WINDOW_MS") {
            tuning.loop_window_ms = window_ms;
        }
        if let Some(capacity) = env_parse("GEARLOCK_HISTORY_CAPACITY") {
            tuning.history_capacity = capacity;
        }
        tuning
    }

    /// Convert into the bus's own config type.
    #[must_use]
    pub fn bus_config(&self) -> BusConfig {
        BusConfig {
            loop_ceiling: self.loop_ceiling,
            loop_window: Duration::from_millis(self.loop_window_ms),
            history_capacity: self.history_capacity,
        }
    }
}

impl Default for BusTuning {
    fn default() -> Self {
        let defaults = BusConfig::default();
        Self {
            loop_ceiling: defaults.loop_ceiling,
            loop_window_ms: defaults.loop_window.as_millis() as u64,
            history_capacity: defaults.history_capacity,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}
