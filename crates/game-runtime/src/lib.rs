//! # Game Runtime
//!
//! Wires the game together: one explicitly constructed event bus, a
//! registry of game systems keyed by [`SystemId`], and the configuration
//! deciding which systems run.
//!
//! ## How It Works
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       SystemRegistry                            │
//! │                                                                 │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐         │
//! │  │ physics  │  │  shapes  │  │  screws  │  │   ...    │         │
//! │  │ ENABLED  │  │ ENABLED  │  │ ENABLED  │  │          │         │
//! │  └────┬─────┘  └────┬─────┘  └────┬─────┘  └──────────┘         │
//! │       │             │             │                             │
//! │       └─────────────┴─────────────┴────────┐                    │
//! │                                            ▼                    │
//! │                                  ┌─────────────────┐            │
//! │                                  │    Event Bus    │            │
//! │                                  │  (shared-bus)   │            │
//! │                                  └─────────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Systems never see each other; the registry hands each one a clone of
//! the bus and drives `initialize`/`destroy` in dependency order.

pub mod config;
pub mod registry;

pub use config::{BusTuning, ConfigError, RuntimeConfig};
pub use registry::{RegistryError, SystemConfig, SystemId, SystemRegistry, SystemStatus};
