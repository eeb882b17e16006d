//! # Shared Types Crate
//!
//! Core domain types used across every Gearlock game system: entity
//! identifiers for screws, shapes, layers and containers, the screw color
//! palette, and the cross-system error taxonomy.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-system types are defined here.
//! - **Value Data**: Everything in this crate is cheap to clone and carries
//!   no behavior beyond construction and display.
//! - **No Bus Coupling**: This crate knows nothing about the event bus;
//!   `shared-bus` depends on it, never the other way around.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
