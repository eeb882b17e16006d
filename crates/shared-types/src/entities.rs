//! # Core Domain Entities
//!
//! Defines the game entities referenced by events and systems.
//!
//! ## Clusters
//!
//! - **Board**: `ShapeId`, `LayerId`, screw placement on shapes
//! - **Collection**: `ScrewId`, `ScrewColor`, `ContainerId`
//! - **Progress**: `LevelId`, `LevelOutcome`

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a physics shape on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ShapeId(pub u64);

/// Unique identifier for a screw fastened to one or more shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ScrewId(pub u64);

/// Unique identifier for a collection container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ContainerId(pub u64);

/// Depth index of a board layer. Layer 0 is the topmost, interactable layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct LayerId(pub u8);

/// Identifier of a level, as authored by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct LevelId(pub String);

impl LevelId {
    /// Create a level id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape-{}", self.0)
    }
}

impl fmt::Display for ScrewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screw-{}", self.0)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container-{}", self.0)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The screw color palette.
///
/// Containers accept screws of a single color; matching is done by the
/// collection system, not by the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScrewColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl ScrewColor {
    /// All colors, in palette order.
    #[must_use]
    pub fn all() -> [ScrewColor; 6] {
        [
            Self::Red,
            Self::Blue,
            Self::Green,
            Self::Yellow,
            Self::Purple,
            Self::Orange,
        ]
    }
}

impl fmt::Display for ScrewColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Orange => "orange",
        };
        write!(f, "{name}")
    }
}

/// Terminal outcome of a level attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelOutcome {
    /// Every container was filled.
    Cleared,
    /// The player ran out of container capacity.
    OutOfSpace,
    /// The player abandoned the attempt.
    Abandoned,
}
