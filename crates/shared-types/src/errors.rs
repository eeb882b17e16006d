//! # Error Types
//!
//! Defines error types used across game systems.

use thiserror::Error;

/// Errors raised by the system lifecycle layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SystemError {
    /// A subscribe or emit was attempted on a destroyed system.
    #[error("System '{system}' is destroyed; {operation} refused")]
    Destroyed { system: String, operation: String },

    /// A system-specific setup hook failed.
    #[error("System '{system}' failed to initialize: {message}")]
    InitFailed { system: String, message: String },

    /// A system-specific teardown hook failed.
    #[error("System '{system}' failed to tear down: {message}")]
    TeardownFailed { system: String, message: String },

    /// A required system dependency is disabled or missing.
    #[error("System '{system}' requires '{dependency}' but it is unavailable")]
    MissingDependency { system: String, dependency: String },
}

impl SystemError {
    /// Shorthand for the destroyed-instance contract violation.
    pub fn destroyed(system: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Destroyed {
            system: system.into(),
            operation: operation.into(),
        }
    }
}

/// A fault reported by an event handler.
///
/// Handler faults are contained at the dispatch boundary: the bus logs and
/// counts them, and sibling handlers still run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("handler fault: {message}")]
pub struct HandlerError {
    /// Human-readable description of the fault.
    pub message: String,
}

impl HandlerError {
    /// Create a handler error from any string-like value.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
