//! # Gearlock Telemetry
//!
//! Structured logging setup shared by the game binary, the editor, and
//! the test tooling.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gearlock_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(&config).expect("telemetry init failed");
//!
//!     // Game code runs here; logs flow through the installed subscriber.
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GEARLOCK_LOG_LEVEL` | `info` | Log level filter |
//! | `GEARLOCK_CONSOLE_OUTPUT` | `true` | Enable console output |
//! | `GEARLOCK_JSON_LOGS` | `false` | JSON formatted logs |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_telemetry, TelemetryGuard};

use thiserror::Error;

/// Telemetry initialization errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Installing the tracing subscriber failed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// The configured filter directive did not parse.
    #[error("Invalid log filter '{0}'")]
    Filter(String),
}
