//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging output.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name included in log lines (game vs editor builds).
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error).
    pub log_level: String,

    /// Whether to write to the console (for development).
    pub console_output: bool,

    /// Whether to emit JSON formatted logs.
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "gearlock".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `GEARLOCK_SERVICE_NAME`: Service name (default: gearlock)
    /// - `GEARLOCK_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `GEARLOCK_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `GEARLOCK_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("GEARLOCK_SERVICE_NAME")
                .unwrap_or_else(|_| "gearlock".to_string()),

            log_level: env::var("GEARLOCK_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("GEARLOCK_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: env::var("GEARLOCK_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    /// Create configuration for the companion editor build.
    pub fn for_editor() -> Self {
        let mut config = Self::from_env();
        config.service_name = "gearlock-editor".to_string();
        config
    }
}
