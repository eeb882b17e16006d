//! # Telemetry Tests
//!
//! Subscriber installation is process-global, so everything lives in one
//! test function.

#[cfg(test)]
mod tests {
    use gearlock_telemetry::{init_telemetry, TelemetryConfig};

    #[test]
    fn init_installs_once_then_refuses() {
        let config = TelemetryConfig {
            console_output: false,
            ..TelemetryConfig::default()
        };

        let first = init_telemetry(&config);
        assert!(first.is_ok());

        // The global subscriber slot is taken now.
        let second = init_telemetry(&config);
        assert!(second.is_err());
    }
}
