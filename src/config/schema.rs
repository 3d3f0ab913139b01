//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the dispatcher binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Request deadline configuration.
    pub timeouts: TimeoutConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest request body collected before dispatch, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-request deadline in milliseconds. 0 disables the timeout middleware.
    pub request_ms: u64,
}

impl TimeoutConfig {
    /// The request deadline, if enabled.
    pub fn request(&self) -> Option<Duration> {
        (self.request_ms > 0).then(|| Duration::from_millis(self.request_ms))
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_ms: 1000 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: DispatcherConfig = toml::from_str("").unwrap();
        assert_eq!(config, DispatcherConfig::default());
        assert_eq!(config.timeouts.request(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_partial_sections() {
        let config: DispatcherConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [timeouts]
            request_ms = 0

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.listener.max_body_bytes, 2 * 1024 * 1024);
        assert_eq!(config.timeouts.request(), None);
        assert_eq!(config.observability.log_format, "json");
        assert_eq!(config.observability.log_level, "info");
    }
}
