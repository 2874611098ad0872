//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so a missing or minimal config file still yields
//! a runnable proxy.

use serde::{Deserialize, Serialize};

/// Root configuration for the forward proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, backlog, connection limit).
    pub listener: ListenerConfig,

    /// Response cache settings.
    pub cache: CacheConfig,

    /// Name resolution settings, including opt-in fault injection.
    pub dns: DnsConfig,

    /// Origin fetch settings.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Listen backlog depth, fixed at startup.
    pub backlog: u32,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            backlog: 128,
            max_connections: 1024,
        }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached responses. The least-recently-used entry is
    /// evicted when an insertion would exceed this.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

/// Name resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DnsConfig {
    /// Opt-in fault injection applied to every cache-missing lookup.
    pub chaos: ChaosConfig,
}

/// Fault injection for the resolution path.
///
/// Disabled by default. When enabled, each lookup sleeps a uniform random
/// delay and fails with the configured probability before the real resolver
/// runs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChaosConfig {
    /// Whether to inject latency and failures into lookups.
    pub enabled: bool,

    /// Minimum injected delay in milliseconds.
    pub min_delay_ms: u64,

    /// Maximum injected delay in milliseconds.
    pub max_delay_ms: u64,

    /// Probability in [0, 1] that a lookup fails outright.
    pub failure_rate: f64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_delay_ms: 100,
            max_delay_ms: 300,
            failure_rate: 0.2,
        }
    }
}

/// Origin fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// TCP port origin servers are contacted on.
    pub port: u16,

    /// Read buffer size for socket reads, in bytes.
    pub read_buffer_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            port: 80,
            read_buffer_bytes: 4096,
        }
    }
}

/// Timeout configuration.
///
/// Every blocking I/O operation on the request path carries one of these
/// deadlines; expiry surfaces as a distinct, recoverable error.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for the single read of the inbound request.
    pub client_read_secs: u64,

    /// Deadline for establishing the outbound connection.
    pub connect_secs: u64,

    /// Deadline for draining the origin response (read until close).
    pub upstream_read_secs: u64,

    /// How long shutdown waits for in-flight connections to finish.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            client_read_secs: 10,
            connect_secs: 10,
            upstream_read_secs: 30,
            shutdown_grace_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Whether to expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Address for the metrics exporter to bind.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_runnable() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.upstream.port, 80);
        assert!(config.cache.capacity > 0);
        assert!(!config.dns.chaos.enabled);
    }

    #[test]
    fn minimal_toml_fills_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [cache]
            capacity = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.cache.capacity, 5);
        assert_eq!(config.listener.max_connections, 1024);
        assert_eq!(config.timeouts.connect_secs, 10);
    }
}
