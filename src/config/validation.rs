//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (capacity > 0, timeouts > 0, probability in [0,1])
//! - Check addresses parse before any socket is opened
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    BindAddress(String),

    #[error("listener.max_connections must be greater than zero")]
    MaxConnections,

    #[error("listener.backlog must be greater than zero")]
    Backlog,

    #[error("cache.capacity must be greater than zero")]
    CacheCapacity,

    #[error("upstream.read_buffer_bytes must be greater than zero")]
    ReadBuffer,

    #[error("timeouts.{0} must be greater than zero")]
    Timeout(&'static str),

    #[error("dns.chaos.failure_rate must be within [0, 1], got {0}")]
    FailureRate(f64),

    #[error("dns.chaos.min_delay_ms ({0}) exceeds max_delay_ms ({1})")]
    DelayRange(u64, u64),

    #[error("observability.metrics_address {0:?} is not a valid socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::MaxConnections);
    }
    if config.listener.backlog == 0 {
        errors.push(ValidationError::Backlog);
    }

    if config.cache.capacity == 0 {
        errors.push(ValidationError::CacheCapacity);
    }

    if config.upstream.read_buffer_bytes == 0 {
        errors.push(ValidationError::ReadBuffer);
    }

    let timeouts = [
        ("client_read_secs", config.timeouts.client_read_secs),
        ("connect_secs", config.timeouts.connect_secs),
        ("upstream_read_secs", config.timeouts.upstream_read_secs),
        ("shutdown_grace_secs", config.timeouts.shutdown_grace_secs),
    ];
    for (name, value) in timeouts {
        if value == 0 {
            errors.push(ValidationError::Timeout(name));
        }
    }

    let chaos = &config.dns.chaos;
    if !(0.0..=1.0).contains(&chaos.failure_rate) {
        errors.push(ValidationError::FailureRate(chaos.failure_rate));
    }
    if chaos.min_delay_ms > chaos.max_delay_ms {
        errors.push(ValidationError::DelayRange(
            chaos.min_delay_ms,
            chaos.max_delay_ms,
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.cache.capacity = 0;
        config.dns.chaos.failure_rate = 1.5;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::CacheCapacity));
        assert!(errors.contains(&ValidationError::FailureRate(1.5)));
    }

    #[test]
    fn delay_range_checked() {
        let mut config = ProxyConfig::default();
        config.dns.chaos.min_delay_ms = 500;
        config.dns.chaos.max_delay_ms = 100;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::DelayRange(500, 100)]);
    }
}
