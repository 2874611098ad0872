//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): completed requests by outcome
//! - `proxy_cache_hits_total` / `proxy_cache_misses_total` (counters)
//! - `proxy_cache_entries` (gauge): live response cache entries
//! - `proxy_dns_cache_hits_total` (counter): resolutions served from cache
//! - `proxy_dns_lookups_total` (counter): lookups that went upstream
//! - `proxy_active_connections` (gauge): currently tracked connections
//! - `proxy_upstream_bytes_total` (counter): bytes fetched from origins
//!
//! # Design Decisions
//! - Uses the `metrics` facade; recording is a no-op until an exporter is
//!   installed, so the hot path never pays for disabled observability
//! - Exporter is Prometheus, opt-in via `observability.metrics_enabled`

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
    {
        Ok(()) => {
            describe();
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter");
        }
    }
}

fn describe() {
    metrics::describe_counter!(
        "proxy_requests_total",
        "Completed client requests by outcome"
    );
    metrics::describe_counter!("proxy_cache_hits_total", "Response cache hits");
    metrics::describe_counter!("proxy_cache_misses_total", "Response cache misses");
    metrics::describe_gauge!("proxy_cache_entries", "Live response cache entries");
    metrics::describe_counter!(
        "proxy_dns_cache_hits_total",
        "Resolutions served from the name cache"
    );
    metrics::describe_counter!(
        "proxy_dns_lookups_total",
        "Name lookups sent to the resolver"
    );
    metrics::describe_gauge!("proxy_active_connections", "Currently active connections");
    metrics::describe_counter!(
        "proxy_upstream_bytes_total",
        "Bytes fetched from origin servers"
    );
}

/// Record a completed request with its outcome label.
pub fn record_request(outcome: &'static str) {
    metrics::counter!("proxy_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_cache_hit() {
    metrics::counter!("proxy_cache_hits_total").increment(1);
}

pub fn record_cache_miss() {
    metrics::counter!("proxy_cache_misses_total").increment(1);
}

pub fn record_cache_entries(entries: usize) {
    metrics::gauge!("proxy_cache_entries").set(entries as f64);
}

pub fn record_dns_cache_hit() {
    metrics::counter!("proxy_dns_cache_hits_total").increment(1);
}

pub fn record_dns_lookup() {
    metrics::counter!("proxy_dns_lookups_total").increment(1);
}

pub fn record_active_connections(count: u64) {
    metrics::gauge!("proxy_active_connections").set(count as f64);
}

pub fn record_upstream_bytes(bytes: usize) {
    metrics::counter!("proxy_upstream_bytes_total").increment(bytes as u64);
}
