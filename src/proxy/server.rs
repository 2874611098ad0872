//! Proxy server: accept loop and task dispatch.
//!
//! # Responsibilities
//! - Own the shared caches and the resolver chain
//! - Accept connections (bounded by listener permits) and spawn one task each
//! - Stop accepting on shutdown and drain in-flight connections

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::cache::ResponseCache;
use crate::config::ProxyConfig;
use crate::dns::{build_resolver, DnsCache, Resolve};
use crate::net::{ConnectionTracker, Listener, ListenerError};
use crate::observability::metrics;
use crate::proxy::handler::Handler;

/// The forward proxy server.
///
/// Construction builds the two shared caches; `run` drives the accept loop.
/// The caches are instance-scoped and handed to each task via `Arc` — there
/// is no global state.
pub struct ProxyServer {
    config: ProxyConfig,
    dns: DnsCache,
    cache: Arc<ResponseCache>,
    tracker: ConnectionTracker,
}

impl ProxyServer {
    /// Build a server from a validated configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let resolver = build_resolver(&config.dns);
        Self::with_resolver(config, resolver)
    }

    /// Build a server with an explicit resolver backend.
    ///
    /// Used by tests to substitute deterministic resolution; `new` wires in
    /// the configured chain.
    pub fn with_resolver(config: ProxyConfig, resolver: Arc<dyn Resolve>) -> Self {
        let dns = DnsCache::new(resolver);
        let cache = Arc::new(ResponseCache::new(config.cache.capacity));

        tracing::info!(
            cache_capacity = config.cache.capacity,
            upstream_port = config.upstream.port,
            "Proxy server initialized"
        );

        Self {
            config,
            dns,
            cache,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Shared name cache (exposed for integration tests).
    pub fn dns(&self) -> &DnsCache {
        &self.dns
    }

    /// Shared response cache (exposed for integration tests).
    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Run the accept loop until a shutdown signal arrives.
    ///
    /// Accept failures are startup/environment failures and are returned as
    /// fatal; per-connection failures never reach this level.
    pub async fn run(
        &self,
        listener: Listener,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let handler = Handler {
            dns: self.dns.clone(),
            cache: Arc::clone(&self.cache),
            upstream: self.config.upstream.clone(),
            timeouts: self.config.timeouts.clone(),
        };

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Shutdown signal received; no longer accepting");
                    break;
                }
                accepted = listener.accept() => {
                    let (stream, peer, permit) = accepted?;
                    let guard = self.tracker.track();
                    metrics::record_active_connections(self.tracker.active_count());

                    let handler = handler.clone();
                    tokio::spawn(async move {
                        handler.handle(stream, peer, guard).await;
                        drop(permit);
                    });
                }
            }
        }

        self.drain().await;
        Ok(())
    }

    /// Wait for in-flight connections, bounded by the shutdown grace period.
    async fn drain(&self) {
        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        let active = self.tracker.active_count();
        if active > 0 {
            tracing::info!(active_connections = active, grace = ?grace, "Draining connections");
        }

        if tokio::time::timeout(grace, self.tracker.wait_idle())
            .await
            .is_err()
        {
            tracing::warn!(
                active_connections = self.tracker.active_count(),
                "Grace period expired with connections still active"
            );
        }
        metrics::record_active_connections(self.tracker.active_count());
    }
}
