//! Single-flight domain-name cache.
//!
//! # Responsibilities
//! - Serve repeat lookups for a hostname without any I/O
//! - Collapse concurrent misses for one hostname into a single lookup
//! - Store successful resolutions for the process lifetime
//!
//! # Design Decisions
//! - Resolved entries never expire or update; first success wins
//! - Failures are not cached: the next caller retries the lookup
//! - The resolved map is re-checked under the in-flight lock, so a miss can
//!   never race a completing leader into a duplicate lookup

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::dns::resolver::{DnsError, Resolve};
use crate::observability::metrics;

type LookupResult = Result<String, DnsError>;

/// Process-lifetime cache of hostname → address, shared by every handler.
#[derive(Clone)]
pub struct DnsCache {
    resolver: Arc<dyn Resolve>,
    resolved: Arc<DashMap<String, String>>,
    inflight: Arc<Mutex<HashMap<String, broadcast::Sender<LookupResult>>>>,
}

impl DnsCache {
    /// Create a cache on top of the given resolver.
    pub fn new(resolver: Arc<dyn Resolve>) -> Self {
        Self {
            resolver,
            resolved: Arc::new(DashMap::new()),
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Resolve a hostname, consulting the cache first.
    ///
    /// A hit returns the stored address with no I/O. On a miss, exactly one
    /// caller (the leader) performs the lookup; concurrent callers for the
    /// same hostname await the leader's result.
    pub async fn resolve(&self, host: &str) -> LookupResult {
        if let Some(addr) = self.resolved.get(host) {
            metrics::record_dns_cache_hit();
            return Ok(addr.value().clone());
        }

        enum Role {
            Leader,
            Follower(broadcast::Receiver<LookupResult>),
        }

        let role = {
            let mut inflight = self
                .inflight
                .lock()
                .expect("dns in-flight table mutex poisoned");

            // The leader may have finished between the fast-path check and
            // taking the lock.
            if let Some(addr) = self.resolved.get(host) {
                metrics::record_dns_cache_hit();
                return Ok(addr.value().clone());
            }

            match inflight.get(host) {
                Some(tx) => Role::Follower(tx.subscribe()),
                None => {
                    let (tx, _rx) = broadcast::channel(1);
                    inflight.insert(host.to_string(), tx);
                    Role::Leader
                }
            }
        };

        match role {
            Role::Follower(mut rx) => rx.recv().await.unwrap_or_else(|_| {
                // Leader task went away without publishing (e.g. panicked).
                Err(DnsError::Lookup {
                    host: host.to_string(),
                    reason: "in-flight lookup aborted".to_string(),
                })
            }),
            Role::Leader => {
                metrics::record_dns_lookup();
                let result = self.resolver.resolve(host).await;

                if let Ok(addr) = &result {
                    tracing::info!(host = %host, address = %addr, "Resolved hostname");
                    self.resolved.insert(host.to_string(), addr.clone());
                } else {
                    tracing::debug!(host = %host, "Lookup failed; not cached");
                }

                let tx = self
                    .inflight
                    .lock()
                    .expect("dns in-flight table mutex poisoned")
                    .remove(host);
                if let Some(tx) = tx {
                    // No waiters is fine; the send result is irrelevant.
                    let _ = tx.send(result.clone());
                }

                result
            }
        }
    }

    /// Number of cached hostnames.
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}
