//! Name resolution backends.
//!
//! # Responsibilities
//! - Define the `Resolve` seam the cache sits on top of
//! - `SystemResolver`: real lookups through the OS resolver
//! - `ChaosResolver`: opt-in fault injection wrapping another resolver
//!
//! # Design Decisions
//! - Addresses travel as dotted-quad strings; parsing to `IpAddr` happens at
//!   the fetch boundary, which is where an unusable address is an error
//! - Fault injection is a decorator, never baked into the real resolver

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use rand::Rng;

use crate::config::ChaosConfig;

/// Error type for name resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DnsError {
    /// The lookup ran but produced no address.
    #[error("no address found for {0:?}")]
    NoAddress(String),

    /// The underlying lookup failed.
    #[error("lookup failed for {host:?}: {reason}")]
    Lookup { host: String, reason: String },

    /// Failure injected by the chaos resolver.
    #[error("injected lookup failure for {0:?}")]
    Injected(String),
}

/// A name resolution backend.
///
/// Implementations return the resolved address as text. Object-safe so the
/// cache and decorators can hold `Arc<dyn Resolve>`.
pub trait Resolve: Send + Sync + 'static {
    /// Resolve a hostname to an address.
    fn resolve(&self, host: &str) -> BoxFuture<'static, Result<String, DnsError>>;
}

/// Resolver backed by the operating system's name resolution facility.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolve for SystemResolver {
    fn resolve(&self, host: &str) -> BoxFuture<'static, Result<String, DnsError>> {
        let host = host.to_string();
        Box::pin(async move {
            // lookup_host needs a port; it is discarded with the socket addr.
            let mut addrs = tokio::net::lookup_host((host.as_str(), 0))
                .await
                .map_err(|e| DnsError::Lookup {
                    host: host.clone(),
                    reason: e.to_string(),
                })?;

            match addrs.next() {
                Some(addr) => Ok(addr.ip().to_string()),
                None => Err(DnsError::NoAddress(host.clone())),
            }
        })
    }
}

/// Fault-injecting resolver decorator.
///
/// Sleeps a uniform random delay and fails with the configured probability
/// before delegating to the inner resolver. Installed only when
/// `dns.chaos.enabled` is set; the default request path never reaches this
/// type.
pub struct ChaosResolver {
    inner: Arc<dyn Resolve>,
    config: ChaosConfig,
}

impl ChaosResolver {
    /// Wrap a resolver with the given chaos parameters.
    pub fn new(inner: Arc<dyn Resolve>, config: ChaosConfig) -> Self {
        Self { inner, config }
    }
}

impl Resolve for ChaosResolver {
    fn resolve(&self, host: &str) -> BoxFuture<'static, Result<String, DnsError>> {
        let inner = Arc::clone(&self.inner);
        let config = self.config.clone();
        let host = host.to_string();
        Box::pin(async move {
            let (delay_ms, fail) = {
                let mut rng = rand::thread_rng();
                let delay_ms = rng.gen_range(config.min_delay_ms..=config.max_delay_ms);
                let fail = rng.gen_bool(config.failure_rate.clamp(0.0, 1.0));
                (delay_ms, fail)
            };

            tokio::time::sleep(Duration::from_millis(delay_ms)).await;

            if fail {
                tracing::debug!(host = %host, "Injecting lookup failure");
                return Err(DnsError::Injected(host));
            }

            inner.resolve(&host).await
        })
    }
}
