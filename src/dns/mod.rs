//! Name resolution subsystem.
//!
//! # Data Flow
//! ```text
//! handler needs an address for a hostname
//!     → cache.rs (hit: stored address, no I/O)
//!     → miss: single leader per hostname runs the lookup
//!     → resolver.rs (ChaosResolver if enabled → SystemResolver)
//!     → success stored for the process lifetime, fanned out to waiters
//! ```

pub mod cache;
pub mod resolver;

use std::sync::Arc;

use crate::config::DnsConfig;

pub use cache::DnsCache;
pub use resolver::{ChaosResolver, DnsError, Resolve, SystemResolver};

/// Build the resolver chain described by the configuration.
///
/// The chaos decorator is only installed when explicitly enabled; the default
/// chain is the bare system resolver.
pub fn build_resolver(config: &DnsConfig) -> Arc<dyn Resolve> {
    let system: Arc<dyn Resolve> = Arc::new(SystemResolver);
    if config.chaos.enabled {
        tracing::warn!(
            failure_rate = config.chaos.failure_rate,
            min_delay_ms = config.chaos.min_delay_ms,
            max_delay_ms = config.chaos.max_delay_ms,
            "DNS fault injection enabled"
        );
        Arc::new(ChaosResolver::new(system, config.chaos.clone()))
    } else {
        system
    }
}
