//! Per-connection handling.
//!
//! # State machine
//! ```text
//! Accepted → Parsed → CacheHit  → Reply → Closed
//!                   → CacheMiss → Resolved → Fetched → Stored → Reply → Closed
//!                   → any failure → Closed (no reply)
//! ```
//!
//! # Design Decisions
//! - Exactly one bounded read of the inbound request; no framing
//! - Within a connection the order is strict: parse → cache-check →
//!   (resolve → fetch → store) → reply
//! - The socket closes on every exit path; errors never write bytes back

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::cache::ResponseCache;
use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::dns::DnsCache;
use crate::http::parse_request;
use crate::net::ConnectionGuard;
use crate::observability::metrics;
use crate::proxy::error::ProxyError;
use crate::upstream;

/// How a successfully served request was fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Served {
    /// Reply came straight from the response cache.
    CacheHit,
    /// Reply was fetched from the origin and stored.
    Fetched,
}

/// Everything a connection task needs, cloned per spawn.
///
/// The caches are shared singletons; the configs are cheap copies taken at
/// startup.
#[derive(Clone)]
pub struct Handler {
    pub dns: DnsCache,
    pub cache: Arc<ResponseCache>,
    pub upstream: UpstreamConfig,
    pub timeouts: TimeoutConfig,
}

impl Handler {
    /// Drive one client connection to completion.
    ///
    /// This is the handler boundary: every `ProxyError` is logged and
    /// converted into "close without a reply" here.
    pub async fn handle(&self, mut stream: TcpStream, peer: SocketAddr, guard: ConnectionGuard) {
        let connection_id = guard.id();

        match self.serve(&mut stream).await {
            Ok(Served::CacheHit) => {
                metrics::record_request("cache_hit");
                tracing::debug!(connection_id = %connection_id, peer_addr = %peer, "Served from cache");
            }
            Ok(Served::Fetched) => {
                metrics::record_request("fetched");
                tracing::debug!(connection_id = %connection_id, peer_addr = %peer, "Served from origin");
            }
            Err(e) => {
                metrics::record_request(e.outcome());
                tracing::warn!(
                    connection_id = %connection_id,
                    peer_addr = %peer,
                    error = %e,
                    "Closing connection without reply"
                );
            }
        }

        let _ = stream.shutdown().await;
        // guard drops here, releasing the connection slot
    }

    async fn serve(&self, stream: &mut TcpStream) -> Result<Served, ProxyError> {
        let request = self.read_request(stream).await?;
        let parsed = parse_request(&request)?;

        tracing::debug!(host = %parsed.host, path = %parsed.path, "Request parsed");

        if let Some(content) = self.cache.get(&parsed.url) {
            stream
                .write_all(&content)
                .await
                .map_err(ProxyError::ClientWrite)?;
            return Ok(Served::CacheHit);
        }

        let address = self.dns.resolve(&parsed.host).await?;
        let content = upstream::fetch(
            &address,
            &parsed.path,
            &parsed.host,
            &self.upstream,
            &self.timeouts,
        )
        .await?;

        let content: Arc<[u8]> = content.into();
        self.cache.put(parsed.url, Arc::clone(&content));

        stream
            .write_all(&content)
            .await
            .map_err(ProxyError::ClientWrite)?;
        Ok(Served::Fetched)
    }

    /// The single bounded read of the inbound request.
    async fn read_request(&self, stream: &mut TcpStream) -> Result<Vec<u8>, ProxyError> {
        let deadline = Duration::from_secs(self.timeouts.client_read_secs);
        let mut buffer = vec![0u8; self.upstream.read_buffer_bytes];

        let n = tokio::time::timeout(deadline, stream.read(&mut buffer))
            .await
            .map_err(|_| ProxyError::ClientReadTimeout(deadline))?
            .map_err(ProxyError::ClientRead)?;

        buffer.truncate(n);
        Ok(buffer)
    }
}
