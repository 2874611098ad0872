//! Origin fetching.
//!
//! # Responsibilities
//! - Open a fresh outbound connection per fetch
//! - Send the single-shot request line plus Host and Connection: close
//! - Drain the response until the origin closes the connection
//!
//! # Design Decisions
//! - Termination is solely peer-initiated close; no Content-Length or
//!   chunked awareness — the bytes are relayed verbatim either way
//! - Every external call has a deadline; expiry is a distinct error kind

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::observability::metrics;

/// Error type for origin fetches.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The resolved address is not a usable IP address.
    #[error("unusable origin address {address:?}")]
    Address { address: String },

    /// Outbound connection establishment failed.
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failure while writing the request or draining the response.
    #[error("transfer with {addr} failed: {source}")]
    Transfer {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// A deadline expired during connect or read.
    #[error("{operation} to {addr} timed out after {deadline:?}")]
    Timeout {
        operation: &'static str,
        addr: SocketAddr,
        deadline: Duration,
    },
}

/// Fetch `path` from the origin at `address`, identifying it as `host`.
///
/// Opens a new connection, writes exactly
/// `GET <path> HTTP/1.1\r\nHost: <host>\r\nConnection: close\r\n\r\n`,
/// and accumulates the response until the peer closes. The connection is
/// closed on drop before returning.
pub async fn fetch(
    address: &str,
    path: &str,
    host: &str,
    upstream: &UpstreamConfig,
    timeouts: &TimeoutConfig,
) -> Result<Vec<u8>, FetchError> {
    let ip: IpAddr = address.parse().map_err(|_| FetchError::Address {
        address: address.to_string(),
    })?;
    let addr = SocketAddr::new(ip, upstream.port);

    let connect_deadline = Duration::from_secs(timeouts.connect_secs);
    let mut stream = tokio::time::timeout(connect_deadline, TcpStream::connect(addr))
        .await
        .map_err(|_| FetchError::Timeout {
            operation: "connect",
            addr,
            deadline: connect_deadline,
        })?
        .map_err(|source| FetchError::Connect { addr, source })?;

    let request = format!("GET {path} HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n\r\n");
    stream
        .write_all(request.as_bytes())
        .await
        .map_err(|source| FetchError::Transfer { addr, source })?;

    let read_deadline = Duration::from_secs(timeouts.upstream_read_secs);
    let response = tokio::time::timeout(
        read_deadline,
        read_until_close(&mut stream, upstream.read_buffer_bytes),
    )
    .await
    .map_err(|_| FetchError::Timeout {
        operation: "read",
        addr,
        deadline: read_deadline,
    })?
    .map_err(|source| FetchError::Transfer { addr, source })?;

    metrics::record_upstream_bytes(response.len());
    tracing::debug!(
        origin = %addr,
        host = %host,
        path = %path,
        bytes = response.len(),
        "Origin fetch complete"
    );

    Ok(response)
}

async fn read_until_close(
    stream: &mut TcpStream,
    buffer_bytes: usize,
) -> std::io::Result<Vec<u8>> {
    let mut response = Vec::new();
    let mut buffer = vec![0u8; buffer_bytes];
    loop {
        let n = stream.read(&mut buffer).await?;
        if n == 0 {
            return Ok(response);
        }
        response.extend_from_slice(&buffer[..n]);
    }
}
