//! Per-connection error taxonomy.
//!
//! Every failure on the request path is represented here, propagated with
//! `?`, and handled exactly once at the handler boundary: log, close the
//! client socket without a reply, end the task. Nothing escapes to the
//! process.

use std::time::Duration;

use crate::dns::DnsError;
use crate::http::ParseError;
use crate::upstream::FetchError;

/// Error type for a single connection's handling.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The inbound request line could not be parsed.
    #[error(transparent)]
    MalformedRequest(#[from] ParseError),

    /// Name resolution failed.
    #[error("resolution failed: {0}")]
    Resolution(#[from] DnsError),

    /// Origin fetch failed (address, connect, transfer, or timeout).
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Reading the inbound request failed.
    #[error("client read failed: {0}")]
    ClientRead(std::io::Error),

    /// The single inbound read exceeded its deadline.
    #[error("client read timed out after {0:?}")]
    ClientReadTimeout(Duration),

    /// Writing the response back to the client failed.
    #[error("client write failed: {0}")]
    ClientWrite(std::io::Error),
}

impl ProxyError {
    /// Low-cardinality label for the requests-by-outcome metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            ProxyError::MalformedRequest(_) => "malformed_request",
            ProxyError::Resolution(_) => "resolution_error",
            ProxyError::Fetch(FetchError::Address { .. }) => "address_error",
            ProxyError::Fetch(FetchError::Connect { .. }) => "connect_error",
            ProxyError::Fetch(FetchError::Transfer { .. }) => "transfer_error",
            ProxyError::Fetch(FetchError::Timeout { .. }) => "timeout",
            ProxyError::ClientRead(_) => "transfer_error",
            ProxyError::ClientReadTimeout(_) => "timeout",
            ProxyError::ClientWrite(_) => "transfer_error",
        }
    }
}
