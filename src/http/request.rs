//! Minimal GET request-line parsing.
//!
//! The proxy understands exactly one shape of request: a line beginning with
//! `GET ` followed by a space-delimited absolute target. Nothing past the
//! target is inspected; headers, bodies, and every other method are out of
//! scope and rejected.

/// Error type for request parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The buffer does not contain a `GET <target>` request line.
    #[error("malformed request line")]
    MalformedRequest,
}

/// A parsed inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    /// The full target exactly as the client sent it; used as the cache key.
    pub url: String,
    /// Host portion of the target, scheme stripped.
    pub host: String,
    /// Path portion of the target, `/` when absent.
    pub path: String,
}

/// Extract the GET target from a raw request buffer and split it into host
/// and path.
///
/// The target is treated as an absolute URL: an optional `scheme://` prefix
/// is stripped, the host runs to the first `/`, and the path is everything
/// from that `/` on (defaulting to `/`). No further validation is performed.
pub fn parse_request(buffer: &[u8]) -> Result<ParsedRequest, ParseError> {
    let request = String::from_utf8_lossy(buffer);

    let after_method = request
        .find("GET ")
        .map(|pos| &request[pos + 4..])
        .ok_or(ParseError::MalformedRequest)?;

    let target_end = after_method
        .find(' ')
        .ok_or(ParseError::MalformedRequest)?;
    let url = &after_method[..target_end];
    if url.is_empty() {
        return Err(ParseError::MalformedRequest);
    }

    let without_scheme = match url.find("://") {
        Some(pos) => &url[pos + 3..],
        None => url,
    };

    let (host, path) = match without_scheme.find('/') {
        Some(pos) => (&without_scheme[..pos], &without_scheme[pos..]),
        None => (without_scheme, "/"),
    };

    Ok(ParsedRequest {
        url: url.to_string(),
        host: host.to_string(),
        path: path.to_string(),
    })
}
