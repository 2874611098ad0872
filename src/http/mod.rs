//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → proxy/handler.rs (single bounded read)
//!     → request.rs (extract GET target, split host/path)
//!     → [dns + cache + upstream decide the bytes]
//!     → raw response relayed verbatim to the client
//! ```
//!
//! # Design Decisions
//! - One GET line is the whole protocol; headers are never interpreted
//! - Responses are opaque bytes, forwarded exactly as the origin sent them

pub mod request;

pub use request::{parse_request, ParseError, ParsedRequest};
