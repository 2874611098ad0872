//! Origin fetch subsystem.
//!
//! One fresh outbound connection per cache miss; responses are opaque bytes
//! read until the origin closes.

pub mod fetch;

pub use fetch::{fetch, FetchError};
