//! Proxy orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! Listener accept
//!     → server.rs (spawn one task per connection)
//!     → handler.rs (read → parse → cache → resolve → fetch → store → reply)
//!     → error.rs (failures logged once, socket closed without reply)
//! ```

pub mod error;
pub mod handler;
pub mod server;

pub use error::ProxyError;
pub use handler::{Handler, Served};
pub use server::ProxyServer;
