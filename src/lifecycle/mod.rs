//! Process lifecycle subsystem.
//!
//! Startup is owned by `main`; this module coordinates the other end:
//! signals translate into a broadcast shutdown event, the accept loop stops,
//! and active connections drain within the configured grace period.

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::watch_signals;
