//! Caching HTTP forward proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────┐
//!                    │                 FORWARD PROXY                  │
//!                    │                                                │
//!  Client ───────────┼─▶ net/listener ──▶ proxy/handler ──▶ http      │
//!  GET <url>         │   (bounded accept)  (state machine)  (parser)  │
//!                    │                          │                     │
//!                    │            ┌─────────────┼─────────────┐       │
//!                    │            ▼             ▼             ▼       │
//!                    │      cache (LRU)    dns (single-   upstream    │
//!                    │      get/put        flight cache)  (fetch) ────┼──▶ Origin :80
//!                    │                                                │
//!                    │   config · observability · lifecycle           │
//!                    └────────────────────────────────────────────────┘
//! ```
//!
//! A hit on the response cache replies without touching the network; a miss
//! resolves the host through the name cache, fetches the resource over a
//! fresh connection, stores the raw bytes, and relays them verbatim.

// Core subsystems
pub mod cache;
pub mod config;
pub mod dns;
pub mod http;
pub mod net;
pub mod proxy;
pub mod upstream;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ProxyConfig;
pub use lifecycle::Shutdown;
pub use net::Listener;
pub use proxy::ProxyServer;
