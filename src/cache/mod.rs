//! Response caching subsystem.
//!
//! A single bounded LRU store shared by every connection handler. All
//! operations run under one serializing lock; see `lru.rs`.

pub mod lru;

pub use lru::ResponseCache;
