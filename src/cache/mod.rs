//! Aggregate note cache.
//!
//! A single slot, keyed [`ALL_NOTES_KEY`], holding the whole note collection
//! as one serialized list with a fixed time-to-live:
//!
//! - **Absent**: nothing stored, or the last write is older than the TTL
//! - **Present**: the list written by the most recent rewrite
//!
//! There is no partial-update primitive. Callers read the full list, edit it
//! in memory and write it back, which resets the TTL.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! ttl_seconds = 60
//! ```

mod backend;
mod config;
mod store;

pub use backend::{CacheBackend, CacheError, MemoryCacheBackend};
pub use config::CacheConfig;
pub use store::AggregateCache;

/// Logical key of the one cached aggregate.
pub const ALL_NOTES_KEY: &str = "all_notes";
