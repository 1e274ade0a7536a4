//! Storage backends for the aggregate slot.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::{sync::RwLock, time::Instant};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cached aggregate could not be decoded")]
    Corrupt(#[source] serde_json::Error),
    #[error("aggregate could not be encoded for caching")]
    Encode(#[source] serde_json::Error),
}

/// A single expiring slot holding an opaque serialized payload.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the payload unless the slot is empty or has expired.
    async fn load(&self) -> Result<Option<String>, CacheError>;

    /// Replaces the payload and restarts its time-to-live.
    async fn store(&self, payload: String, ttl: Duration) -> Result<(), CacheError>;
}

struct Slot {
    payload: String,
    expires_at: Instant,
}

/// In-process backend. Ready as soon as it is constructed.
#[derive(Default)]
pub struct MemoryCacheBackend {
    slot: RwLock<Option<Slot>>,
}

impl MemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn load(&self) -> Result<Option<String>, CacheError> {
        let guard = self.slot.read().await;
        let payload = guard
            .as_ref()
            .filter(|slot| Instant::now() < slot.expires_at)
            .map(|slot| slot.payload.clone());
        Ok(payload)
    }

    async fn store(&self, payload: String, ttl: Duration) -> Result<(), CacheError> {
        let mut guard = self.slot.write().await;
        *guard = Some(Slot {
            payload,
            expires_at: Instant::now() + ttl,
        });
        Ok(())
    }
}
