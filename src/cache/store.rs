use std::{sync::Arc, time::Duration};

use metrics::counter;
use tracing::debug;

use crate::domain::entities::NoteRecord;

use super::ALL_NOTES_KEY;
use super::backend::{CacheBackend, CacheError, MemoryCacheBackend};
use super::config::CacheConfig;

const SOURCE: &str = "cache::store";

/// Typed view over the aggregate slot.
///
/// Values go through the [`NoteRecord`] schema in both directions. A payload
/// that no longer parses is reported as [`CacheError::Corrupt`] instead of
/// being treated as a miss.
#[derive(Clone)]
pub struct AggregateCache {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
}

impl AggregateCache {
    pub fn new(backend: Arc<dyn CacheBackend>, config: &CacheConfig) -> Self {
        Self {
            backend,
            ttl: config.ttl,
        }
    }

    pub fn in_memory(config: &CacheConfig) -> Self {
        Self::new(Arc::new(MemoryCacheBackend::new()), config)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self) -> Result<Option<Vec<NoteRecord>>, CacheError> {
        let Some(payload) = self.backend.load().await? else {
            counter!("notes_cache_miss_total").increment(1);
            debug!(target_module = SOURCE, key = ALL_NOTES_KEY, "aggregate miss");
            return Ok(None);
        };

        let notes: Vec<NoteRecord> = serde_json::from_str(&payload).map_err(CacheError::Corrupt)?;
        counter!("notes_cache_hit_total").increment(1);
        debug!(
            target_module = SOURCE,
            key = ALL_NOTES_KEY,
            len = notes.len(),
            "aggregate hit"
        );
        Ok(Some(notes))
    }

    pub async fn set(&self, notes: &[NoteRecord]) -> Result<(), CacheError> {
        let payload = serde_json::to_string(notes).map_err(CacheError::Encode)?;
        self.backend.store(payload, self.ttl).await?;
        counter!("notes_cache_write_total").increment(1);
        debug!(
            target_module = SOURCE,
            key = ALL_NOTES_KEY,
            len = notes.len(),
            ttl_secs = self.ttl.as_secs(),
            "aggregate rewritten"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use uuid::Uuid;

    use super::*;

    fn note(title: &str) -> NoteRecord {
        NoteRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: format!("{title} body"),
            created_at: datetime!(2024-05-01 12:00 UTC),
            updated_at: datetime!(2024-05-01 12:00 UTC),
        }
    }

    #[tokio::test]
    async fn set_then_get_preserves_order() {
        let cache = AggregateCache::in_memory(&CacheConfig::default());
        let notes = vec![note("b"), note("a"), note("c")];

        cache.set(&notes).await.expect("set");

        assert_eq!(cache.get().await.expect("get"), Some(notes));
    }

    #[tokio::test]
    async fn empty_list_is_a_hit() {
        let cache = AggregateCache::in_memory(&CacheConfig::default());
        cache.set(&[]).await.expect("set");

        assert_eq!(cache.get().await.expect("get"), Some(Vec::new()));
    }

    #[tokio::test]
    async fn unparseable_payload_is_reported_as_corrupt() {
        let backend = Arc::new(MemoryCacheBackend::new());
        backend
            .store("{\"not\":\"a list\"}".to_string(), Duration::from_secs(60))
            .await
            .expect("store");
        let cache = AggregateCache::new(backend, &CacheConfig::default());

        let err = cache.get().await.expect_err("corrupt payload");
        assert!(matches!(err, CacheError::Corrupt(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn entry_disappears_after_configured_ttl() {
        let config = CacheConfig {
            ttl: Duration::from_secs(5),
        };
        let cache = AggregateCache::in_memory(&config);
        cache.set(&[note("a")]).await.expect("set");

        tokio::time::advance(Duration::from_secs(5)).await;

        assert_eq!(cache.get().await.expect("get"), None);
    }
}
