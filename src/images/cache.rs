//! Per-property cache of organised images with time-based expiry.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

use super::organize::PropertyImages;

#[derive(Debug, Clone)]
struct CachedImages {
    images: PropertyImages,
    stored_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub ttl_seconds: u64,
}

#[derive(Clone)]
pub struct ImageCache {
    entries: Arc<RwLock<LruCache<Uuid, CachedImages>>>,
    ttl: Duration,
}

impl ImageCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(RwLock::new(LruCache::new(capacity))),
            ttl,
        }
    }

    /// Returns the cached images of `property_id` unless they have expired.
    pub async fn get(&self, property_id: &Uuid) -> Option<PropertyImages> {
        let mut cache = self.entries.write().await;
        let fresh = cache
            .get(property_id)
            .map(|entry| entry.stored_at.elapsed() < self.ttl)?;

        if fresh {
            cache.get(property_id).map(|entry| entry.images.clone())
        } else {
            cache.pop(property_id);
            None
        }
    }

    pub async fn put(&self, property_id: Uuid, images: PropertyImages) {
        let mut cache = self.entries.write().await;
        cache.put(
            property_id,
            CachedImages {
                images,
                stored_at: Instant::now(),
            },
        );
    }

    pub async fn invalidate(&self, property_id: &Uuid) {
        self.entries.write().await.pop(property_id);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        let cache = self.entries.read().await;
        CacheStats {
            entries: cache.len(),
            capacity: cache.cap().get(),
            ttl_seconds: self.ttl.as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images_with_card(url: &str) -> PropertyImages {
        PropertyImages {
            card: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn returns_fresh_entries_and_drops_invalidated_ones() {
        let cache = ImageCache::new(8, Duration::from_secs(300));
        let id = Uuid::new_v4();

        cache.put(id, images_with_card("a")).await;
        assert_eq!(cache.get(&id).await, Some(images_with_card("a")));

        cache.invalidate(&id).await;
        assert!(cache.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_evicted_on_read() {
        let cache = ImageCache::new(8, Duration::ZERO);
        let id = Uuid::new_v4();

        cache.put(id, images_with_card("a")).await;
        assert!(cache.get(&id).await.is_none());
        assert_eq!(cache.stats().await.entries, 0);
    }

    #[tokio::test]
    async fn capacity_bounds_entries() {
        let cache = ImageCache::new(2, Duration::from_secs(300));
        for _ in 0..3 {
            cache.put(Uuid::new_v4(), PropertyImages::default()).await;
        }

        let stats = cache.stats().await;
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.capacity, 2);

        cache.clear().await;
        assert_eq!(cache.stats().await.entries, 0);
    }
}
