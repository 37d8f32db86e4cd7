use std::{future::Future, sync::Arc, time::Duration};

use tokio::{sync::RwLock, time::Instant};
use tracing::debug;

struct Entry<T> {
    loaded_at: Instant,
    value: Arc<T>,
}

/// Single-slot cache whose value goes stale `ttl` after it was loaded.
pub struct TtlCache<T> {
    ttl: Duration,
    slot: RwLock<Option<Entry<T>>>,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    fn fresh(&self, entry: &Entry<T>) -> bool {
        entry.loaded_at.elapsed() < self.ttl
    }

    /// Returns the cached value, or runs `load` when it is missing or stale.
    /// Concurrent callers wait for one load instead of each running their own.
    /// Failed loads are not cached.
    pub async fn get_or_try_load<F, Fut, E>(&self, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        {
            let slot = self.slot.read().await;
            if let Some(entry) = slot.as_ref().filter(|e| self.fresh(e)) {
                return Ok(entry.value.clone());
            }
        }

        let mut slot = self.slot.write().await;
        // Double check: another caller may have loaded while we waited for the lock.
        if let Some(entry) = slot.as_ref().filter(|e| self.fresh(e)) {
            return Ok(entry.value.clone());
        }

        debug!("Cache miss, loading");
        let value = Arc::new(load().await?);
        *slot = Some(Entry {
            loaded_at: Instant::now(),
            value: value.clone(),
        });
        Ok(value)
    }

    pub async fn store(&self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        *self.slot.write().await = Some(Entry {
            loaded_at: Instant::now(),
            value: value.clone(),
        });
        value
    }

    pub async fn invalidate(&self) {
        self.slot.write().await.take();
    }

    pub async fn is_fresh(&self) -> bool {
        self.slot
            .read()
            .await
            .as_ref()
            .is_some_and(|e| self.fresh(e))
    }
}
