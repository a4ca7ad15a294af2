//! Time-boxed catalog cache.
//!
//! Entries are keyed by the literal source identifier. Two identifiers that
//! happen to serve the same document are still two entries. The lock only
//! guards the entry table; fetching and parsing happen outside it, so a slow
//! fetch never blocks readers of other sources.

use crate::catalog::fetch::CatalogFetcher;
use crate::catalog::index::Catalog;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct CacheEntry {
    catalog: Arc<Catalog>,
    loaded_at: Instant,
}

/// Loads catalogs through a `CatalogFetcher` and remembers them for a TTL.
pub struct CatalogCache {
    fetcher: Arc<dyn CatalogFetcher>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl CatalogCache {
    pub fn new(fetcher: Arc<dyn CatalogFetcher>) -> Self {
        Self {
            fetcher,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch and parse `source`, bypassing the cache entirely.
    pub async fn load(&self, source: &str) -> Result<Arc<Catalog>> {
        let raw = self
            .fetcher
            .fetch(source)
            .await
            .with_context(|| format!("fetching catalog source '{source}'"))?;
        let catalog = Catalog::from_json_str(&raw)
            .with_context(|| format!("parsing catalog source '{source}'"))?;
        tracing::info!(
            source,
            version = catalog.version(),
            components = catalog.len(),
            "loaded component catalog"
        );
        Ok(Arc::new(catalog))
    }

    /// Return the cached catalog for `source` if it is younger than `ttl`,
    /// otherwise load it and store it with a fresh timestamp.
    ///
    /// A zero `ttl` disables caching: every call loads and nothing is stored.
    /// A failed load leaves any existing entry untouched.
    pub async fn load_cached(&self, source: &str, ttl: Duration) -> Result<Arc<Catalog>> {
        if ttl.is_zero() {
            return self.load(source).await;
        }

        {
            let entries = self.entries.lock().await;
            if let Some(entry) = entries.get(source) {
                if entry.loaded_at.elapsed() < ttl {
                    tracing::debug!(source, "catalog cache hit");
                    return Ok(Arc::clone(&entry.catalog));
                }
                tracing::debug!(source, "catalog cache entry expired");
            }
        }

        let catalog = self.load(source).await?;
        let mut entries = self.entries.lock().await;
        entries.insert(
            source.to_string(),
            CacheEntry {
                catalog: Arc::clone(&catalog),
                loaded_at: Instant::now(),
            },
        );
        Ok(catalog)
    }

    /// Drop the entry for `source`, or every entry when `None`.
    pub async fn invalidate(&self, source: Option<&str>) {
        let mut entries = self.entries.lock().await;
        match source {
            Some(source) => {
                entries.remove(source);
            }
            None => entries.clear(),
        }
    }

    /// Number of cached sources, expired entries included.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fetch::MemoryFetcher;

    const DOC: &str = r#"{"version":"v1","components":[{"id":"Card","renderPath":"cards/card"}]}"#;

    #[tokio::test(start_paused = true)]
    async fn failed_reload_keeps_previous_entry() -> Result<()> {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.insert("mem://ui", DOC);
        let cache = CatalogCache::new(fetcher.clone());
        let ttl = Duration::from_secs(60);
        let first = cache.load_cached("mem://ui", ttl).await?;

        fetcher.insert("mem://ui", "{not json");
        tokio::time::advance(ttl).await;
        assert!(cache.load_cached("mem://ui", ttl).await.is_err());
        assert_eq!(cache.len().await, 1);

        fetcher.insert("mem://ui", DOC);
        let second = cache.load_cached("mem://ui", ttl).await?;
        assert!(!Arc::ptr_eq(&first, &second));
        Ok(())
    }
}
