//! Enumeration cache
//!
//! Maps an enumeration category (`position`, `languages`, ...) to its set of
//! valid values. Entries are filled lazily from a [`MasterDataSource`] and
//! expire after a fixed time-to-live; there is no explicit invalidation.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache;

/// Store holding the master list of values per category
#[async_trait]
pub trait MasterDataSource: Send + Sync {
    async fn values_for(&self, category: &str) -> Result<Vec<String>>;
}

/// Category -> valid values lookup used by the row extractor
#[async_trait]
pub trait EnumLookup: Send + Sync {
    async fn get(&self, category: &str) -> Arc<HashSet<String>>;
}

/// TTL cache in front of a master-data source
pub struct CachedEnumLookup {
    source: Arc<dyn MasterDataSource>,
    cache: Cache<String, Arc<HashSet<String>>>,
}

impl CachedEnumLookup {
    pub fn new(source: Arc<dyn MasterDataSource>, ttl: Duration) -> Self {
        let cache = Cache::builder().time_to_live(ttl).build();
        Self { source, cache }
    }
}

#[async_trait]
impl EnumLookup for CachedEnumLookup {
    /// A failing source yields an empty set, which is not cached so the next
    /// row retries the lookup
    async fn get(&self, category: &str) -> Arc<HashSet<String>> {
        if let Some(values) = self.cache.get(category).await {
            return values;
        }

        log::debug!("Enumeration cache miss for '{}'", category);
        match self.source.values_for(category).await {
            Ok(values) => {
                let values: Arc<HashSet<String>> = Arc::new(values.into_iter().collect());
                log::info!(
                    "Cached {} value(s) for enumeration '{}'",
                    values.len(),
                    category
                );
                self.cache.insert(category.to_string(), values.clone()).await;
                values
            }
            Err(e) => {
                log::error!("Failed to load enumeration '{}': {:#}", category, e);
                Arc::new(HashSet::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl MasterDataSource for CountingSource {
        async fn values_for(&self, category: &str) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                bail!("master data unavailable");
            }
            Ok(vec![format!("{}-a", category), format!("{}-b", category)])
        }
    }

    #[tokio::test]
    async fn test_fills_once_per_category() {
        let source = CountingSource::new(false);
        let lookup = CachedEnumLookup::new(source.clone(), Duration::from_secs(60));

        let first = lookup.get("position").await;
        let second = lookup.get("position").await;
        assert!(first.contains("position-a"));
        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        let languages = lookup.get("languages").await;
        assert!(languages.contains("languages-b"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_source_failure_is_empty_and_not_cached() {
        let source = CountingSource::new(true);
        let lookup = CachedEnumLookup::new(source.clone(), Duration::from_secs(60));

        assert!(lookup.get("position").await.is_empty());
        assert!(lookup.get("position").await.is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let source = CountingSource::new(false);
        let lookup = CachedEnumLookup::new(source.clone(), Duration::from_millis(50));

        lookup.get("position").await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        lookup.get("position").await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
