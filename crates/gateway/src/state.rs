//! Application state shared across handlers

use crate::middleware::rate_limit::{create_rate_limiter, GlobalRateLimiter};
use metrics_exporter_prometheus::PrometheusHandle;
use scholarmap_common::{config::AppConfig, DatasetStore, Snapshot};
use scholarmap_search::SearchIndex;
use std::sync::{Arc, RwLock};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<DatasetStore>,
    pub search: Arc<SearchCache>,
    pub limiter: Arc<GlobalRateLimiter>,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<DatasetStore>) -> Self {
        let limiter = create_rate_limiter(config.rate_limit.requests_per_second, config.rate_limit.burst);
        Self {
            config: Arc::new(config),
            store,
            search: Arc::new(SearchCache::default()),
            limiter,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Search index of the most recently queried snapshot.
///
/// Rebuilt lazily the first time a newer snapshot version is searched.
#[derive(Default)]
pub struct SearchCache {
    current: RwLock<Option<(u64, Arc<SearchIndex>)>>,
}

impl SearchCache {
    pub fn index_for(&self, snapshot: &Snapshot) -> Arc<SearchIndex> {
        let cached = match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        if let Some((version, index)) = cached {
            if version == snapshot.version {
                return index;
            }
        }

        let index = Arc::new(SearchIndex::build(&snapshot.model));
        let mut slot = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // A concurrent request may have cached a newer snapshot meanwhile
        if slot.as_ref().map_or(true, |(version, _)| *version < snapshot.version) {
            *slot = Some((snapshot.version, Arc::clone(&index)));
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholarmap_common::RecordModel;

    #[test]
    fn test_search_index_cached_per_version() {
        let store = DatasetStore::new();
        let cache = SearchCache::default();

        let first = cache.index_for(&store.snapshot());
        let again = cache.index_for(&store.snapshot());
        assert!(Arc::ptr_eq(&first, &again));

        let permit = store.begin_ingestion().unwrap();
        store.publish(permit, RecordModel::empty(), None);
        let rebuilt = cache.index_for(&store.snapshot());
        assert!(!Arc::ptr_eq(&first, &rebuilt));
    }
}
