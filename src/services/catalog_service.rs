//! Read path for one catalog kind.
//!
//! [`CatalogService`] puts a [`SearchCache`] in front of a
//! [`CatalogRepository`] and contains store failures: callers get an empty
//! result and the failure is logged.

use std::sync::Arc;

use tracing::{debug, error};

use crate::cache::{InMemorySearchCache, SearchCache};
use crate::db::{CatalogError, CatalogRepository};
use crate::domain::{SearchQuery, SearchResult};
use crate::models::{Agent, Crate, GameItem, Key, Skin};

pub type SharedSearchCache<T> = Arc<dyn SearchCache<SearchQuery, SearchResult<T>>>;

pub struct CatalogService<T: Send + Sync + 'static> {
    repository: Arc<dyn CatalogRepository<T>>,
    cache: SharedSearchCache<T>,
}

pub type SkinService = CatalogService<Skin>;
pub type AgentService = CatalogService<Agent>;
pub type CrateService = CatalogService<Crate>;
pub type KeyService = CatalogService<Key>;

impl<T: Send + Sync + 'static> Clone for CatalogService<T> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<T> CatalogService<T>
where
    T: GameItem + Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(repository: Arc<dyn CatalogRepository<T>>, cache: SharedSearchCache<T>) -> Self {
        Self { repository, cache }
    }

    /// Builds a service with its own in-memory cache.
    #[must_use]
    pub fn with_ttl(repository: Arc<dyn CatalogRepository<T>>, ttl: std::time::Duration) -> Self {
        Self::new(repository, Arc::new(InMemorySearchCache::new(ttl)))
    }

    /// Every item of the kind; empty if the store fails.
    pub async fn get_all(&self) -> Vec<T> {
        match self.repository.get_all().await {
            Ok(items) => items,
            Err(e) => {
                Self::log_failure("get_all", &e);
                Vec::new()
            }
        }
    }

    /// `None` when absent or when the store fails.
    pub async fn get_by_id(&self, id: &str) -> Option<T> {
        match self.repository.get_by_id(id).await {
            Ok(item) => item,
            Err(e) => {
                Self::log_failure("get_by_id", &e);
                None
            }
        }
    }

    /// Cache-aside search.
    ///
    /// A miss queries the repository and caches the page under the
    /// normalized query, unless the cache was invalidated while the query
    /// ran. A store failure yields an empty page echoing the
    /// requested pagination, and nothing is cached.
    pub async fn search(&self, query: SearchQuery) -> SearchResult<T> {
        let query = query.normalized();
        let kind = T::KIND.as_str();

        if let Some(hit) = self.cache.get(&query).await {
            metrics::counter!("catalog_cache_hits_total", "kind" => kind).increment(1);
            debug!(kind, page = query.page, "Search cache hit");
            return hit;
        }
        metrics::counter!("catalog_cache_misses_total", "kind" => kind).increment(1);

        // Read before querying so a sync committed meanwhile voids the put.
        let generation = self.cache.generation().await;
        match self.repository.search(&query).await {
            Ok(result) => {
                if !self
                    .cache
                    .put_if_generation(query, result.clone(), generation)
                    .await
                {
                    debug!(kind, "Cache invalidated during search, result not cached");
                }
                result
            }
            Err(e) => {
                Self::log_failure("search", &e);
                SearchResult::empty(&query)
            }
        }
    }

    pub async fn invalidate_cache(&self) {
        self.cache.invalidate_all().await;
    }

    pub async fn cached_entries(&self) -> usize {
        self.cache.len().await
    }

    pub async fn count(&self) -> Result<u64, CatalogError> {
        self.repository.count().await
    }

    fn log_failure(operation: &str, err: &CatalogError) {
        error!(
            kind = T::KIND.as_str(),
            operation,
            error = %err,
            "Catalog lookup failed"
        );
    }
}
