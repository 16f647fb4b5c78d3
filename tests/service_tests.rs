mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use armory::db::{CatalogError, CatalogRepository, SaveSummary};
use armory::domain::{SearchQuery, SearchResult};
use armory::models::Crate;
use armory::services::CatalogService;
use async_trait::async_trait;
use common::crate_item;
use sea_orm::DbErr;
use tokio::sync::Notify;

/// Serves a fixed crate list, counting searches; can be switched to fail.
#[derive(Default)]
struct ScriptedRepository {
    searches: AtomicUsize,
    failing: AtomicBool,
}

impl ScriptedRepository {
    fn check(&self) -> Result<(), CatalogError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CatalogError::Database(DbErr::Custom("store offline".to_string())));
        }
        Ok(())
    }

    fn items() -> Vec<Crate> {
        vec![crate_item("crate-1", "Chroma Case"), crate_item("crate-2", "Gamma Case")]
    }
}

#[async_trait]
impl CatalogRepository<Crate> for ScriptedRepository {
    async fn get_all(&self) -> Result<Vec<Crate>, CatalogError> {
        self.check()?;
        Ok(Self::items())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Crate>, CatalogError> {
        self.check()?;
        Ok(Self::items().into_iter().find(|c| c.id == id))
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResult<Crate>, CatalogError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let items = Self::items();
        Ok(SearchResult {
            total: items.len() as u64,
            items,
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn save_all(&self, items: &[Crate]) -> Result<SaveSummary, CatalogError> {
        self.check()?;
        Ok(SaveSummary {
            rows: items.len() as u64,
            ..SaveSummary::default()
        })
    }

    async fn delete_all(&self) -> Result<u64, CatalogError> {
        self.check()?;
        Ok(0)
    }

    async fn count(&self) -> Result<u64, CatalogError> {
        self.check()?;
        Ok(2)
    }
}

fn service(repository: &Arc<ScriptedRepository>) -> CatalogService<Crate> {
    CatalogService::<Crate>::with_ttl(repository.clone(), Duration::from_secs(600))
}

#[tokio::test]
async fn test_repeated_search_hits_cache() {
    let repository = Arc::new(ScriptedRepository::default());
    let service = service(&repository);

    let first = service.search(SearchQuery::new(Some("case"))).await;
    let second = service.search(SearchQuery::new(Some("case"))).await;

    assert_eq!(first, second);
    assert_eq!(repository.searches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_equivalent_queries_share_an_entry() {
    let repository = Arc::new(ScriptedRepository::default());
    let service = service(&repository);

    service.search(SearchQuery::new(Some("case"))).await;
    service.search(SearchQuery::new(Some("  case "))).await;
    service
        .search(SearchQuery::new(Some("case")).with_filter("team", "  "))
        .await;

    assert_eq!(repository.searches.load(Ordering::SeqCst), 1);
    assert_eq!(service.cached_entries().await, 1);

    service
        .search(SearchQuery::new(Some("case")).with_page(2, 20))
        .await;
    assert_eq!(repository.searches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_store_failure_degrades_without_caching() {
    let repository = Arc::new(ScriptedRepository::default());
    repository.failing.store(true, Ordering::SeqCst);
    let service = service(&repository);

    let query = SearchQuery::new(Some("case")).with_page(3, 15);
    let result = service.search(query.clone()).await;
    assert!(result.items.is_empty());
    assert_eq!(result.total, 0);
    assert_eq!(result.page, 3);
    assert_eq!(result.page_size, 15);
    assert_eq!(service.cached_entries().await, 0);

    assert!(service.get_all().await.is_empty());
    assert!(service.get_by_id("crate-1").await.is_none());
    assert!(service.count().await.is_err());

    repository.failing.store(false, Ordering::SeqCst);
    let recovered = service.search(query).await;
    assert_eq!(recovered.total, 2);
    assert_eq!(repository.searches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalidate_cache_forces_refetch() {
    let repository = Arc::new(ScriptedRepository::default());
    let service = service(&repository);

    service.search(SearchQuery::default()).await;
    service.invalidate_cache().await;
    assert_eq!(service.cached_entries().await, 0);

    service.search(SearchQuery::default()).await;
    assert_eq!(repository.searches.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_expired_entry_is_refetched() {
    let repository = Arc::new(ScriptedRepository::default());
    let service = CatalogService::<Crate>::with_ttl(repository.clone(), Duration::from_secs(5));

    service.search(SearchQuery::default()).await;
    tokio::time::advance(Duration::from_secs(6)).await;
    service.search(SearchQuery::default()).await;

    assert_eq!(repository.searches.load(Ordering::SeqCst), 2);
}

/// Reports the catalog version as `total`; the first search parks until
/// released so a sync can land while it is in flight.
#[derive(Default)]
struct VersionedRepository {
    version: AtomicU64,
    searches: AtomicUsize,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl CatalogRepository<Crate> for VersionedRepository {
    async fn get_all(&self) -> Result<Vec<Crate>, CatalogError> {
        Ok(Vec::new())
    }

    async fn get_by_id(&self, _id: &str) -> Result<Option<Crate>, CatalogError> {
        Ok(None)
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResult<Crate>, CatalogError> {
        let total = self.version.load(Ordering::SeqCst);
        if self.searches.fetch_add(1, Ordering::SeqCst) == 0 {
            self.entered.notify_one();
            self.release.notified().await;
        }
        Ok(SearchResult {
            items: Vec::new(),
            total,
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn save_all(&self, _items: &[Crate]) -> Result<SaveSummary, CatalogError> {
        Ok(SaveSummary::default())
    }

    async fn delete_all(&self) -> Result<u64, CatalogError> {
        Ok(0)
    }

    async fn count(&self) -> Result<u64, CatalogError> {
        Ok(self.version.load(Ordering::SeqCst))
    }
}

#[tokio::test]
async fn test_search_in_flight_during_invalidation_is_not_cached() {
    let repository = Arc::new(VersionedRepository::default());
    repository.version.store(1, Ordering::SeqCst);
    let service = Arc::new(CatalogService::<Crate>::with_ttl(
        repository.clone(),
        Duration::from_secs(600),
    ));

    let pending = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.search(SearchQuery::default()).await }
    });

    repository.entered.notified().await;
    repository.version.store(2, Ordering::SeqCst);
    service.invalidate_cache().await;
    repository.release.notify_one();

    let stale = pending.await.unwrap();
    assert_eq!(stale.total, 1);
    assert_eq!(service.cached_entries().await, 0);

    let after = service.search(SearchQuery::default()).await;
    assert_eq!(after.total, 2);
    assert_eq!(service.cached_entries().await, 1);
}
