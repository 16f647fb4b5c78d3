mod common;

use armory::config::FetchFailurePolicy;
use armory::db::CatalogRepository;
use armory::domain::{ItemKind, SearchQuery};
use armory::models::{Agent, CatalogSnapshot, Crate, Key, Skin};
use armory::services::SyncError;
use armory::state::SharedState;
use common::{FakeSource, TempDb, crate_item, key, sample_snapshot, skin, test_config};

async fn shared(
    policy: FetchFailurePolicy,
    source: std::sync::Arc<FakeSource>,
) -> (SharedState, TempDb) {
    let (config, db) = test_config(policy);
    let state = SharedState::with_source(config, source)
        .await
        .expect("Failed to build state");
    (state, db)
}

#[tokio::test]
async fn test_sync_replaces_catalog() {
    let source = FakeSource::new(sample_snapshot());
    let (state, _db) = shared(FetchFailurePolicy::Abort, source.clone()).await;

    let report = state.synchronize().await.unwrap();
    assert_eq!(report.skins, 3);
    assert_eq!(report.agents, 2);
    assert_eq!(report.crates, 2);
    assert_eq!(report.keys, 1);
    // skin-1, skin-2 (by name), skin-3 twice, key-1
    assert_eq!(report.links, 5);
    assert_eq!(report.skipped_links, 0);
    assert!(report.failed_kinds.is_empty());
    assert_eq!(source.fetches(), 4);

    source
        .set_snapshot(CatalogSnapshot {
            crates: vec![crate_item("crate-9", "Revolution Case")],
            skins: vec![skin("skin-9", "M4A1-S | Printstream", None, &["crate-9"])],
            ..CatalogSnapshot::default()
        })
        .await;
    let report = state.synchronize().await.unwrap();
    assert_eq!(report.skins, 1);

    let counts = state.counts().await.unwrap();
    assert_eq!(
        counts,
        vec![
            (ItemKind::Skin, 1),
            (ItemKind::Agent, 0),
            (ItemKind::Crate, 1),
            (ItemKind::Key, 0),
        ]
    );
    assert!(state.skins.get_by_id("skin-1").await.is_none());
    let fresh = state.skins.get_by_id("skin-9").await.unwrap();
    assert_eq!(fresh.crates, vec!["crate-9".to_string()]);
}

#[tokio::test]
async fn test_links_resolve_by_id_then_name() {
    let source = FakeSource::new(sample_snapshot());
    let (state, _db) = shared(FetchFailurePolicy::Abort, source).await;
    state.synchronize().await.unwrap();

    let howl = state.skins.get_by_id("skin-2").await.unwrap();
    assert_eq!(howl.crates, vec!["crate-2".to_string()]);

    let asiimov = state.skins.get_by_id("skin-3").await.unwrap();
    assert_eq!(asiimov.crates, vec!["crate-1".to_string(), "crate-2".to_string()]);

    let key = state.keys.get_by_id("key-1").await.unwrap();
    assert_eq!(key.crates, vec!["crate-1".to_string()]);
}

#[tokio::test]
async fn test_unresolved_links_are_skipped() {
    let mut snapshot = sample_snapshot();
    snapshot.keys = vec![key("key-1", "Mystery Key", &["Nonexistent Case", "crate-1"])];
    let source = FakeSource::new(snapshot);
    let (state, _db) = shared(FetchFailurePolicy::Abort, source).await;

    let report = state.synchronize().await.unwrap();
    assert_eq!(report.skipped_links, 1);

    let stored = state.keys.get_by_id("key-1").await.unwrap();
    assert_eq!(stored.crates, vec!["crate-1".to_string()]);
}

#[tokio::test]
async fn test_abort_policy_keeps_previous_catalog() {
    let source = FakeSource::new(sample_snapshot());
    let (state, _db) = shared(FetchFailurePolicy::Abort, source.clone()).await;
    state.synchronize().await.unwrap();

    source.set_snapshot(CatalogSnapshot::default()).await;
    source.fail(ItemKind::Agent).await;

    let err = state.synchronize().await.unwrap_err();
    assert!(matches!(err, SyncError::Upstream(ref e) if e.kind() == ItemKind::Agent));

    assert_eq!(state.store.catalog::<Skin>().count().await.unwrap(), 3);
    assert_eq!(state.store.catalog::<Agent>().count().await.unwrap(), 2);
    assert_eq!(state.store.catalog::<Crate>().count().await.unwrap(), 2);
    assert_eq!(state.store.catalog::<Key>().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_skip_policy_stores_failed_kind_empty() {
    let source = FakeSource::new(sample_snapshot());
    let (state, _db) = shared(FetchFailurePolicy::Skip, source.clone()).await;
    state.synchronize().await.unwrap();

    source.fail(ItemKind::Crate).await;
    let report = state.synchronize().await.unwrap();

    assert_eq!(report.failed_kinds, vec![ItemKind::Crate]);
    assert_eq!(report.crates, 0);
    assert_eq!(report.skins, 3);
    assert_eq!(report.links, 0);
    assert_eq!(report.skipped_links, 5);

    let skin = state.skins.get_by_id("skin-1").await.unwrap();
    assert!(skin.crates.is_empty());
}

#[tokio::test]
async fn test_duplicate_ids_keep_first() {
    let mut snapshot = sample_snapshot();
    snapshot.crates.push(crate_item("crate-1", "Duplicate Case"));
    let source = FakeSource::new(snapshot);
    let (state, _db) = shared(FetchFailurePolicy::Abort, source).await;

    let report = state.synchronize().await.unwrap();
    assert_eq!(report.duplicates_dropped, 1);
    assert_eq!(report.crates, 2);

    let stored = state.crates.get_by_id("crate-1").await.unwrap();
    assert_eq!(stored.name, "Chroma Case");
}

#[tokio::test]
async fn test_sync_invalidates_search_cache() {
    let source = FakeSource::new(sample_snapshot());
    let (state, _db) = shared(FetchFailurePolicy::Abort, source.clone()).await;
    state.synchronize().await.unwrap();

    let before = state.skins.search(SearchQuery::new(Some("ak-47"))).await;
    assert_eq!(before.total, 1);
    assert_eq!(state.skins.cached_entries().await, 1);

    source
        .set_snapshot(CatalogSnapshot {
            skins: vec![
                skin("skin-10", "AK-47 | Fire Serpent", None, &[]),
                skin("skin-11", "AK-47 | Bloodsport", None, &[]),
            ],
            ..CatalogSnapshot::default()
        })
        .await;
    state.synchronize().await.unwrap();
    assert_eq!(state.skins.cached_entries().await, 0);

    let after = state.skins.search(SearchQuery::new(Some("ak-47"))).await;
    assert_eq!(after.total, 2);
}

#[tokio::test]
async fn test_concurrent_syncs_both_complete() {
    let source = FakeSource::new(sample_snapshot());
    let (state, _db) = shared(FetchFailurePolicy::Abort, source.clone()).await;

    let (first, second) = tokio::join!(state.synchronize(), state.synchronize());
    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(source.fetches(), 8);
    assert_eq!(state.store.catalog::<Skin>().count().await.unwrap(), 3);
}
