//! Full catalog synchronization.
//!
//! A sync fetches all four kinds concurrently, then swaps the stored catalog
//! for the fetched one inside a single transaction. Only one sync runs at a
//! time.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::clients::{CatalogSource, UpstreamError};
use crate::config::FetchFailurePolicy;
use crate::db::{CatalogError, Store};
use crate::domain::ItemKind;
use crate::models::{CatalogSnapshot, GameItem};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Upstream fetch failed: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Catalog store failed: {0}")]
    Store(#[from] CatalogError),
}

/// Outcome of one successful sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub skins: u64,
    pub agents: u64,
    pub crates: u64,
    pub keys: u64,
    pub links: u64,
    /// Crate references that matched no fetched crate.
    pub skipped_links: u64,
    /// Kinds that failed to fetch and were stored empty.
    pub failed_kinds: Vec<ItemKind>,
    pub duplicates_dropped: u64,
    pub duration_ms: u64,
    pub finished_at: DateTime<Utc>,
}

pub struct SyncService {
    store: Store,
    source: Arc<dyn CatalogSource>,
    policy: FetchFailurePolicy,
    running: Mutex<()>,
}

impl SyncService {
    #[must_use]
    pub fn new(store: Store, source: Arc<dyn CatalogSource>, policy: FetchFailurePolicy) -> Self {
        Self {
            store,
            source,
            policy,
            running: Mutex::new(()),
        }
    }

    /// Replaces the stored catalog with a fresh upstream copy.
    ///
    /// Concurrent calls queue behind the one in progress. On error the store
    /// keeps its previous contents.
    #[instrument(skip(self), fields(policy = ?self.policy))]
    pub async fn synchronize(&self) -> Result<SyncReport, SyncError> {
        let _running = self.running.lock().await;
        let started = Instant::now();
        info!(event = "catalog_sync_started", "Starting catalog synchronization");

        let result = self.run(started).await;

        let outcome = if result.is_ok() { "success" } else { "failure" };
        metrics::counter!("catalog_sync_runs_total", "outcome" => outcome).increment(1);
        metrics::histogram!("catalog_sync_duration_seconds").record(started.elapsed().as_secs_f64());

        match &result {
            Ok(report) => info!(
                event = "catalog_sync_finished",
                skins = report.skins,
                agents = report.agents,
                crates = report.crates,
                keys = report.keys,
                links = report.links,
                skipped_links = report.skipped_links,
                duration_ms = report.duration_ms,
                "Catalog synchronization completed"
            ),
            Err(e) => error!(
                event = "catalog_sync_failed",
                error = %e,
                "Catalog synchronization failed"
            ),
        }

        result
    }

    async fn run(&self, started: Instant) -> Result<SyncReport, SyncError> {
        let (skins, agents, crates, keys) = tokio::join!(
            self.source.fetch_skins(),
            self.source.fetch_agents(),
            self.source.fetch_crates(),
            self.source.fetch_keys(),
        );

        let mut failed_kinds = Vec::new();
        let skins = self.settle(skins, &mut failed_kinds)?;
        let agents = self.settle(agents, &mut failed_kinds)?;
        let crates = self.settle(crates, &mut failed_kinds)?;
        let keys = self.settle(keys, &mut failed_kinds)?;

        let mut duplicates_dropped = 0;
        let snapshot = CatalogSnapshot {
            skins: dedupe_by_id(skins, &mut duplicates_dropped),
            agents: dedupe_by_id(agents, &mut duplicates_dropped),
            crates: dedupe_by_id(crates, &mut duplicates_dropped),
            keys: dedupe_by_id(keys, &mut duplicates_dropped),
        };

        let summary = self.store.replace_catalog(&snapshot).await?;

        Ok(SyncReport {
            skins: summary.skins,
            agents: summary.agents,
            crates: summary.crates,
            keys: summary.keys,
            links: summary.links.linked,
            skipped_links: summary.links.skipped,
            failed_kinds,
            duplicates_dropped,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            finished_at: Utc::now(),
        })
    }

    /// Applies the failure policy to one fetch result.
    fn settle<T>(
        &self,
        fetched: Result<Vec<T>, UpstreamError>,
        failed_kinds: &mut Vec<ItemKind>,
    ) -> Result<Vec<T>, UpstreamError> {
        match (fetched, self.policy) {
            (Ok(items), _) => Ok(items),
            (Err(e), FetchFailurePolicy::Abort) => Err(e),
            (Err(e), FetchFailurePolicy::Skip) => {
                warn!(kind = e.kind().as_str(), error = %e, "Fetch failed, storing kind as empty");
                failed_kinds.push(e.kind());
                Ok(Vec::new())
            }
        }
    }
}

/// Keeps the first record for each id.
fn dedupe_by_id<T: GameItem>(items: Vec<T>, dropped: &mut u64) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    let before = items.len();
    let kept: Vec<T> = items
        .into_iter()
        .filter(|item| seen.insert(item.id().to_string()))
        .collect();

    let removed = (before - kept.len()) as u64;
    if removed > 0 {
        warn!(kind = T::KIND.as_str(), removed, "Dropped duplicate upstream ids");
        *dropped += removed;
    }
    kept
}
