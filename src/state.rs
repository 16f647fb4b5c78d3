use std::sync::Arc;
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::{error, info, warn};

use crate::clients::{CatalogApiClient, CatalogSource};
use crate::config::Config;
use crate::db::{CatalogError, CatalogRecord, Store};
use crate::domain::ItemKind;
use crate::services::{
    AgentService, CatalogService, CrateService, KeyService, SkinService, SyncError, SyncReport,
    SyncService,
};

/// Build the HTTP client used for upstream catalog fetches.
fn build_shared_http_client(config: &Config) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream.request_timeout_seconds))
        .user_agent(&config.upstream.user_agent)
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub skins: Arc<SkinService>,

    pub agents: Arc<AgentService>,

    pub crates: Arc<CrateService>,

    pub keys: Arc<KeyService>,

    pub sync: Arc<SyncService>,
}

impl SharedState {
    /// Opens the store and wires the upstream catalog client.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(&config)?;
        let source = CatalogApiClient::with_shared_client(http_client, &config.upstream.base_url);
        Self::with_source(config, Arc::new(source)).await
    }

    /// Same as [`SharedState::new`] with a caller-supplied catalog source.
    pub async fn with_source(
        config: Config,
        source: Arc<dyn CatalogSource>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let ttl = config.cache.ttl();
        let sync = Arc::new(SyncService::new(
            store.clone(),
            source,
            config.sync.on_fetch_failure,
        ));

        Ok(Self {
            skins: catalog_service(&store, ttl),
            agents: catalog_service(&store, ttl),
            crates: catalog_service(&store, ttl),
            keys: catalog_service(&store, ttl),
            sync,
            store,
            config: Arc::new(config),
        })
    }

    /// Runs a sync and, once it has committed, drops every cached search.
    pub async fn synchronize(&self) -> Result<SyncReport, SyncError> {
        let report = self.sync.synchronize().await?;
        self.invalidate_caches().await;
        Ok(report)
    }

    pub async fn invalidate_caches(&self) {
        tokio::join!(
            self.skins.invalidate_cache(),
            self.agents.invalidate_cache(),
            self.crates.invalidate_cache(),
            self.keys.invalidate_cache(),
        );
    }

    /// Row count per kind, in [`ItemKind::ALL`] order.
    pub async fn counts(&self) -> Result<Vec<(ItemKind, u64)>, CatalogError> {
        let mut counts = Vec::with_capacity(ItemKind::ALL.len());
        for kind in ItemKind::ALL {
            counts.push((kind, self.store.count(kind).await?));
        }
        Ok(counts)
    }

    /// Starts the initial sync in the background.
    ///
    /// A failed sync is logged and the process keeps serving whatever the
    /// store already holds. Aborting the returned handle cancels the sync,
    /// which rolls back its transaction.
    pub fn spawn_startup_sync(&self) -> AbortHandle {
        let state = self.clone();
        let task = tokio::spawn(async move {
            info!("Running startup catalog sync");
            if let Err(e) = state.synchronize().await {
                error!(error = %e, "Startup catalog sync failed");
            }
        });
        let abort = task.abort_handle();

        tokio::spawn(async move {
            match task.await {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => warn!("Startup catalog sync cancelled"),
                Err(e) => error!(error = %e, "Startup catalog sync panicked"),
            }
        });

        abort
    }
}

fn catalog_service<T: CatalogRecord>(store: &Store, ttl: Duration) -> Arc<CatalogService<T>> {
    Arc::new(CatalogService::with_ttl(Arc::new(store.catalog::<T>()), ttl))
}
