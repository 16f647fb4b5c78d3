use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement, TransactionTrait,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::ItemKind;
use crate::models::{Agent, CatalogSnapshot, Crate, Key, Skin};

pub mod migrator;
pub mod repositories;

pub use repositories::catalog::{
    CatalogError, CatalogRepository, SaveSummary, SeaOrmCatalogRepository,
};
pub use repositories::crate_links::LinkStats;
pub use repositories::records::CatalogRecord;

use repositories::catalog::{delete_all_on, insert_all_on};

/// Row counts written by one catalog replace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    pub skins: u64,
    pub agents: u64,
    pub crates: u64,
    pub keys: u64,
    pub links: LinkStats,
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn catalog<T>(&self) -> SeaOrmCatalogRepository<T> {
        SeaOrmCatalogRepository::new(self.conn.clone())
    }

    pub async fn count(&self, kind: ItemKind) -> Result<u64, CatalogError> {
        match kind {
            ItemKind::Skin => self.catalog::<Skin>().count().await,
            ItemKind::Agent => self.catalog::<Agent>().count().await,
            ItemKind::Crate => self.catalog::<Crate>().count().await,
            ItemKind::Key => self.catalog::<Key>().count().await,
        }
    }

    /// Replaces the whole catalog in one transaction.
    ///
    /// Rows are deleted skins, keys, agents, crates and inserted crates,
    /// skins, agents, keys, so crate links resolve against the new crates.
    /// On any error the transaction is rolled back when dropped and the
    /// previous catalog stays in place.
    pub async fn replace_catalog(
        &self,
        snapshot: &CatalogSnapshot,
    ) -> Result<ReplaceSummary, CatalogError> {
        let txn = self.conn.begin().await?;

        delete_all_on::<Skin, _>(&txn).await?;
        delete_all_on::<Key, _>(&txn).await?;
        delete_all_on::<Agent, _>(&txn).await?;
        delete_all_on::<Crate, _>(&txn).await?;

        let crates = insert_all_on(&txn, &snapshot.crates).await?;
        let skins = insert_all_on(&txn, &snapshot.skins).await?;
        let agents = insert_all_on(&txn, &snapshot.agents).await?;
        let keys = insert_all_on(&txn, &snapshot.keys).await?;

        txn.commit().await?;

        let mut links = skins.links;
        links.merge(keys.links);

        Ok(ReplaceSummary {
            skins: skins.rows,
            agents: agents.rows,
            crates: crates.rows,
            keys: keys.rows,
            links,
        })
    }
}
