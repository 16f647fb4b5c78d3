#![allow(dead_code)]

use std::collections::HashSet;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use armory::clients::{CatalogSource, UpstreamError};
use armory::config::{Config, FetchFailurePolicy};
use armory::db::Store;
use armory::domain::ItemKind;
use armory::models::{Agent, CatalogSnapshot, Crate, Key, Skin};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// SQLite file in the system temp dir, unique per test and removed on drop.
pub struct TempDb {
    path: PathBuf,
}

impl TempDb {
    pub fn new() -> Self {
        Self {
            path: std::env::temp_dir().join(format!("armory-test-{}.db", uuid::Uuid::new_v4())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// A store whose database file lives as long as it does.
pub struct TestStore {
    pub store: Store,
    _db: TempDb,
}

impl Deref for TestStore {
    type Target = Store;

    fn deref(&self) -> &Store {
        &self.store
    }
}

pub async fn temp_store() -> TestStore {
    let db = TempDb::new();
    let store = Store::new(&db.url())
        .await
        .expect("Failed to open test store");
    TestStore { store, _db: db }
}

/// Config pointing at a fresh database; keep the guard alive for the test.
pub fn test_config(policy: FetchFailurePolicy) -> (Config, TempDb) {
    let db = TempDb::new();
    let mut config = Config::default();
    config.general.database_path = db.url();
    config.sync.sync_on_startup = false;
    config.sync.on_fetch_failure = policy;
    config.observability.metrics_enabled = false;
    (config, db)
}

pub fn skin(id: &str, name: &str, team: Option<&str>, crates: &[&str]) -> Skin {
    Skin {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        image: Some(format!("https://cdn.example.test/{id}.png")),
        crates: crates.iter().map(ToString::to_string).collect(),
        team: team.map(ToString::to_string),
    }
}

pub fn agent(id: &str, name: &str, team: &str) -> Agent {
    Agent {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        image: None,
        team: Some(team.to_string()),
    }
}

pub fn crate_item(id: &str, name: &str) -> Crate {
    Crate {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        image: None,
    }
}

pub fn key(id: &str, name: &str, crates: &[&str]) -> Key {
    Key {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        image: None,
        crates: crates.iter().map(ToString::to_string).collect(),
    }
}

/// Small catalog with links by id and by name.
pub fn sample_snapshot() -> CatalogSnapshot {
    CatalogSnapshot {
        skins: vec![
            skin("skin-1", "AK-47 | Redline", Some("Terrorists"), &["crate-1"]),
            skin("skin-2", "M4A4 | Howl", Some("Counter-Terrorists"), &["Huntsman Weapon Case"]),
            skin("skin-3", "AWP | Asiimov", Some("Both Teams"), &["crate-1", "crate-2"]),
        ],
        agents: vec![
            agent("agent-1", "Sir Bloody Darryl", "Terrorists"),
            agent("agent-2", "Special Agent Ava", "Counter-Terrorists"),
        ],
        crates: vec![
            crate_item("crate-1", "Chroma Case"),
            crate_item("crate-2", "Huntsman Weapon Case"),
        ],
        keys: vec![key("key-1", "Chroma Case Key", &["crate-1"])],
    }
}

/// In-memory catalog source with per-kind failure injection.
pub struct FakeSource {
    snapshot: Mutex<CatalogSnapshot>,
    failing: Mutex<HashSet<ItemKind>>,
    fetches: AtomicUsize,
}

impl FakeSource {
    pub fn new(snapshot: CatalogSnapshot) -> Arc<Self> {
        Arc::new(Self {
            snapshot: Mutex::new(snapshot),
            failing: Mutex::new(HashSet::new()),
            fetches: AtomicUsize::new(0),
        })
    }

    pub async fn set_snapshot(&self, snapshot: CatalogSnapshot) {
        *self.snapshot.lock().await = snapshot;
    }

    pub async fn fail(&self, kind: ItemKind) {
        self.failing.lock().await.insert(kind);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn check(&self, kind: ItemKind) -> Result<(), UpstreamError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().await.contains(&kind) {
            return Err(UpstreamError::Decode {
                kind,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for FakeSource {
    async fn fetch_skins(&self) -> Result<Vec<Skin>, UpstreamError> {
        self.check(ItemKind::Skin).await?;
        Ok(self.snapshot.lock().await.skins.clone())
    }

    async fn fetch_agents(&self) -> Result<Vec<Agent>, UpstreamError> {
        self.check(ItemKind::Agent).await?;
        Ok(self.snapshot.lock().await.agents.clone())
    }

    async fn fetch_crates(&self) -> Result<Vec<Crate>, UpstreamError> {
        self.check(ItemKind::Crate).await?;
        Ok(self.snapshot.lock().await.crates.clone())
    }

    async fn fetch_keys(&self) -> Result<Vec<Key>, UpstreamError> {
        self.check(ItemKind::Key).await?;
        Ok(self.snapshot.lock().await.keys.clone())
    }
}
