pub mod catalog_service;
pub use catalog_service::{
    AgentService, CatalogService, CrateService, KeyService, SharedSearchCache, SkinService,
};

pub mod sync;
pub use sync::{SyncError, SyncReport, SyncService};
