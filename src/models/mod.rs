mod items;

pub use items::{Agent, Crate, Key, Skin};

use crate::domain::ItemKind;

/// Capability shared by every catalog record.
pub trait GameItem {
    const KIND: ItemKind;

    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn description(&self) -> Option<&str>;
}

/// The full upstream catalog, one collection per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub skins: Vec<Skin>,
    pub agents: Vec<Agent>,
    pub crates: Vec<Crate>,
    pub keys: Vec<Key>,
}
