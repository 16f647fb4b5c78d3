use serde::{Deserialize, Serialize};

use super::GameItem;
use crate::domain::ItemKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skin {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Crate ids in upstream order.
    #[serde(default)]
    pub crates: Vec<String>,
    pub team: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub team: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crate {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub crates: Vec<String>,
}

macro_rules! impl_game_item {
    ($ty:ty, $kind:expr) => {
        impl GameItem for $ty {
            const KIND: ItemKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn description(&self) -> Option<&str> {
                self.description.as_deref()
            }
        }
    };
}

impl_game_item!(Skin, ItemKind::Skin);
impl_game_item!(Agent, ItemKind::Agent);
impl_game_item!(Crate, ItemKind::Crate);
impl_game_item!(Key, ItemKind::Key);
