//! Per-kind mapping between catalog models and their tables.
//!
//! The catalog repository is written once against [`CatalogRecord`]; each
//! kind supplies its entity, the columns search reads, and the conversion
//! to and from rows.

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult,
    IntoActiveModel, ModelTrait, Set,
};

use crate::entities::{agents, crates, keys, skins};
use crate::models::{Agent, Crate, GameItem, Key, Skin};

pub trait CatalogRecord: GameItem + Clone + Send + Sync + 'static {
    type Entity: EntityTrait<Model = Self::Model, ActiveModel = Self::ActiveModel, Column = Self::Column>;
    type Model: ModelTrait<Entity = Self::Entity>
        + FromQueryResult
        + IntoActiveModel<Self::ActiveModel>
        + Send
        + Sync
        + 'static;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + 'static;
    type Column: ColumnTrait;

    const ID: Self::Column;
    const NAME: Self::Column;
    const DESCRIPTION: Self::Column;
    /// `None` for kinds without a team; the `team` filter is then ignored.
    const TEAM: Option<Self::Column>;

    fn from_model(model: Self::Model) -> Self;

    fn to_active_model(&self) -> Self::ActiveModel;

    /// Upstream crate references, in order. Empty for kinds without links.
    fn crate_refs(&self) -> &[String] {
        &[]
    }

    fn set_crates(&mut self, _crates: Vec<String>) {}
}

impl CatalogRecord for Skin {
    type Entity = skins::Entity;
    type Model = skins::Model;
    type ActiveModel = skins::ActiveModel;
    type Column = skins::Column;

    const ID: skins::Column = skins::Column::Id;
    const NAME: skins::Column = skins::Column::Name;
    const DESCRIPTION: skins::Column = skins::Column::Description;
    const TEAM: Option<skins::Column> = Some(skins::Column::Team);

    fn from_model(model: skins::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            image: model.image,
            crates: Vec::new(),
            team: model.team,
        }
    }

    fn to_active_model(&self) -> skins::ActiveModel {
        skins::ActiveModel {
            id: Set(self.id.clone()),
            name: Set(self.name.clone()),
            description: Set(self.description.clone()),
            image: Set(self.image.clone()),
            team: Set(self.team.clone()),
        }
    }

    fn crate_refs(&self) -> &[String] {
        &self.crates
    }

    fn set_crates(&mut self, crates: Vec<String>) {
        self.crates = crates;
    }
}

impl CatalogRecord for Agent {
    type Entity = agents::Entity;
    type Model = agents::Model;
    type ActiveModel = agents::ActiveModel;
    type Column = agents::Column;

    const ID: agents::Column = agents::Column::Id;
    const NAME: agents::Column = agents::Column::Name;
    const DESCRIPTION: agents::Column = agents::Column::Description;
    const TEAM: Option<agents::Column> = Some(agents::Column::Team);

    fn from_model(model: agents::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            image: model.image,
            team: model.team,
        }
    }

    fn to_active_model(&self) -> agents::ActiveModel {
        agents::ActiveModel {
            id: Set(self.id.clone()),
            name: Set(self.name.clone()),
            description: Set(self.description.clone()),
            image: Set(self.image.clone()),
            team: Set(self.team.clone()),
        }
    }
}

impl CatalogRecord for Crate {
    type Entity = crates::Entity;
    type Model = crates::Model;
    type ActiveModel = crates::ActiveModel;
    type Column = crates::Column;

    const ID: crates::Column = crates::Column::Id;
    const NAME: crates::Column = crates::Column::Name;
    const DESCRIPTION: crates::Column = crates::Column::Description;
    const TEAM: Option<crates::Column> = None;

    fn from_model(model: crates::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            image: model.image,
        }
    }

    fn to_active_model(&self) -> crates::ActiveModel {
        crates::ActiveModel {
            id: Set(self.id.clone()),
            name: Set(self.name.clone()),
            description: Set(self.description.clone()),
            image: Set(self.image.clone()),
        }
    }
}

impl CatalogRecord for Key {
    type Entity = keys::Entity;
    type Model = keys::Model;
    type ActiveModel = keys::ActiveModel;
    type Column = keys::Column;

    const ID: keys::Column = keys::Column::Id;
    const NAME: keys::Column = keys::Column::Name;
    const DESCRIPTION: keys::Column = keys::Column::Description;
    const TEAM: Option<keys::Column> = None;

    fn from_model(model: keys::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            image: model.image,
            crates: Vec::new(),
        }
    }

    fn to_active_model(&self) -> keys::ActiveModel {
        keys::ActiveModel {
            id: Set(self.id.clone()),
            name: Set(self.name.clone()),
            description: Set(self.description.clone()),
            image: Set(self.image.clone()),
        }
    }

    fn crate_refs(&self) -> &[String] {
        &self.crates
    }

    fn set_crates(&mut self, crates: Vec<String>) {
        self.crates = crates;
    }
}
