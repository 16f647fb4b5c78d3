use sea_orm::entity::prelude::*;

/// Link between a skin or key and one of its crates.
///
/// `crate_id` has no foreign key; links are resolved against the crates
/// table when written and may dangle after crates are deleted on their own.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "crate_references")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub item_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub item_type: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub crate_id: String,
    /// Index of the crate in the item's upstream list.
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
