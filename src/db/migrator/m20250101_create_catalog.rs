use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Skins::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Skins::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Skins::Name).string().not_null())
                    .col(ColumnDef::new(Skins::Description).text())
                    .col(ColumnDef::new(Skins::Image).text())
                    .col(ColumnDef::new(Skins::Team).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Agents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Agents::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Agents::Name).string().not_null())
                    .col(ColumnDef::new(Agents::Description).text())
                    .col(ColumnDef::new(Agents::Image).text())
                    .col(ColumnDef::new(Agents::Team).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Crates::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Crates::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Crates::Name).string().not_null())
                    .col(ColumnDef::new(Crates::Description).text())
                    .col(ColumnDef::new(Crates::Image).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Keys::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Keys::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Keys::Name).string().not_null())
                    .col(ColumnDef::new(Keys::Description).text())
                    .col(ColumnDef::new(Keys::Image).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CrateReferences::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CrateReferences::ItemId).string().not_null())
                    .col(ColumnDef::new(CrateReferences::ItemType).string().not_null())
                    .col(ColumnDef::new(CrateReferences::CrateId).string().not_null())
                    .col(
                        ColumnDef::new(CrateReferences::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .col(CrateReferences::ItemId)
                            .col(CrateReferences::ItemType)
                            .col(CrateReferences::CrateId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_crate_references_crate_id")
                    .table(CrateReferences::Table)
                    .col(CrateReferences::CrateId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_crate_references_item_type")
                    .table(CrateReferences::Table)
                    .col(CrateReferences::ItemType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CrateReferences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Keys::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Crates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Agents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Skins::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Skins {
    Table,
    Id,
    Name,
    Description,
    Image,
    Team,
}

#[derive(DeriveIden)]
enum Agents {
    Table,
    Id,
    Name,
    Description,
    Image,
    Team,
}

#[derive(DeriveIden)]
enum Crates {
    Table,
    Id,
    Name,
    Description,
    Image,
}

#[derive(DeriveIden)]
enum Keys {
    Table,
    Id,
    Name,
    Description,
    Image,
}

#[derive(DeriveIden)]
enum CrateReferences {
    Table,
    ItemId,
    ItemType,
    CrateId,
    Position,
}
