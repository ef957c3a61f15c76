//! Creates the `fx_property_images` table: one row per stored object
//! (card, capa or gallery image) attached to a property.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FxPropertyImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FxPropertyImages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FxPropertyImages::ImovelId).uuid().not_null())
                    .col(ColumnDef::new(FxPropertyImages::Url).text().not_null())
                    .col(ColumnDef::new(FxPropertyImages::Tipo).text().not_null())
                    .col(
                        ColumnDef::new(FxPropertyImages::Ordem)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(FxPropertyImages::NomeGaleria).text().null())
                    .col(
                        ColumnDef::new(FxPropertyImages::DataCriacao)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fx_property_images_imovel_id")
                            .from(FxPropertyImages::Table, FxPropertyImages::ImovelId)
                            .to(FxProperties::Table, FxProperties::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_fx_property_images_imovel_tipo")
                    .table(FxPropertyImages::Table)
                    .col(FxPropertyImages::ImovelId)
                    .col(FxPropertyImages::Tipo)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_fx_property_images_imovel_tipo")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(FxPropertyImages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FxPropertyImages {
    Table,
    Id,
    ImovelId,
    Url,
    Tipo,
    Ordem,
    NomeGaleria,
    DataCriacao,
}

#[derive(DeriveIden)]
enum FxProperties {
    Table,
    Id,
}
