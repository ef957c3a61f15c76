//! Creates the `fx_users` table holding back-office accounts.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FxUsers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FxUsers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(FxUsers::Username).text().not_null())
                    .col(ColumnDef::new(FxUsers::Name).text().not_null())
                    .col(ColumnDef::new(FxUsers::PasswordHash).text().not_null())
                    .col(
                        ColumnDef::new(FxUsers::DataCriacao)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_fx_users_username")
                    .table(FxUsers::Table)
                    .col(FxUsers::Username)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FxUsers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FxUsers {
    Table,
    Id,
    Username,
    Name,
    PasswordHash,
    DataCriacao,
}
