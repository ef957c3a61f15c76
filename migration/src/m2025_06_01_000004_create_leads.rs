//! Creates the `fx_leads` table for contact-form submissions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FxLeads::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FxLeads::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(FxLeads::Nome).text().null())
                    .col(ColumnDef::new(FxLeads::Email).text().null())
                    .col(ColumnDef::new(FxLeads::Telefone).text().null())
                    .col(ColumnDef::new(FxLeads::Mensagem).text().null())
                    .col(ColumnDef::new(FxLeads::Assunto).text().null())
                    .col(ColumnDef::new(FxLeads::PaginaOrigem).text().null())
                    .col(ColumnDef::new(FxLeads::ImovelId).uuid().null())
                    .col(
                        ColumnDef::new(FxLeads::Status)
                            .text()
                            .not_null()
                            .default("Novo"),
                    )
                    .col(
                        ColumnDef::new(FxLeads::DataCriacao)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(FxLeads::DataAtualizacao)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fx_leads_imovel_id")
                            .from(FxLeads::Table, FxLeads::ImovelId)
                            .to(FxProperties::Table, FxProperties::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_fx_leads_status_data_criacao")
                    .table(FxLeads::Table)
                    .col(FxLeads::Status)
                    .col(FxLeads::DataCriacao)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_fx_leads_status_data_criacao")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(FxLeads::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FxLeads {
    Table,
    Id,
    Nome,
    Email,
    Telefone,
    Mensagem,
    Assunto,
    PaginaOrigem,
    ImovelId,
    Status,
    DataCriacao,
    DataAtualizacao,
}

#[derive(DeriveIden)]
enum FxProperties {
    Table,
    Id,
}
