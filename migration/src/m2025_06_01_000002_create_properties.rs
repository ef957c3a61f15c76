//! Creates the `fx_properties` table with the listing attributes shown on the
//! public site and edited from the back office.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FxProperties::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FxProperties::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FxProperties::Titulo).text().not_null())
                    .col(ColumnDef::new(FxProperties::Slug).text().not_null())
                    .col(ColumnDef::new(FxProperties::TituloDescricao).text().not_null())
                    .col(ColumnDef::new(FxProperties::Descricao).text().null())
                    .col(
                        ColumnDef::new(FxProperties::Valor)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(FxProperties::ValorCondominio).double().null())
                    .col(ColumnDef::new(FxProperties::Bairro).text().not_null())
                    .col(
                        ColumnDef::new(FxProperties::Cidade)
                            .text()
                            .not_null()
                            .default("São Paulo"),
                    )
                    .col(
                        ColumnDef::new(FxProperties::Estado)
                            .text()
                            .not_null()
                            .default("SP"),
                    )
                    .col(ColumnDef::new(FxProperties::Endereco).text().null())
                    .col(ColumnDef::new(FxProperties::TextoLocalizacao).text().null())
                    .col(ColumnDef::new(FxProperties::AreaTexto).text().not_null())
                    .col(
                        ColumnDef::new(FxProperties::AreasDisponiveis)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FxProperties::StatusEmpreendimento)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(FxProperties::TipoImovel).json_binary().not_null())
                    .col(
                        ColumnDef::new(FxProperties::Caracteristicas)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FxProperties::Quartos).json_binary().not_null())
                    .col(ColumnDef::new(FxProperties::Banheiros).json_binary().not_null())
                    .col(ColumnDef::new(FxProperties::Vagas).json_binary().not_null())
                    .col(
                        ColumnDef::new(FxProperties::Destaque)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(FxProperties::Home)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(FxProperties::Ordem)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(FxProperties::IframeMapa).text().not_null())
                    .col(ColumnDef::new(FxProperties::VideoUrl).text().null())
                    .col(ColumnDef::new(FxProperties::ResponsavelCriacao).text().null())
                    .col(
                        ColumnDef::new(FxProperties::ResponsavelAtualizacao)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(FxProperties::DataCriacao)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(FxProperties::DataAtualizacao)
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
                    .name("idx_fx_properties_slug")
                    .table(FxProperties::Table)
                    .col(FxProperties::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_fx_properties_data_criacao")
                    .table(FxProperties::Table)
                    .col(FxProperties::DataCriacao)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_fx_properties_data_criacao").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_fx_properties_slug").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FxProperties::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FxProperties {
    Table,
    Id,
    Titulo,
    Slug,
    TituloDescricao,
    Descricao,
    Valor,
    ValorCondominio,
    Bairro,
    Cidade,
    Estado,
    Endereco,
    TextoLocalizacao,
    AreaTexto,
    AreasDisponiveis,
    StatusEmpreendimento,
    TipoImovel,
    Caracteristicas,
    Quartos,
    Banheiros,
    Vagas,
    Destaque,
    Home,
    Ordem,
    IframeMapa,
    VideoUrl,
    ResponsavelCriacao,
    ResponsavelAtualizacao,
    DataCriacao,
    DataAtualizacao,
}
