//! # Property Repository
//!
//! Listing reads for the public site and CRUD for the back office.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::error::{RepositoryError, is_unique_violation};
use crate::models::property::{
    ActiveModel as PropertyActiveModel, Column, Entity as Property, Model as PropertyModel,
};
use crate::models::{AreaList, PropertyImage, TagList, property_image};
use crate::properties::{DEFAULT_CITY, DEFAULT_STATE, PropertyForm};
use crate::repositories::lower_contains;

pub const HOME_FETCH_LIMIT: u64 = 20;
pub const FEATURED_LIMIT: u64 = 10;
pub const RELATED_FETCH_LIMIT: u64 = 10;

pub struct PropertyRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PropertyRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PropertyModel>, RepositoryError> {
        Property::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<PropertyModel>, RepositoryError> {
        Property::find()
            .filter(Column::Slug.eq(slug))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Back-office list, newest first, optionally filtered by a
    /// case-insensitive term over title, city, stage and address.
    pub async fn list_admin(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<PropertyModel>, RepositoryError> {
        let mut query = Property::find().order_by_desc(Column::DataCriacao);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(lower_contains(Column::Titulo, term))
                    .add(lower_contains(Column::Cidade, term))
                    .add(lower_contains(Column::StatusEmpreendimento, term))
                    .add(lower_contains(Column::Endereco, term)),
            );
        }

        query
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Public listing order.
    pub async fn list_public(&self) -> Result<Vec<PropertyModel>, RepositoryError> {
        Property::find()
            .order_by_asc(Column::Ordem)
            .order_by_desc(Column::DataCriacao)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn home_feed(&self) -> Result<Vec<PropertyModel>, RepositoryError> {
        Property::find()
            .filter(Column::Home.eq(true))
            .order_by_desc(Column::DataCriacao)
            .limit(HOME_FETCH_LIMIT)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn featured(&self) -> Result<Vec<PropertyModel>, RepositoryError> {
        Property::find()
            .filter(Column::Destaque.eq(true))
            .order_by_desc(Column::DataCriacao)
            .limit(FEATURED_LIMIT)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Home or featured listings other than `exclude`, newest first.
    pub async fn related(&self, exclude: Uuid) -> Result<Vec<PropertyModel>, RepositoryError> {
        Property::find()
            .filter(
                Condition::any()
                    .add(Column::Home.eq(true))
                    .add(Column::Destaque.eq(true)),
            )
            .filter(Column::Id.ne(exclude))
            .order_by_desc(Column::DataCriacao)
            .limit(RELATED_FETCH_LIMIT)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Inserts a normalised form. `author` is recorded as both creator and
    /// last editor.
    pub async fn create(
        &self,
        form: PropertyForm,
        author: Option<&str>,
    ) -> Result<PropertyModel, RepositoryError> {
        let now = Utc::now();
        let slug = form.slug.clone();

        let mut property = PropertyActiveModel {
            id: Set(Uuid::new_v4()),
            responsavel_criacao: Set(author.map(str::to_string)),
            data_criacao: Set(now.into()),
            ..Default::default()
        };
        apply_form(&mut property, form, author);
        property.data_atualizacao = Set(now.into());

        property
            .insert(self.db)
            .await
            .map_err(|err| map_write_error(err, &slug))
    }

    /// Replaces the editable fields of an existing listing. Creation metadata
    /// is left untouched.
    pub async fn update(
        &self,
        id: Uuid,
        form: PropertyForm,
        author: Option<&str>,
    ) -> Result<PropertyModel, RepositoryError> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Property not found"))?;
        let slug = form.slug.clone();

        let mut property = existing.into_active_model();
        apply_form(&mut property, form, author);
        property.data_atualizacao = Set(Utc::now().into());

        property
            .update(self.db)
            .await
            .map_err(|err| map_write_error(err, &slug))
    }

    /// Deletes the listing and its image rows. Returns the removed image rows
    /// so the caller can clean up stored objects.
    pub async fn delete(&self, id: Uuid) -> Result<Vec<property_image::Model>, RepositoryError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let property = Property::find_by_id(id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::not_found("Property not found"))?;

        let images = PropertyImage::find()
            .filter(property_image::Column::ImovelId.eq(id))
            .all(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        PropertyImage::delete_many()
            .filter(property_image::Column::ImovelId.eq(id))
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        Property::delete_by_id(property.id)
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(images)
    }
}

fn apply_form(property: &mut PropertyActiveModel, form: PropertyForm, author: Option<&str>) {
    property.titulo = Set(form.titulo);
    property.slug = Set(form.slug);
    property.titulo_descricao = Set(form.titulo_descricao);
    property.descricao = Set(form.descricao);
    property.valor = Set(form.valor.unwrap_or(0.0));
    property.valor_condominio = Set(form.valor_condominio);
    property.bairro = Set(form.bairro);
    property.cidade = Set(form.cidade.unwrap_or_else(|| DEFAULT_CITY.to_string()));
    property.estado = Set(form.estado.unwrap_or_else(|| DEFAULT_STATE.to_string()));
    property.endereco = Set(form.endereco);
    property.texto_localizacao = Set(form.texto_localizacao);
    property.area_texto = Set(form.area_texto);
    property.areas_disponiveis = Set(AreaList(form.areas_disponiveis));
    property.status_empreendimento = Set(form.status_empreendimento);
    property.tipo_imovel = Set(TagList(form.tipo_imovel));
    property.caracteristicas = Set(TagList(form.caracteristicas));
    property.quartos = Set(TagList(form.quartos));
    property.banheiros = Set(TagList(form.banheiros));
    property.vagas = Set(TagList(form.vagas));
    property.destaque = Set(form.destaque);
    property.home = Set(form.home);
    property.ordem = Set(form.ordem);
    property.iframe_mapa = Set(form.iframe_mapa);
    property.video_url = Set(form.video_url);
    property.responsavel_atualizacao = Set(author.map(str::to_string));
}

fn map_write_error(err: sea_orm::DbErr, slug: &str) -> RepositoryError {
    if is_unique_violation(&err) {
        RepositoryError::Conflict(format!("A property with slug '{slug}' already exists"))
    } else {
        RepositoryError::database_error(err)
    }
}
