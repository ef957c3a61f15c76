//! # Property Image Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::ImageKind;
use crate::models::property_image::{
    ActiveModel as ImageActiveModel, Column, Entity as PropertyImage, Model as ImageModel,
};

pub struct PropertyImageRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PropertyImageRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// All rows of one property ordered by `ordem`.
    pub async fn list_for_property(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<ImageModel>, RepositoryError> {
        PropertyImage::find()
            .filter(Column::ImovelId.eq(property_id))
            .order_by_asc(Column::Ordem)
            .order_by_asc(Column::DataCriacao)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn list_for_properties(
        &self,
        property_ids: &[Uuid],
    ) -> Result<Vec<ImageModel>, RepositoryError> {
        if property_ids.is_empty() {
            return Ok(Vec::new());
        }

        PropertyImage::find()
            .filter(Column::ImovelId.is_in(property_ids.iter().copied()))
            .order_by_asc(Column::Ordem)
            .order_by_asc(Column::DataCriacao)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Points the card or capa row of a property at `url`, inserting it when
    /// it does not exist yet.
    pub async fn upsert_main(
        &self,
        property_id: Uuid,
        kind: ImageKind,
        url: &str,
    ) -> Result<ImageModel, RepositoryError> {
        if !kind.is_main() {
            return Err(RepositoryError::validation_error(
                "only card and capa images have a single slot",
            ));
        }

        let existing = PropertyImage::find()
            .filter(Column::ImovelId.eq(property_id))
            .filter(Column::Tipo.eq(kind.as_str()))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        match existing {
            Some(row) => {
                let mut row = row.into_active_model();
                row.url = Set(url.to_string());
                row.ordem = Set(0);
                row.nome_galeria = Set(None);
                row.update(self.db)
                    .await
                    .map_err(RepositoryError::database_error)
            }
            None => ImageActiveModel {
                id: Set(Uuid::new_v4()),
                imovel_id: Set(property_id),
                url: Set(url.to_string()),
                tipo: Set(kind.as_str().to_string()),
                ordem: Set(0),
                nome_galeria: Set(None),
                data_criacao: Set(Utc::now().into()),
            }
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error),
        }
    }

    /// Highest `ordem` in a gallery, if it has any images.
    pub async fn max_gallery_order(
        &self,
        property_id: Uuid,
        gallery: &str,
    ) -> Result<Option<i32>, RepositoryError> {
        let last = PropertyImage::find()
            .filter(Column::ImovelId.eq(property_id))
            .filter(Column::Tipo.eq(ImageKind::Galeria.as_str()))
            .filter(Column::NomeGaleria.eq(gallery))
            .order_by_desc(Column::Ordem)
            .limit(1)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(last.map(|row| row.ordem))
    }

    /// Inserts one row per url in a single statement, numbering them from
    /// `first_order`.
    pub async fn insert_gallery_batch(
        &self,
        property_id: Uuid,
        gallery: &str,
        urls: &[String],
        first_order: i32,
    ) -> Result<Vec<ImageModel>, RepositoryError> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let rows: Vec<ImageModel> = urls
            .iter()
            .zip(first_order..)
            .map(|(url, ordem)| ImageModel {
                id: Uuid::new_v4(),
                imovel_id: property_id,
                url: url.clone(),
                tipo: ImageKind::Galeria.as_str().to_string(),
                ordem,
                nome_galeria: Some(gallery.to_string()),
                data_criacao: now.into(),
            })
            .collect();

        PropertyImage::insert_many(rows.iter().cloned().map(|row| row.into_active_model()))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(rows)
    }

    /// Urls of every image in a gallery.
    pub async fn gallery_urls(
        &self,
        property_id: Uuid,
        gallery: &str,
    ) -> Result<Vec<String>, RepositoryError> {
        let rows = PropertyImage::find()
            .filter(Column::ImovelId.eq(property_id))
            .filter(Column::Tipo.eq(ImageKind::Galeria.as_str()))
            .filter(Column::NomeGaleria.eq(gallery))
            .order_by_asc(Column::Ordem)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(rows.into_iter().map(|row| row.url).collect())
    }

    /// Deletes the row of `property_id` pointing at `url`. Returns the number
    /// of rows removed.
    pub async fn delete_by_url(
        &self,
        property_id: Uuid,
        url: &str,
    ) -> Result<u64, RepositoryError> {
        let result = PropertyImage::delete_many()
            .filter(Column::ImovelId.eq(property_id))
            .filter(Column::Url.eq(url))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result.rows_affected)
    }
}
