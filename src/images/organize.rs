//! Grouping of image rows into the shape the site renders.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::ImageKind;
use crate::models::property_image::Model as ImageModel;

/// Shown on cards of listings that have no image at all.
pub const DEFAULT_CARD_IMAGE: &str = "/assets/temporario tela.png";

/// Gallery bucket for rows stored without a gallery name.
pub const DEFAULT_GALLERY: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GalleryImage {
    pub url: String,
    pub ordem: i32,
}

/// Images of one property: at most one card and one capa, plus named
/// galleries ordered by `ordem`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PropertyImages {
    pub card: Option<String>,
    pub capa: Option<String>,
    pub galerias: BTreeMap<String, Vec<GalleryImage>>,
}

impl PropertyImages {
    pub fn is_empty(&self) -> bool {
        self.card.is_none() && self.capa.is_none() && self.galerias.is_empty()
    }
}

/// Rows with an unknown `tipo` are skipped.
pub fn organize<'a, I>(rows: I) -> PropertyImages
where
    I: IntoIterator<Item = &'a ImageModel>,
{
    let mut images = PropertyImages::default();

    for row in rows {
        match row.kind() {
            Some(ImageKind::Card) => images.card = Some(row.url.clone()),
            Some(ImageKind::Capa) => images.capa = Some(row.url.clone()),
            Some(ImageKind::Galeria) => {
                let gallery = row
                    .nome_galeria
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(DEFAULT_GALLERY);
                images
                    .galerias
                    .entry(gallery.to_string())
                    .or_default()
                    .push(GalleryImage {
                        url: row.url.clone(),
                        ordem: row.ordem,
                    });
            }
            None => {
                tracing::debug!(image_id = %row.id, tipo = %row.tipo, "Skipping image with unknown type");
            }
        }
    }

    for gallery in images.galerias.values_mut() {
        gallery.sort_by_key(|image| image.ordem);
    }

    images
}

/// Card, then capa, then the first image of the first gallery by name, then
/// the placeholder.
pub fn card_image_url(images: &PropertyImages) -> String {
    images
        .card
        .clone()
        .or_else(|| images.capa.clone())
        .or_else(|| {
            images
                .galerias
                .values()
                .find_map(|gallery| gallery.first())
                .map(|image| image.url.clone())
        })
        .unwrap_or_else(|| DEFAULT_CARD_IMAGE.to_string())
}
