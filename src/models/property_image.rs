//! Property image entity model for the `fx_property_images` table.

use std::fmt;
use std::str::FromStr;

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role of an image within a listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// Thumbnail used on listing cards
    Card,
    /// Hero/banner image on the detail page
    Capa,
    /// Member of a named gallery
    Galeria,
}

impl ImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Card => "card",
            ImageKind::Capa => "capa",
            ImageKind::Galeria => "galeria",
        }
    }

    /// Card and capa are singletons stored at a fixed path.
    pub fn is_main(&self) -> bool {
        matches!(self, ImageKind::Card | ImageKind::Capa)
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(ImageKind::Card),
            "capa" => Ok(ImageKind::Capa),
            "galeria" => Ok(ImageKind::Galeria),
            other => Err(format!("unknown image type '{other}'")),
        }
    }
}

/// One stored object attached to a property.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "fx_property_images")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub imovel_id: Uuid,

    /// Public URL of the stored object
    pub url: String,

    /// `card`, `capa` or `galeria`
    pub tipo: String,

    pub ordem: i32,

    /// Gallery name; `None` for card and capa rows
    pub nome_galeria: Option<String>,

    pub data_criacao: DateTimeWithTimeZone,
}

impl Model {
    pub fn kind(&self) -> Option<ImageKind> {
        self.tipo.parse().ok()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::ImovelId",
        to = "super::property::Column::Id",
        on_delete = "Cascade"
    )]
    Property,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_kind_round_trips_through_str() {
        for kind in [ImageKind::Card, ImageKind::Capa, ImageKind::Galeria] {
            assert_eq!(kind.as_str().parse::<ImageKind>().unwrap(), kind);
        }
        assert!("banner".parse::<ImageKind>().is_err());
    }

    #[test]
    fn only_card_and_capa_are_main_images() {
        assert!(ImageKind::Card.is_main());
        assert!(ImageKind::Capa.is_main());
        assert!(!ImageKind::Galeria.is_main());
    }
}
