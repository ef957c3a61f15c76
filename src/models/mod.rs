//! # Data Models
//!
//! SeaORM entities for the listing, image, lead and admin user tables.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod lead;
pub mod property;
pub mod property_image;
pub mod user;

pub use lead::{Entity as Lead, LeadStatus};
pub use property::{AreaList, Entity as Property, TagList};
pub use property_image::{Entity as PropertyImage, ImageKind};
pub use user::Entity as User;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "fx-imoveis".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
