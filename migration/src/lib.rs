//! Database migrations for the fx-imoveis service.

pub use sea_orm_migration::prelude::*;

mod m2025_06_01_000001_create_users;
mod m2025_06_01_000002_create_properties;
mod m2025_06_01_000003_create_property_images;
mod m2025_06_01_000004_create_leads;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_06_01_000001_create_users::Migration),
            Box::new(m2025_06_01_000002_create_properties::Migration),
            Box::new(m2025_06_01_000003_create_property_images::Migration),
            Box::new(m2025_06_01_000004_create_leads::Migration),
        ]
    }
}
