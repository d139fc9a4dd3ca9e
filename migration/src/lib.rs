//! Database migrations for the Brand Directory.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2026_10_01_000001_create_users;
mod m2026_10_01_000002_create_brands;
mod m2026_10_01_000003_create_offers;
mod m2026_10_01_000004_create_images;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2026_10_01_000001_create_users::Migration),
            Box::new(m2026_10_01_000002_create_brands::Migration),
            Box::new(m2026_10_01_000003_create_offers::Migration),
            Box::new(m2026_10_01_000004_create_images::Migration),
        ]
    }
}
