//! Brand entity model
//!
//! This module contains the SeaORM entity model for the brands table,
//! which stores partner organizations shown in the public directory.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Brand entity representing a partner organization
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "brands")]
pub struct Model {
    /// Unique identifier for the brand (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name of the brand
    pub name: String,

    /// Public description of the brand
    pub description: String,

    /// Logo URL
    pub logo: String,

    /// Free-form location (optional)
    pub location: Option<String>,

    /// Timestamp when the brand was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the brand was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::offer::Entity")]
    Offer,
    #[sea_orm(has_many = "super::image::Entity")]
    Image,
}

impl Related<super::offer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offer.def()
    }
}

impl Related<super::image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Image.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
