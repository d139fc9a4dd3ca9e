//! Offer entity model
//!
//! This module contains the SeaORM entity model for the offers table,
//! which stores time-bounded promotions belonging to a brand.

use chrono::{DateTime, Utc};
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::activity::{self, OfferStatus};

/// Offer entity representing a promotion or coupon
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "offers")]
pub struct Model {
    /// Unique identifier for the offer (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Brand this offer belongs to
    pub brand_id: Uuid,

    /// Offer headline
    pub title: String,

    /// Offer body text
    pub description: String,

    /// First instant at which the offer applies
    pub start_date: DateTimeWithTimeZone,

    /// Last instant at which the offer applies (open-ended when absent)
    pub end_date: Option<DateTimeWithTimeZone>,

    /// Optional coupon code shown to visitors
    pub coupon_code: Option<String>,

    /// Optional discount percentage (1-100)
    pub discount_percent: Option<i32>,

    /// Manual on/off switch
    pub active: bool,

    /// Timestamp when the offer was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the offer was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::brand::Entity",
        from = "Column::BrandId",
        to = "super::brand::Column::Id",
        on_delete = "Cascade"
    )]
    Brand,
}

impl Related<super::brand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the offer is currently effective at `now`.
    pub fn is_effective_at(&self, now: DateTime<Utc>) -> bool {
        activity::is_effective(
            self.active,
            self.start_date.with_timezone(&Utc),
            self.end_date.map(|end| end.with_timezone(&Utc)),
            now,
        )
    }

    /// Lifecycle status of the offer at `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> OfferStatus {
        OfferStatus::classify(
            self.active,
            self.start_date.with_timezone(&Utc),
            self.end_date.map(|end| end.with_timezone(&Utc)),
            now,
        )
    }
}
