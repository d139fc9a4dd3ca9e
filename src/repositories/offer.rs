//! # Offer Repository
//!
//! Offer queries and mutations. Public listings always go through
//! [`activity::effective_condition`]; admin listings see every offer.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::{Page, PageRequest};
use crate::activity;
use crate::error::RepositoryError;
use crate::models::{Brand, Offer, brand, offer};
use crate::validation::{OfferDraft, OfferPatch};

/// An offer with the brand it belongs to.
pub type OfferWithBrand = (offer::Model, Option<brand::Model>);

/// Repository for offer database operations
pub struct OfferRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> OfferRepository<'a> {
    /// Create a new OfferRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<offer::Model>, RepositoryError> {
        Offer::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn get(&self, id: Uuid) -> Result<offer::Model, RepositoryError> {
        self.find(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Offer"))
    }

    pub async fn get_with_brand(&self, id: Uuid) -> Result<OfferWithBrand, RepositoryError> {
        Offer::find_by_id(id)
            .find_also_related(Brand)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::not_found("Offer"))
    }

    /// Offers effective at `now`, newest start first, optionally for one brand.
    pub async fn list_effective(
        &self,
        request: PageRequest,
        brand_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<Page<OfferWithBrand>, RepositoryError> {
        let filter = activity::effective_condition(now).add_option(brand_filter(brand_id));
        self.list_page(request, filter, offer::Column::StartDate)
            .await
    }

    /// Every offer regardless of status, newest first, optionally for one brand.
    pub async fn list_all(
        &self,
        request: PageRequest,
        brand_id: Option<Uuid>,
    ) -> Result<Page<OfferWithBrand>, RepositoryError> {
        let filter = Condition::all().add_option(brand_filter(brand_id));
        self.list_page(request, filter, offer::Column::CreatedAt)
            .await
    }

    /// All offers of an existing brand, newest first.
    pub async fn list_for_brand(
        &self,
        brand_id: Uuid,
    ) -> Result<Vec<offer::Model>, RepositoryError> {
        self.ensure_brand(brand_id).await?;

        Offer::find()
            .filter(offer::Column::BrandId.eq(brand_id))
            .order_by_desc(offer::Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn create(&self, draft: OfferDraft) -> Result<offer::Model, RepositoryError> {
        self.ensure_brand(draft.brand_id).await?;

        let now = Utc::now().fixed_offset();
        let model = offer::ActiveModel {
            id: Set(Uuid::new_v4()),
            brand_id: Set(draft.brand_id),
            title: Set(draft.title),
            description: Set(draft.description),
            start_date: Set(draft.start_date.fixed_offset()),
            end_date: Set(draft.end_date.map(|end| end.fixed_offset())),
            coupon_code: Set(draft.coupon_code),
            discount_percent: Set(draft.discount_percent),
            active: Set(draft.active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Applies the patch over the stored offer, validates the merged record and
    /// overwrites it (last write wins).
    pub async fn update(
        &self,
        id: Uuid,
        patch: OfferPatch,
    ) -> Result<offer::Model, RepositoryError> {
        let existing = self.get(id).await?;
        let draft = patch.merge(&existing)?;
        if draft.brand_id != existing.brand_id {
            self.ensure_brand(draft.brand_id).await?;
        }

        let mut model: offer::ActiveModel = existing.into();
        model.brand_id = Set(draft.brand_id);
        model.title = Set(draft.title);
        model.description = Set(draft.description);
        model.start_date = Set(draft.start_date.fixed_offset());
        model.end_date = Set(draft.end_date.map(|end| end.fixed_offset()));
        model.coupon_code = Set(draft.coupon_code);
        model.discount_percent = Set(draft.discount_percent);
        model.active = Set(draft.active);
        model.updated_at = Set(Utc::now().fixed_offset());

        model
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = Offer::delete_by_id(id)
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("Offer"));
        }
        Ok(())
    }

    async fn ensure_brand(&self, brand_id: Uuid) -> Result<(), RepositoryError> {
        let exists = Brand::find_by_id(brand_id)
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            > 0;

        if exists {
            Ok(())
        } else {
            Err(RepositoryError::not_found("Brand"))
        }
    }

    async fn list_page(
        &self,
        request: PageRequest,
        filter: Condition,
        newest_first_by: offer::Column,
    ) -> Result<Page<OfferWithBrand>, RepositoryError> {
        let query = Offer::find().filter(filter);

        let total = query
            .clone()
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        let rows = query
            .order_by_desc(newest_first_by)
            .order_by_asc(offer::Column::Id)
            .offset(request.offset())
            .limit(request.limit)
            .find_also_related(Brand)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(Page::new(rows, total, request))
    }
}

fn brand_filter(brand_id: Option<Uuid>) -> Option<sea_orm::sea_query::SimpleExpr> {
    brand_id.map(|brand_id| offer::Column::BrandId.eq(brand_id))
}
