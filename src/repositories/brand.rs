//! # Brand Repository
//!
//! Brand listings (public and admin), detail lookups with their related
//! collections, and brand mutations. Deleting a brand removes its offers and
//! images in the same transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::{Page, PageRequest, search_condition};
use crate::activity;
use crate::error::RepositoryError;
use crate::models::{Brand, Image, Offer, brand, image, offer};
use crate::validation::{BrandDraft, BrandPatch};

/// Public list row: the brand with its effective offer count and first image.
#[derive(Debug, Clone)]
pub struct PublicBrandRow {
    pub brand: brand::Model,
    pub offers_count: u64,
    pub preview_image: Option<String>,
}

/// Admin list row with per-brand counts.
#[derive(Debug, Clone)]
pub struct AdminBrandRow {
    pub brand: brand::Model,
    pub offer_count: u64,
    pub effective_offer_count: u64,
    pub image_count: u64,
}

/// A brand with its images and a selection of its offers.
#[derive(Debug, Clone)]
pub struct BrandDetail {
    pub brand: brand::Model,
    pub images: Vec<image::Model>,
    pub offers: Vec<offer::Model>,
}

/// Repository for brand database operations
pub struct BrandRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> BrandRepository<'a> {
    /// Create a new BrandRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<brand::Model>, RepositoryError> {
        Brand::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Like [`find`](Self::find) but a missing brand is an error.
    pub async fn get(&self, id: Uuid) -> Result<brand::Model, RepositoryError> {
        self.find(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Brand"))
    }

    /// Public listing ordered by name. Search covers name, description and location.
    pub async fn list_public(
        &self,
        request: PageRequest,
        search: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Page<PublicBrandRow>, RepositoryError> {
        let query = Brand::find().filter(search_condition(
            search,
            &[
                brand::Column::Name,
                brand::Column::Description,
                brand::Column::Location,
            ],
        ));

        let total = query
            .clone()
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        let brands = query
            .order_by_asc(brand::Column::Name)
            .order_by_asc(brand::Column::Id)
            .offset(request.offset())
            .limit(request.limit)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let ids: Vec<Uuid> = brands.iter().map(|brand| brand.id).collect();
        let effective = self
            .offer_counts(&ids, activity::effective_condition(now))
            .await?;
        let previews = self.preview_images(&ids).await?;

        let rows = brands
            .into_iter()
            .map(|brand| PublicBrandRow {
                offers_count: effective.get(&brand.id).copied().unwrap_or_default(),
                preview_image: previews.get(&brand.id).cloned(),
                brand,
            })
            .collect();

        Ok(Page::new(rows, total, request))
    }

    /// Admin listing ordered by newest first. Search covers name and description.
    pub async fn list_admin(
        &self,
        request: PageRequest,
        search: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Page<AdminBrandRow>, RepositoryError> {
        let query = Brand::find().filter(search_condition(
            search,
            &[brand::Column::Name, brand::Column::Description],
        ));

        let total = query
            .clone()
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        let brands = query
            .order_by_desc(brand::Column::CreatedAt)
            .order_by_asc(brand::Column::Id)
            .offset(request.offset())
            .limit(request.limit)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let ids: Vec<Uuid> = brands.iter().map(|brand| brand.id).collect();
        let all_offers = self.offer_counts(&ids, Condition::all()).await?;
        let effective = self
            .offer_counts(&ids, activity::effective_condition(now))
            .await?;
        let images = self.image_counts(&ids).await?;

        let rows = brands
            .into_iter()
            .map(|brand| AdminBrandRow {
                offer_count: all_offers.get(&brand.id).copied().unwrap_or_default(),
                effective_offer_count: effective.get(&brand.id).copied().unwrap_or_default(),
                image_count: images.get(&brand.id).copied().unwrap_or_default(),
                brand,
            })
            .collect();

        Ok(Page::new(rows, total, request))
    }

    /// Brand, all images, and only the offers effective at `now` (newest start first).
    pub async fn public_detail(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<BrandDetail, RepositoryError> {
        let brand = self.get(id).await?;
        let images = self.images_of(id).await?;
        let offers = Offer::find()
            .filter(offer::Column::BrandId.eq(id))
            .filter(activity::effective_condition(now))
            .order_by_desc(offer::Column::StartDate)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(BrandDetail {
            brand,
            images,
            offers,
        })
    }

    /// Brand, all images, and every offer regardless of status (newest first).
    pub async fn admin_detail(&self, id: Uuid) -> Result<BrandDetail, RepositoryError> {
        let brand = self.get(id).await?;
        let images = self.images_of(id).await?;
        let offers = Offer::find()
            .filter(offer::Column::BrandId.eq(id))
            .order_by_desc(offer::Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(BrandDetail {
            brand,
            images,
            offers,
        })
    }

    pub async fn images_of(&self, brand_id: Uuid) -> Result<Vec<image::Model>, RepositoryError> {
        Image::find()
            .filter(image::Column::BrandId.eq(brand_id))
            .order_by_asc(image::Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn create(&self, draft: BrandDraft) -> Result<brand::Model, RepositoryError> {
        let now = Utc::now().fixed_offset();
        let model = brand::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(draft.name),
            description: Set(draft.description),
            logo: Set(draft.logo),
            location: Set(draft.location),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Overwrites the supplied fields (last write wins).
    pub async fn update(
        &self,
        id: Uuid,
        patch: BrandPatch,
    ) -> Result<brand::Model, RepositoryError> {
        let existing = self.get(id).await?;
        let draft = patch.merge(&existing)?;

        let mut model: brand::ActiveModel = existing.into();
        model.name = Set(draft.name);
        model.description = Set(draft.description);
        model.logo = Set(draft.logo);
        model.location = Set(draft.location);
        model.updated_at = Set(Utc::now().fixed_offset());

        model
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Deletes the brand together with its offers and images.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.get(id).await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let offers = Offer::delete_many()
            .filter(offer::Column::BrandId.eq(id))
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;
        let images = Image::delete_many()
            .filter(image::Column::BrandId.eq(id))
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;
        let deleted = Brand::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        if deleted.rows_affected == 0 {
            // Lost a race with another delete; nothing to commit.
            txn.rollback()
                .await
                .map_err(RepositoryError::database_error)?;
            return Err(RepositoryError::not_found("Brand"));
        }

        txn.commit().await.map_err(RepositoryError::database_error)?;

        tracing::debug!(
            brand_id = %id,
            offers = offers.rows_affected,
            images = images.rows_affected,
            "Deleted brand with dependents"
        );
        Ok(())
    }

    /// Offer count per brand among `brand_ids`, restricted by `filter`.
    async fn offer_counts(
        &self,
        brand_ids: &[Uuid],
        filter: Condition,
    ) -> Result<HashMap<Uuid, u64>, RepositoryError> {
        if brand_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, i64)> = Offer::find()
            .select_only()
            .column(offer::Column::BrandId)
            .column_as(Expr::col(offer::Column::Id).count(), "count")
            .filter(offer::Column::BrandId.is_in(brand_ids.iter().copied()))
            .filter(filter)
            .group_by(offer::Column::BrandId)
            .into_tuple()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(to_count_map(rows))
    }

    async fn image_counts(&self, brand_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepositoryError> {
        if brand_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, i64)> = Image::find()
            .select_only()
            .column(image::Column::BrandId)
            .column_as(Expr::col(image::Column::Id).count(), "count")
            .filter(image::Column::BrandId.is_in(brand_ids.iter().copied()))
            .group_by(image::Column::BrandId)
            .into_tuple()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(to_count_map(rows))
    }

    /// URL of the oldest image of each brand.
    async fn preview_images(
        &self,
        brand_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, RepositoryError> {
        if brand_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let images = Image::find()
            .filter(image::Column::BrandId.is_in(brand_ids.iter().copied()))
            .order_by_asc(image::Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let mut previews = HashMap::new();
        for image in images {
            previews.entry(image.brand_id).or_insert(image.url);
        }
        Ok(previews)
    }
}

fn to_count_map(rows: Vec<(Uuid, i64)>) -> HashMap<Uuid, u64> {
    rows.into_iter()
        .map(|(brand_id, count)| (brand_id, u64::try_from(count).unwrap_or_default()))
        .collect()
}
