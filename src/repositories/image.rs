//! # Image Repository

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use super::BrandRepository;
use crate::error::RepositoryError;
use crate::models::{Image, image};
use crate::validation::{ImageDraft, ImageInput};

/// Repository for brand image database operations
pub struct ImageRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ImageRepository<'a> {
    /// Create a new ImageRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Attach an image to an existing brand. Alt text defaults to `"<brand name> image"`.
    pub async fn create(
        &self,
        brand_id: Uuid,
        input: ImageInput,
    ) -> Result<image::Model, RepositoryError> {
        let brand = BrandRepository::new(self.db).get(brand_id).await?;
        let draft = ImageDraft::from_input(input, &brand.name)?;

        image::ActiveModel {
            id: Set(Uuid::new_v4()),
            brand_id: Set(brand.id),
            url: Set(draft.url),
            alt_text: Set(Some(draft.alt_text)),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = Image::delete_by_id(id)
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("Image"));
        }
        Ok(())
    }
}
