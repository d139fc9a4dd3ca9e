//! # Common API Types
//!
//! Response bodies shared across handlers, pagination parsing, and the
//! conversions from entity models. JSON field names are camelCase and every
//! response wraps its payload in a named key.

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::activity::OfferStatus;
use crate::error::{ApiError, validation_error};
use crate::models::{brand, image, offer, user};
use crate::repositories::{Page, PageRequest};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;
/// Largest page whose offset still fits the database's signed 64-bit OFFSET.
pub const MAX_PAGE: i64 = i64::MAX / MAX_LIMIT;

fn utc(value: DateTimeWithTimeZone) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}

/// Query parameters for brand listings
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BrandListQuery {
    /// Page number, starting at 1 (default: 1)
    pub page: Option<i64>,
    /// Page size, 1-100 (default: 10)
    pub limit: Option<i64>,
    /// Case-insensitive substring filter
    pub search: Option<String>,
}

/// Query parameters for offer listings
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct OfferListQuery {
    /// Page number, starting at 1 (default: 1)
    pub page: Option<i64>,
    /// Page size, 1-100 (default: 10)
    pub limit: Option<i64>,
    /// Only offers of this brand
    pub brand_id: Option<Uuid>,
}

/// Validate `page`/`limit` and apply their defaults.
pub fn page_request(page: Option<i64>, limit: Option<i64>) -> Result<PageRequest, ApiError> {
    let page = page.unwrap_or(DEFAULT_PAGE);
    let limit = limit.unwrap_or(DEFAULT_LIMIT);

    let mut fields = serde_json::Map::new();
    if !(1..=MAX_PAGE).contains(&page) {
        fields.insert(
            "page".into(),
            format!("must be between 1 and {MAX_PAGE}").into(),
        );
    }
    if !(1..=MAX_LIMIT).contains(&limit) {
        fields.insert(
            "limit".into(),
            format!("must be between 1 and {MAX_LIMIT}").into(),
        );
    }
    if !fields.is_empty() {
        return Err(validation_error(
            "Invalid pagination parameters",
            serde_json::json!({ "fields": fields }),
        ));
    }

    Ok(PageRequest {
        page: page as u64,
        limit: limit as u64,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> From<&Page<T>> for Pagination {
    fn from(page: &Page<T>) -> Self {
        Self {
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// --- brands ---------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub logo: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<brand::Model> for BrandResponse {
    fn from(model: brand::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            logo: model.logo,
            location: model.location,
            created_at: utc(model.created_at),
            updated_at: utc(model.updated_at),
        }
    }
}

/// Minimal brand shown next to an offer
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BrandSummary {
    pub id: Uuid,
    pub name: String,
    pub logo: String,
}

impl From<brand::Model> for BrandSummary {
    fn from(model: brand::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            logo: model.logo,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicBrandItem {
    #[serde(flatten)]
    pub brand: BrandResponse,
    /// Number of offers effective right now
    pub offers_count: u64,
    /// URL of the first image, if any
    pub preview_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminBrandItem {
    #[serde(flatten)]
    pub brand: BrandResponse,
    pub offer_count: u64,
    pub effective_offer_count: u64,
    pub image_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BrandListResponse<T> {
    pub brands: Vec<T>,
    pub pagination: Pagination,
}

/// Brand with its images and, on detail endpoints, its offers
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BrandDetailResponse {
    #[serde(flatten)]
    pub brand: BrandResponse,
    pub images: Vec<ImageResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offers: Option<Vec<OfferResponse>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BrandEnvelope<T> {
    pub brand: T,
}

// --- offers ---------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferResponse {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub coupon_code: Option<String>,
    pub discount_percent: Option<i32>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Present on listings and single-offer lookups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<BrandSummary>,
    /// Admin views only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OfferStatus>,
}

impl From<offer::Model> for OfferResponse {
    fn from(model: offer::Model) -> Self {
        Self {
            id: model.id,
            brand_id: model.brand_id,
            title: model.title,
            description: model.description,
            start_date: utc(model.start_date),
            end_date: model.end_date.map(utc),
            coupon_code: model.coupon_code,
            discount_percent: model.discount_percent,
            active: model.active,
            created_at: utc(model.created_at),
            updated_at: utc(model.updated_at),
            brand: None,
            status: None,
        }
    }
}

impl OfferResponse {
    pub fn with_brand(mut self, brand: Option<brand::Model>) -> Self {
        self.brand = brand.map(BrandSummary::from);
        self
    }

    pub fn with_status(mut self, status: OfferStatus) -> Self {
        self.status = Some(status);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfferListResponse {
    pub offers: Vec<OfferResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfferEnvelope {
    pub offer: OfferResponse,
}

// --- images ---------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub url: String,
    pub alt_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<image::Model> for ImageResponse {
    fn from(model: image::Model) -> Self {
        Self {
            id: model.id,
            brand_id: model.brand_id,
            url: model.url,
            alt_text: model.alt_text,
            created_at: utc(model.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageEnvelope {
    pub image: ImageResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Public URL of the stored file
    pub url: String,
}

// --- users ----------------------------------------------------------------

/// Account as returned to clients; the password hash is never included.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: user::Role,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            role: model.role(),
            id: model.id,
            name: model.name,
            email: model.email,
            created_at: utc(model.created_at),
        }
    }
}
