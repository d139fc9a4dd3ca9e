//! # Brand Handlers
//!
//! Public brand listing and detail, plus the admin CRUD endpoints under
//! `/api/admin/brands`.

use axum::{
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::activity::admin_badge;
use crate::auth::AdminSession;
use crate::error::ApiError;
use crate::handlers::types::{
    AdminBrandItem, BrandDetailResponse, BrandEnvelope, BrandListQuery, BrandListResponse,
    BrandResponse, ImageResponse, OfferResponse, Pagination, PublicBrandItem, SuccessResponse,
    page_request,
};
use crate::repositories::BrandRepository;
use crate::server::AppState;
use crate::validation::{BrandDraft, BrandInput, BrandPatch};

/// List brands for the public directory
#[utoipa::path(
    get,
    path = "/api/brands",
    params(BrandListQuery),
    responses(
        (status = 200, description = "Brands ordered by name", body = BrandListResponse<PublicBrandItem>),
        (status = 400, description = "Invalid pagination parameters", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "brands"
)]
pub async fn list_brands(
    State(state): State<AppState>,
    query: Result<Query<BrandListQuery>, QueryRejection>,
) -> Result<Json<BrandListResponse<PublicBrandItem>>, ApiError> {
    let Query(query) = query?;
    let request = page_request(query.page, query.limit)?;

    let page = BrandRepository::new(&state.db)
        .list_public(request, query.search.as_deref(), Utc::now())
        .await?;

    let pagination = Pagination::from(&page);
    let brands = page
        .items
        .into_iter()
        .map(|row| PublicBrandItem {
            brand: row.brand.into(),
            offers_count: row.offers_count,
            preview_image: row.preview_image,
        })
        .collect();

    Ok(Json(BrandListResponse { brands, pagination }))
}

/// Public brand detail with images and the offers effective right now
#[utoipa::path(
    get,
    path = "/api/brands/{id}",
    params(("id" = Uuid, Path, description = "Brand ID")),
    responses(
        (status = 200, description = "Brand detail", body = BrandEnvelope<BrandDetailResponse>),
        (status = 400, description = "Malformed brand ID", body = ApiError),
        (status = 404, description = "Brand not found", body = ApiError)
    ),
    tag = "brands"
)]
pub async fn get_brand(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<BrandEnvelope<BrandDetailResponse>>, ApiError> {
    let Path(id) = id?;
    let detail = BrandRepository::new(&state.db)
        .public_detail(id, Utc::now())
        .await?;

    Ok(Json(BrandEnvelope {
        brand: BrandDetailResponse {
            brand: detail.brand.into(),
            images: detail.images.into_iter().map(ImageResponse::from).collect(),
            offers: Some(detail.offers.into_iter().map(OfferResponse::from).collect()),
        },
    }))
}

/// Admin brand list with offer and image counts
#[utoipa::path(
    get,
    path = "/api/admin/brands",
    params(BrandListQuery),
    responses(
        (status = 200, description = "Brands, newest first", body = BrandListResponse<AdminBrandItem>),
        (status = 400, description = "Invalid pagination parameters", body = ApiError),
        (status = 401, description = "Not signed in as admin", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn list_admin_brands(
    State(state): State<AppState>,
    query: Result<Query<BrandListQuery>, QueryRejection>,
) -> Result<Json<BrandListResponse<AdminBrandItem>>, ApiError> {
    let Query(query) = query?;
    let request = page_request(query.page, query.limit)?;

    let page = BrandRepository::new(&state.db)
        .list_admin(request, query.search.as_deref(), Utc::now())
        .await?;

    let pagination = Pagination::from(&page);
    let brands = page
        .items
        .into_iter()
        .map(|row| AdminBrandItem {
            brand: row.brand.into(),
            offer_count: row.offer_count,
            effective_offer_count: row.effective_offer_count,
            image_count: row.image_count,
        })
        .collect();

    Ok(Json(BrandListResponse { brands, pagination }))
}

/// Create a brand
#[utoipa::path(
    post,
    path = "/api/admin/brands",
    request_body = BrandInput,
    responses(
        (status = 201, description = "Brand created", body = BrandEnvelope<BrandResponse>),
        (status = 400, description = "Missing or invalid fields", body = ApiError),
        (status = 401, description = "Not signed in as admin", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn create_brand(
    State(state): State<AppState>,
    session: AdminSession,
    payload: Result<Json<BrandInput>, JsonRejection>,
) -> Result<(StatusCode, Json<BrandEnvelope<BrandResponse>>), ApiError> {
    let Json(input) = payload?;
    let draft = BrandDraft::from_input(input)?;

    let brand = BrandRepository::new(&state.db).create(draft).await?;
    tracing::info!(brand_id = %brand.id, admin = %session.0.email, "Brand created");

    Ok((
        StatusCode::CREATED,
        Json(BrandEnvelope {
            brand: brand.into(),
        }),
    ))
}

/// Admin brand detail with images and every offer
#[utoipa::path(
    get,
    path = "/api/admin/brands/{id}",
    params(("id" = Uuid, Path, description = "Brand ID")),
    responses(
        (status = 200, description = "Brand detail", body = BrandEnvelope<BrandDetailResponse>),
        (status = 404, description = "Brand not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn get_admin_brand(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<BrandEnvelope<BrandDetailResponse>>, ApiError> {
    let Path(id) = id?;
    let detail = BrandRepository::new(&state.db).admin_detail(id).await?;

    let now = Utc::now();
    let policy = state.config.admin_status_policy;
    let offers = detail
        .offers
        .into_iter()
        .map(|offer| {
            let status = admin_badge(&offer, now, policy);
            OfferResponse::from(offer).with_status(status)
        })
        .collect();

    Ok(Json(BrandEnvelope {
        brand: BrandDetailResponse {
            brand: detail.brand.into(),
            images: detail.images.into_iter().map(ImageResponse::from).collect(),
            offers: Some(offers),
        },
    }))
}

/// Update a brand; relationship and generated fields in the body are ignored
#[utoipa::path(
    put,
    path = "/api/admin/brands/{id}",
    params(("id" = Uuid, Path, description = "Brand ID")),
    request_body = BrandPatch,
    responses(
        (status = 200, description = "Brand updated", body = BrandEnvelope<BrandDetailResponse>),
        (status = 400, description = "Invalid fields", body = ApiError),
        (status = 404, description = "Brand not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn update_brand(
    State(state): State<AppState>,
    session: AdminSession,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<BrandPatch>, JsonRejection>,
) -> Result<Json<BrandEnvelope<BrandDetailResponse>>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;

    let brands = BrandRepository::new(&state.db);
    let brand = brands.update(id, patch).await?;
    let images = brands.images_of(id).await?;
    tracing::info!(brand_id = %id, admin = %session.0.email, "Brand updated");

    Ok(Json(BrandEnvelope {
        brand: BrandDetailResponse {
            brand: brand.into(),
            images: images.into_iter().map(ImageResponse::from).collect(),
            offers: None,
        },
    }))
}

/// Delete a brand with its offers and images
#[utoipa::path(
    delete,
    path = "/api/admin/brands/{id}",
    params(("id" = Uuid, Path, description = "Brand ID")),
    responses(
        (status = 200, description = "Brand deleted", body = SuccessResponse),
        (status = 404, description = "Brand not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn delete_brand(
    State(state): State<AppState>,
    session: AdminSession,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Path(id) = id?;
    BrandRepository::new(&state.db).delete(id).await?;
    tracing::info!(brand_id = %id, admin = %session.0.email, "Brand deleted");

    Ok(Json(SuccessResponse::ok()))
}
