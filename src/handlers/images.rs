//! # Image Handlers

use axum::{
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::auth::AdminSession;
use crate::error::ApiError;
use crate::handlers::types::{ImageEnvelope, SuccessResponse};
use crate::repositories::ImageRepository;
use crate::server::AppState;
use crate::validation::ImageInput;

/// Attach an image URL to a brand
#[utoipa::path(
    post,
    path = "/api/admin/brands/{id}/images",
    params(("id" = Uuid, Path, description = "Brand ID")),
    request_body = ImageInput,
    responses(
        (status = 201, description = "Image attached", body = ImageEnvelope),
        (status = 400, description = "Missing url", body = ApiError),
        (status = 404, description = "Brand not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn create_image(
    State(state): State<AppState>,
    session: AdminSession,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ImageInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ImageEnvelope>), ApiError> {
    let Path(brand_id) = id?;
    let Json(input) = payload?;

    let image = ImageRepository::new(&state.db)
        .create(brand_id, input)
        .await?;
    tracing::info!(
        image_id = %image.id,
        brand_id = %brand_id,
        admin = %session.0.email,
        "Image attached"
    );

    Ok((
        StatusCode::CREATED,
        Json(ImageEnvelope {
            image: image.into(),
        }),
    ))
}

/// Remove an image
#[utoipa::path(
    delete,
    path = "/api/admin/images/{id}",
    params(("id" = Uuid, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Image deleted", body = SuccessResponse),
        (status = 404, description = "Image not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    session: AdminSession,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Path(id) = id?;
    ImageRepository::new(&state.db).delete(id).await?;
    tracing::info!(image_id = %id, admin = %session.0.email, "Image deleted");

    Ok(Json(SuccessResponse::ok()))
}
