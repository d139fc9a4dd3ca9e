//! # Offer Handlers
//!
//! The public listing only ever returns offers that are effective right now.
//! Admin endpoints see every offer and attach a status badge derived with the
//! configured [`AdminStatusPolicy`](crate::activity::AdminStatusPolicy).

use axum::{
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::activity::admin_badge;
use crate::auth::AdminSession;
use crate::error::ApiError;
use crate::handlers::types::{
    OfferEnvelope, OfferListQuery, OfferListResponse, OfferResponse, Pagination, SuccessResponse,
    page_request,
};
use crate::models::{brand, offer};
use crate::repositories::OfferRepository;
use crate::server::AppState;
use crate::validation::{OfferDraft, OfferInput, OfferPatch};

fn admin_view(
    state: &AppState,
    offer: offer::Model,
    brand: Option<brand::Model>,
    now: DateTime<Utc>,
) -> OfferResponse {
    let status = admin_badge(&offer, now, state.config.admin_status_policy);
    OfferResponse::from(offer)
        .with_brand(brand)
        .with_status(status)
}

/// List offers effective right now
#[utoipa::path(
    get,
    path = "/api/offers",
    params(OfferListQuery),
    responses(
        (status = 200, description = "Effective offers, newest start first", body = OfferListResponse),
        (status = 400, description = "Invalid query parameters", body = ApiError)
    ),
    tag = "offers"
)]
pub async fn list_offers(
    State(state): State<AppState>,
    query: Result<Query<OfferListQuery>, QueryRejection>,
) -> Result<Json<OfferListResponse>, ApiError> {
    let Query(query) = query?;
    let request = page_request(query.page, query.limit)?;

    let page = OfferRepository::new(&state.db)
        .list_effective(request, query.brand_id, Utc::now())
        .await?;

    let pagination = Pagination::from(&page);
    let offers = page
        .items
        .into_iter()
        .map(|(offer, brand)| OfferResponse::from(offer).with_brand(brand))
        .collect();

    Ok(Json(OfferListResponse {
        offers,
        pagination: Some(pagination),
    }))
}

/// List every offer regardless of status
#[utoipa::path(
    get,
    path = "/api/admin/offers",
    params(OfferListQuery),
    responses(
        (status = 200, description = "Offers, newest first", body = OfferListResponse),
        (status = 400, description = "Invalid query parameters", body = ApiError),
        (status = 401, description = "Not signed in as admin", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn list_admin_offers(
    State(state): State<AppState>,
    query: Result<Query<OfferListQuery>, QueryRejection>,
) -> Result<Json<OfferListResponse>, ApiError> {
    let Query(query) = query?;
    let request = page_request(query.page, query.limit)?;

    let page = OfferRepository::new(&state.db)
        .list_all(request, query.brand_id)
        .await?;

    let now = Utc::now();
    let pagination = Pagination::from(&page);
    let offers = page
        .items
        .into_iter()
        .map(|(offer, brand)| admin_view(&state, offer, brand, now))
        .collect();

    Ok(Json(OfferListResponse {
        offers,
        pagination: Some(pagination),
    }))
}

/// Create an offer for the brand named by `brandId` in the body
#[utoipa::path(
    post,
    path = "/api/admin/offers",
    request_body = OfferInput,
    responses(
        (status = 201, description = "Offer created", body = OfferEnvelope),
        (status = 400, description = "Missing or invalid fields", body = ApiError),
        (status = 404, description = "Brand not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn create_offer(
    State(state): State<AppState>,
    session: AdminSession,
    payload: Result<Json<OfferInput>, JsonRejection>,
) -> Result<(StatusCode, Json<OfferEnvelope>), ApiError> {
    let Json(input) = payload?;
    insert_offer(&state, &session, input, None).await
}

/// All offers of one brand, newest first
#[utoipa::path(
    get,
    path = "/api/admin/brands/{id}/offers",
    params(("id" = Uuid, Path, description = "Brand ID")),
    responses(
        (status = 200, description = "Offers of the brand", body = OfferListResponse),
        (status = 404, description = "Brand not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn list_brand_offers(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<OfferListResponse>, ApiError> {
    let Path(brand_id) = id?;
    let offers = OfferRepository::new(&state.db)
        .list_for_brand(brand_id)
        .await?;

    let now = Utc::now();
    let offers = offers
        .into_iter()
        .map(|offer| admin_view(&state, offer, None, now))
        .collect();

    Ok(Json(OfferListResponse {
        offers,
        pagination: None,
    }))
}

/// Create an offer under a brand
#[utoipa::path(
    post,
    path = "/api/admin/brands/{id}/offers",
    params(("id" = Uuid, Path, description = "Brand ID")),
    request_body = OfferInput,
    responses(
        (status = 201, description = "Offer created", body = OfferEnvelope),
        (status = 400, description = "Missing or invalid fields", body = ApiError),
        (status = 404, description = "Brand not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn create_brand_offer(
    State(state): State<AppState>,
    session: AdminSession,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<OfferInput>, JsonRejection>,
) -> Result<(StatusCode, Json<OfferEnvelope>), ApiError> {
    let Path(brand_id) = id?;
    let Json(input) = payload?;
    insert_offer(&state, &session, input, Some(brand_id)).await
}

async fn insert_offer(
    state: &AppState,
    session: &AdminSession,
    input: OfferInput,
    path_brand: Option<Uuid>,
) -> Result<(StatusCode, Json<OfferEnvelope>), ApiError> {
    let draft = OfferDraft::from_input(input, path_brand)?;

    let offers = OfferRepository::new(&state.db);
    let created = offers.create(draft).await?;
    let (offer, brand) = offers.get_with_brand(created.id).await?;
    tracing::info!(
        offer_id = %offer.id,
        brand_id = %offer.brand_id,
        admin = %session.0.email,
        "Offer created"
    );

    Ok((
        StatusCode::CREATED,
        Json(OfferEnvelope {
            offer: admin_view(state, offer, brand, Utc::now()),
        }),
    ))
}

/// One offer with its brand summary
#[utoipa::path(
    get,
    path = "/api/admin/offers/{id}",
    params(("id" = Uuid, Path, description = "Offer ID")),
    responses(
        (status = 200, description = "Offer", body = OfferEnvelope),
        (status = 404, description = "Offer not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn get_offer(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<OfferEnvelope>, ApiError> {
    let Path(id) = id?;
    let (offer, brand) = OfferRepository::new(&state.db).get_with_brand(id).await?;

    Ok(Json(OfferEnvelope {
        offer: admin_view(&state, offer, brand, Utc::now()),
    }))
}

/// Update an offer; validation runs against the merged record
#[utoipa::path(
    put,
    path = "/api/admin/offers/{id}",
    params(("id" = Uuid, Path, description = "Offer ID")),
    request_body = OfferPatch,
    responses(
        (status = 200, description = "Offer updated", body = OfferEnvelope),
        (status = 400, description = "Invalid fields", body = ApiError),
        (status = 404, description = "Offer or brand not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn update_offer(
    State(state): State<AppState>,
    session: AdminSession,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<OfferPatch>, JsonRejection>,
) -> Result<Json<OfferEnvelope>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;

    let offers = OfferRepository::new(&state.db);
    offers.update(id, patch).await?;
    let (offer, brand) = offers.get_with_brand(id).await?;
    tracing::info!(offer_id = %id, admin = %session.0.email, "Offer updated");

    Ok(Json(OfferEnvelope {
        offer: admin_view(&state, offer, brand, Utc::now()),
    }))
}

/// Delete an offer
#[utoipa::path(
    delete,
    path = "/api/admin/offers/{id}",
    params(("id" = Uuid, Path, description = "Offer ID")),
    responses(
        (status = 200, description = "Offer deleted", body = SuccessResponse),
        (status = 404, description = "Offer not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn delete_offer(
    State(state): State<AppState>,
    session: AdminSession,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Path(id) = id?;
    OfferRepository::new(&state.db).delete(id).await?;
    tracing::info!(offer_id = %id, admin = %session.0.email, "Offer deleted");

    Ok(Json(SuccessResponse::ok()))
}
