//! # Server Configuration
//!
//! This module contains the server setup and configuration for the Brand Directory:
//! shared state, the router with its middleware stack, and the OpenAPI document.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth;
use crate::config::AppConfig;
use crate::handlers::{self, brands, images, offers, upload};
use crate::pages;
use crate::session::SessionKeys;
use crate::storage::{FirebaseStorage, ObjectStore};
use crate::telemetry;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub sessions: Arc<SessionKeys>,
    /// `None` when no storage bucket is configured; uploads then answer 503
    pub store: Option<Arc<dyn ObjectStore>>,
}

impl AppState {
    /// Build the state from configuration, wiring the Firebase store when a bucket is set.
    pub fn from_config(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<Self> {
        let store = FirebaseStorage::from_config(&config)
            .context("Invalid object storage configuration")?
            .map(|store| Arc::new(store) as Arc<dyn ObjectStore>);
        if store.is_none() {
            tracing::warn!("No storage bucket configured; uploads are disabled");
        }

        Ok(Self {
            sessions: Arc::new(SessionKeys::from_config(&config)),
            config: Arc::new(config),
            db,
            store,
        })
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let upload_limit = state.config.upload_max_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        // Pages
        .route("/", get(pages::brand_list_page))
        .route("/brands/{id}", get(pages::brand_detail_page))
        .route("/auth/login", get(pages::login_page))
        .route("/admin", get(pages::admin_dashboard_page))
        .route(
            "/admin/brands/{id}/offers",
            get(pages::admin_brand_offers_page),
        )
        // Public API
        .route("/api", get(handlers::root))
        .route("/api/brands", get(brands::list_brands))
        .route("/api/brands/{id}", get(brands::get_brand))
        .route("/api/offers", get(offers::list_offers))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/session", get(handlers::auth::session))
        // Admin API
        .route(
            "/api/admin/brands",
            get(brands::list_admin_brands).post(brands::create_brand),
        )
        .route(
            "/api/admin/brands/{id}",
            get(brands::get_admin_brand)
                .put(brands::update_brand)
                .delete(brands::delete_brand),
        )
        .route(
            "/api/admin/brands/{id}/offers",
            get(offers::list_brand_offers).post(offers::create_brand_offer),
        )
        .route("/api/admin/brands/{id}/images", post(images::create_image))
        .route(
            "/api/admin/offers",
            get(offers::list_admin_offers).post(offers::create_offer),
        )
        .route(
            "/api/admin/offers/{id}",
            get(offers::get_offer)
                .put(offers::update_offer)
                .delete(offers::delete_offer),
        )
        .route("/api/admin/images/{id}", delete(images::delete_image))
        .route(
            "/api/admin/upload",
            post(upload::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Operations
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::admin_gate,
        ))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(telemetry::trace_context_middleware))
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .with_context(|| format!("Invalid server address: {}", config.api_bind_addr))?;
    let profile = config.profile.clone();

    let app = create_app(AppState::from_config(config, db)?);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::readyz,
        crate::handlers::brands::list_brands,
        crate::handlers::brands::get_brand,
        crate::handlers::brands::list_admin_brands,
        crate::handlers::brands::create_brand,
        crate::handlers::brands::get_admin_brand,
        crate::handlers::brands::update_brand,
        crate::handlers::brands::delete_brand,
        crate::handlers::offers::list_offers,
        crate::handlers::offers::list_admin_offers,
        crate::handlers::offers::create_offer,
        crate::handlers::offers::list_brand_offers,
        crate::handlers::offers::create_brand_offer,
        crate::handlers::offers::get_offer,
        crate::handlers::offers::update_offer,
        crate::handlers::offers::delete_offer,
        crate::handlers::images::create_image,
        crate::handlers::images::delete_image,
        crate::handlers::upload::upload_file,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::auth::session,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::activity::OfferStatus,
            crate::session::Claims,
        )
    ),
    tags(
        (name = "brands", description = "Public brand directory"),
        (name = "offers", description = "Public offers"),
        (name = "admin", description = "Administration, requires an admin session cookie"),
        (name = "auth", description = "Accounts and sessions"),
    ),
    info(
        title = "Brand Directory API",
        description = "Brands, their promotional offers and images",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_admin_and_public_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/brands"));
        assert!(paths.contains_key("/api/admin/brands/{id}"));
        assert!(paths.contains_key("/api/admin/upload"));
        assert!(paths.contains_key("/api/auth/login"));
    }
}
