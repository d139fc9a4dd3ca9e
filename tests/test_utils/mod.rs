//! Test utilities for database and router testing.
//!
//! Every test gets its own in-memory SQLite database with all migrations
//! applied, and drives the real router through `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use brand_directory::{
    config::AppConfig,
    models::{brand, image, offer, user::Role},
    server::{AppState, create_app},
    session::{Claims, SESSION_COOKIE, SessionKeys},
    storage::ObjectStore,
};
use chrono::{DateTime, Duration, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const REGISTRATION_KEY: &str = "registration-key-for-tests";

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Configuration used by the router tests.
pub fn test_config() -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        session_secret: TEST_SECRET.to_string(),
        admin_registration_key: Some(REGISTRATION_KEY.to_string()),
        ..Default::default()
    }
}

/// A router over a fresh database.
pub struct TestApp {
    pub db: DatabaseConnection,
    pub state: AppState,
    router: Router,
}

/// Response with its body decoded as JSON (or `Value::Null` when it is not JSON).
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
    pub json: Value,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        Self::with(test_config(), None).await
    }

    pub async fn with(config: AppConfig, store: Option<Arc<dyn ObjectStore>>) -> Result<Self> {
        let db = setup_test_db().await?;
        let state = AppState {
            sessions: Arc::new(SessionKeys::from_config(&config)),
            config: Arc::new(config),
            db: db.clone(),
            store,
        };
        let router = create_app(state.clone());
        Ok(Self { db, state, router })
    }

    /// `Cookie` header value for a signed-in account with the given role.
    pub fn cookie_for(&self, role: Role) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            name: "Test Admin".to_string(),
            email: "admin@example.com".to_string(),
            role,
            iat: now,
            exp: now + 3600,
        };
        let token = self.state.sessions.sign(&claims).expect("sign test claims");
        format!("{SESSION_COOKIE}={token}")
    }

    pub fn admin_cookie(&self) -> String {
        self.cookie_for(Role::Admin)
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            text,
            json,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
    }

    /// JSON request carrying the admin cookie.
    pub async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, self.admin_cookie());
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).expect("request")).await
    }

    /// Unauthenticated JSON POST.
    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
    }
}

/// Inserts a brand directly.
pub async fn insert_brand(db: &DatabaseConnection, name: &str) -> Result<brand::Model> {
    let now = Utc::now().fixed_offset();
    let brand = brand::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(format!("{name} makes things people like")),
        logo: Set(format!("https://cdn.example.com/{}.png", name.to_lowercase())),
        location: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok(brand)
}

/// Inserts an offer directly, bypassing validation so any window can be stored.
pub async fn insert_offer(
    db: &DatabaseConnection,
    brand_id: Uuid,
    title: &str,
    active: bool,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> Result<offer::Model> {
    let now = Utc::now().fixed_offset();
    let offer = offer::ActiveModel {
        id: Set(Uuid::new_v4()),
        brand_id: Set(brand_id),
        title: Set(title.to_string()),
        description: Set(format!("{title} for a limited time")),
        start_date: Set(start.fixed_offset()),
        end_date: Set(end.map(|end| end.fixed_offset())),
        coupon_code: Set(None),
        discount_percent: Set(Some(20)),
        active: Set(active),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok(offer)
}

/// Inserts an image directly.
pub async fn insert_image(db: &DatabaseConnection, brand_id: Uuid, url: &str) -> Result<image::Model> {
    let image = image::ActiveModel {
        id: Set(Uuid::new_v4()),
        brand_id: Set(brand_id),
        url: Set(url.to_string()),
        alt_text: Set(None),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(db)
    .await?;
    Ok(image)
}

/// Offer fixtures relative to `now`: (effective, expired, scheduled, inactive).
pub async fn insert_offer_mix(
    db: &DatabaseConnection,
    brand_id: Uuid,
) -> Result<[offer::Model; 4]> {
    let now = Utc::now();
    Ok([
        insert_offer(db, brand_id, "Running sale", true, now - Duration::days(1), Some(now + Duration::days(5))).await?,
        insert_offer(db, brand_id, "Past sale", true, now - Duration::days(10), Some(now - Duration::days(1))).await?,
        insert_offer(db, brand_id, "Future sale", true, now + Duration::days(3), None).await?,
        insert_offer(db, brand_id, "Paused sale", false, now - Duration::days(1), None).await?,
    ])
}
