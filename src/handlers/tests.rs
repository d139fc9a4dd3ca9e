//! # Tests for Handlers
//!
//! Handler-level tests that do not need a migrated database.

use std::sync::Arc;

use axum::{extract::State, response::Json};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::handlers::{healthz, readyz, root};
use crate::models::ServiceInfo;
use crate::server::AppState;
use crate::session::SessionKeys;

fn state_with(db: DatabaseConnection) -> AppState {
    AppState {
        config: Arc::new(AppConfig::default()),
        db,
        sessions: Arc::new(SessionKeys::new(
            b"handler-tests-secret-handler-tests",
            3600,
            false,
        )),
        store: None,
    }
}

#[tokio::test]
async fn test_root_handler_returns_expected_service_info() {
    let Json(service_info) = root().await;
    let expected = ServiceInfo::default();

    assert_eq!(service_info.service, "brand-directory");
    assert_eq!(service_info.version, expected.version);
}

#[tokio::test]
async fn test_healthz_is_always_ok() {
    let Json(health) = healthz().await;
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_readyz_with_sqlite_memory_database() {
    let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
    let Json(health) = readyz(State(state_with(db))).await.unwrap();
    assert_eq!(health.status, "ready");
}
