//! Server-rendered public pages.

mod test_utils;

use axum::http::{StatusCode, header};
use test_utils::{TestApp, insert_brand, insert_offer_mix};

#[tokio::test]
async fn brand_list_page_renders_brands_and_search() {
    let app = TestApp::new().await.unwrap();
    let acme = insert_brand(&app.db, "Acme").await.unwrap();
    insert_brand(&app.db, "Zenith").await.unwrap();
    insert_offer_mix(&app.db, acme.id).await.unwrap();

    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response.headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert!(response.text.contains(&format!("/brands/{}", acme.id)));
    assert!(response.text.contains("1 active offers"));
    assert!(response.text.contains("Zenith"));

    let response = app.get("/?search=%3Cscript%3E").await;
    assert!(response.text.contains("No brands found."));
    assert!(response.text.contains("&lt;script&gt;"));
    assert!(!response.text.contains("<script>alert"));
}

#[tokio::test]
async fn brand_detail_page_lists_only_running_offers() {
    let app = TestApp::new().await.unwrap();
    let brand = insert_brand(&app.db, "Acme").await.unwrap();
    insert_offer_mix(&app.db, brand.id).await.unwrap();

    let response = app.get(&format!("/brands/{}", brand.id)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("Running sale"));
    assert!(!response.text.contains("Past sale"));
    assert!(!response.text.contains("Future sale"));
    assert!(!response.text.contains("Paused sale"));
}

#[tokio::test]
async fn missing_brand_page_is_html_not_found() {
    let app = TestApp::new().await.unwrap();

    let response = app
        .get(&format!("/brands/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(
        response.headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );

    let response = app.get("/brands/not-a-uuid").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_page_keeps_only_local_callbacks() {
    let app = TestApp::new().await.unwrap();

    let response = app
        .get("/auth/login?callbackUrl=%2Fadmin%2Fbrands")
        .await;
    assert!(response.text.contains("data-callback=\"/admin/brands\""));

    let response = app
        .get("/auth/login?callbackUrl=https%3A%2F%2Fevil.example")
        .await;
    assert!(response.text.contains("data-callback=\"/admin\""));
}
