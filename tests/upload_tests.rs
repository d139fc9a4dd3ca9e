//! Upload proxy against a mocked Firebase Storage endpoint.

mod test_utils;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use brand_directory::{config::AppConfig, storage::FirebaseStorage};
use serde_json::json;
use test_utils::{TestApp, test_config};
use wiremock::matchers::{header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOUNDARY: &str = "brand-directory-test-boundary";

fn multipart_body(field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(app: &TestApp, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/admin/upload")
        .header(header::COOKIE, app.admin_cookie())
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn app_with_store(server: &MockServer, config: AppConfig) -> TestApp {
    let store = FirebaseStorage::new(&server.uri(), "test-bucket", Some("storage-token".into()))
        .unwrap();
    TestApp::with(config, Some(Arc::new(store))).await.unwrap()
}

#[tokio::test]
async fn upload_returns_public_download_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v0/b/test-bucket/o"))
        .and(header_matcher("authorization", "Bearer storage-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "brands/stored.png",
            "downloadTokens": "tok-1,tok-2"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let app = app_with_store(&server, test_config()).await;

    let response = app
        .send(upload_request(
            &app,
            multipart_body("file", "Logo.PNG", "image/png", b"\x89PNG fake"),
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json["url"],
        format!(
            "{}/v0/b/test-bucket/o/brands%2Fstored.png?alt=media&token=tok-1",
            server.uri()
        )
    );

    let requests = server.received_requests().await.unwrap();
    let name = requests[0]
        .url
        .query_pairs()
        .find(|(key, _)| key == "name")
        .map(|(_, value)| value.into_owned())
        .unwrap();
    assert!(name.starts_with("brands/"));
    assert!(name.ends_with(".png"));
    assert_eq!(requests[0].body, b"\x89PNG fake");
}

#[tokio::test]
async fn upstream_failure_is_reported_with_details() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
        .mount(&server)
        .await;
    let app = app_with_store(&server, test_config()).await;

    let response = app
        .send(upload_request(
            &app,
            multipart_body("file", "logo.png", "image/png", b"data"),
        ))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json["error"], "Failed to upload file");
    assert_eq!(response.json["details"]["reason"], "upstream");
    assert_eq!(response.json["details"]["status"], 403);
    assert!(!response.text.contains("permission denied"));
}

#[tokio::test]
async fn request_without_file_field_is_rejected() {
    let server = MockServer::start().await;
    let app = app_with_store(&server, test_config()).await;

    let response = app
        .send(upload_request(
            &app,
            multipart_body("attachment", "logo.png", "image/png", b"data"),
        ))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json["error"], "No file provided");
}

#[tokio::test]
async fn unsupported_type_and_oversized_files_are_rejected() {
    let server = MockServer::start().await;
    let config = AppConfig {
        upload_max_bytes: 16,
        ..test_config()
    };
    let app = app_with_store(&server, config).await;

    let response = app
        .send(upload_request(
            &app,
            multipart_body("file", "notes.txt", "text/plain", b"hello"),
        ))
        .await;
    assert_eq!(response.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let response = app
        .send(upload_request(
            &app,
            multipart_body("file", "big.png", "image/png", &[0u8; 64]),
        ))
        .await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_without_configured_store_is_unavailable() {
    let app = TestApp::new().await.unwrap();

    let response = app
        .send(upload_request(
            &app,
            multipart_body("file", "logo.png", "image/png", b"data"),
        ))
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}
