//! API integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use slidepdf_api::{create_router, ApiConfig, AppState};
use slidepdf_jobstore::{JobStore, StoreConfig};

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

fn test_state(config: ApiConfig) -> AppState {
    let store_config = StoreConfig {
        redis_url: std::env::var("REDIS_URL")
            .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        ..StoreConfig::default()
    };
    AppState {
        config,
        store: Arc::new(JobStore::new(store_config).expect("Failed to create job store")),
    }
}

fn multipart_upload(filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/convert")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Test health endpoint.
#[tokio::test]
async fn test_health_endpoint() {
    let app = create_router(test_state(ApiConfig::default()), None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

/// A disallowed extension is rejected before any job is created, and the
/// error names the accepted formats.
#[tokio::test]
async fn test_convert_rejects_disallowed_extension() {
    let app = create_router(test_state(ApiConfig::default()), None);

    let response = app
        .oneshot(multipart_upload("notes.txt", b"hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    let detail = json["detail"].as_str().unwrap();
    assert!(detail.contains(".ppt"), "detail should name accepted formats");
}

/// A multipart body without a `file` field is rejected.
#[tokio::test]
async fn test_convert_rejects_missing_file_field() {
    let app = create_router(test_state(ApiConfig::default()), None);

    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/convert")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// When an API key is configured, job endpoints demand it.
#[tokio::test]
async fn test_api_key_enforcement() {
    let config = ApiConfig {
        api_key: Some("sekret".to_string()),
        ..ApiConfig::default()
    };
    let app = create_router(test_state(config), None);

    // Missing key
    let response = app
        .clone()
        .oneshot(multipart_upload("deck.pptx", b"bytes"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Wrong key
    let mut request = multipart_upload("deck.pptx", b"bytes");
    request
        .headers_mut()
        .insert("X-API-Key", "wrong".parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Health is not guarded
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Submission creates a queued job that immediately reports `processing`.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_submit_then_poll_status() {
    let upload_dir = tempfile::tempdir().unwrap();
    let config = ApiConfig {
        upload_dir: upload_dir.path().to_path_buf(),
        ..ApiConfig::default()
    };
    let app = create_router(test_state(config), None);

    let response = app
        .clone()
        .oneshot(multipart_upload("deck.pptx", b"deck bytes"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    let job_id = json["job_id"].as_str().unwrap().to_string();
    assert!(!job_id.is_empty());

    // The spooled file exists until a worker finishes the job
    assert_eq!(std::fs::read_dir(upload_dir.path()).unwrap().count(), 1);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/status/{}", job_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "processing");
}

/// Unknown job ids yield 404.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_status_unknown_job() {
    let app = create_router(test_state(ApiConfig::default()), None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/status/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
