//! End-to-end tests for the gallery API, driving the production router
//! over the in-memory object store.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tower::ServiceExt;

use gallery_gateway::{
    config::AppConfig,
    routes,
    services::{gallery_service::GalleryService, memory_store::MemoryObjectStore},
};

const BOUNDARY: &str = "gallery-test-boundary";

fn build_app(cfg: AppConfig, store: Arc<MemoryObjectStore>) -> Router {
    let service = GalleryService::new(store, &cfg);
    routes::app(service, &cfg).expect("router should build")
}

fn test_app() -> (Router, Arc<MemoryObjectStore>) {
    let store = Arc::new(MemoryObjectStore::new());
    (build_app(AppConfig::default(), store.clone()), store)
}

fn multipart_body(field: &str, file_name: &str, content_type: &str, payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(field: &str, file_name: &str, content_type: &str, payload: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, file_name, content_type, payload)))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = test_app();
    let response = app.oneshot(get("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn readiness_reflects_the_store() {
    let (app, _) = test_app();
    let response = app.oneshot(get("/readyz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"]["ok"], true);
}

#[tokio::test]
async fn upload_round_trip() {
    let (app, _) = test_app();
    let response = app
        .oneshot(upload_request("image", "cat.png", "image/png", b"png-bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);

    let key = body["key"].as_str().unwrap();
    assert!(key.starts_with("images/"));
    assert!(key.ends_with(".png"));
    assert_eq!(format!("images/{}", body["fileName"].as_str().unwrap()), key);
    assert!(body["url"].as_str().unwrap().ends_with(key));
}

#[tokio::test]
async fn upload_without_image_field_is_rejected() {
    let (app, _) = test_app();
    let response = app
        .oneshot(upload_request("attachment", "cat.png", "image/png", b"png-bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "No file provided");
}

#[tokio::test]
async fn upload_rejects_non_image_content() {
    let (app, _) = test_app();
    let response = app
        .oneshot(upload_request("image", "notes.txt", "text/plain", b"hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Only image files are allowed");
}

#[tokio::test]
async fn upload_rejects_oversized_files() {
    let mut cfg = AppConfig::default();
    cfg.max_upload_bytes = 16;
    let app = build_app(cfg, Arc::new(MemoryObjectStore::new()));

    let response = app
        .oneshot(upload_request("image", "big.png", "image/png", &[0u8; 64]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("File too large"));
}

#[tokio::test]
async fn listing_matches_the_ui_contract() {
    let store = Arc::new(MemoryObjectStore::new());
    let app = build_app(AppConfig::default(), store.clone());

    for (i, name) in ["a.png", "b.jpg", "c.gif"].iter().enumerate() {
        store
            .seed(
                &format!("images/{name}"),
                Bytes::from_static(b"img"),
                Utc.with_ymd_and_hms(2026, 8, 1, 10, i as u32, 0).unwrap(),
            )
            .await;
    }

    let response = app.oneshot(get("/api/images")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["totalCount"], 3);
    assert_eq!(body["totalPages"], 1);
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["hasMore"], false);

    let images = body["images"].as_array().unwrap();
    assert_eq!(images.len(), 3);
    assert_eq!(images[0]["key"], "images/c.gif");
    for image in images {
        assert!(image["url"].as_str().unwrap().starts_with("https://"));
        assert!(image["lastModified"].as_str().is_some());
        assert!(image["size"].as_i64().unwrap() > 0);
    }
}

#[tokio::test]
async fn pagination_scenario_over_a_multi_round_enumeration() {
    // Raw page size 7 forces several continuation rounds under 25 keys.
    let store = Arc::new(MemoryObjectStore::with_page_size(7));
    let app = build_app(AppConfig::default(), store.clone());

    for i in 0..25 {
        store
            .seed(
                &format!("images/{i:02}.png"),
                Bytes::from_static(b"img"),
                Utc.with_ymd_and_hms(2026, 8, 1, 10, i, 0).unwrap(),
            )
            .await;
    }

    let first = json_body(
        app.clone()
            .oneshot(get("/api/images?page=1&limit=12"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(first["totalCount"], 25);
    assert_eq!(first["totalPages"], 3);
    assert_eq!(first["hasMore"], true);
    assert_eq!(first["images"].as_array().unwrap().len(), 12);
    assert_eq!(first["images"][0]["key"], "images/24.png");

    let last = json_body(
        app.clone()
            .oneshot(get("/api/images?page=3&limit=12"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(last["images"].as_array().unwrap().len(), 1);
    assert_eq!(last["images"][0]["key"], "images/00.png");
    assert_eq!(last["hasMore"], false);

    // The three pages together cover every key exactly once.
    let mut seen = HashSet::new();
    for page in 1..=3 {
        let body = json_body(
            app.clone()
                .oneshot(get(&format!("/api/images?page={page}&limit=12")))
                .await
                .unwrap(),
        )
        .await;
        for image in body["images"].as_array().unwrap() {
            assert!(seen.insert(image["key"].as_str().unwrap().to_string()));
        }
    }
    assert_eq!(seen.len(), 25);
}

#[tokio::test]
async fn deleting_twice_succeeds() {
    let (app, _) = test_app();

    let uploaded = json_body(
        app.clone()
            .oneshot(upload_request("image", "cat.png", "image/png", b"png-bytes"))
            .await
            .unwrap(),
    )
    .await;
    let key = uploaded["key"].as_str().unwrap().to_string();
    let uri = format!("/api/images/{key}");

    let first = app.clone().oneshot(delete(&uri)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let body = json_body(first).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Image deleted successfully");

    let second = app.clone().oneshot(delete(&uri)).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);

    let listing = json_body(app.oneshot(get("/api/images")).await.unwrap()).await;
    assert_eq!(listing["totalCount"], 0);
}

#[tokio::test]
async fn metadata_round_trip() {
    let (app, _) = test_app();

    let uploaded = json_body(
        app.clone()
            .oneshot(upload_request("image", "cat.png", "image/png", b"png-bytes"))
            .await
            .unwrap(),
    )
    .await;
    let key = uploaded["key"].as_str().unwrap().to_string();

    let response = app
        .oneshot(get(&format!("/api/images/{key}/metadata")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["key"], key.as_str());
    assert_eq!(body["size"], 9);
    assert_eq!(body["contentType"], "image/png");
    assert_eq!(body["metadata"]["originalname"], "cat.png");
    assert!(body["metadata"]["uploadedat"].as_str().is_some());
}

#[tokio::test]
async fn metadata_for_missing_key_is_not_found() {
    let (app, _) = test_app();

    let response = app
        .oneshot(get("/api/images/images/nope.png/metadata"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Image not found");
}

#[tokio::test]
async fn simultaneous_uploads_each_appear_once() {
    let (app, _) = test_app();

    let send = |name: String| {
        let app = app.clone();
        async move {
            json_body(
                app.oneshot(upload_request("image", &name, "image/png", b"png-bytes"))
                    .await
                    .unwrap(),
            )
            .await
        }
    };

    let (a, b, c, d, e) = tokio::join!(
        send("a.png".into()),
        send("b.png".into()),
        send("c.png".into()),
        send("d.png".into()),
        send("e.png".into()),
    );

    let mut keys = HashSet::new();
    for body in [a, b, c, d, e] {
        assert_eq!(body["success"], true);
        keys.insert(body["key"].as_str().unwrap().to_string());
    }
    assert_eq!(keys.len(), 5);

    let listing = json_body(app.oneshot(get("/api/images")).await.unwrap()).await;
    assert_eq!(listing["totalCount"], 5);
    let listed: HashSet<String> = listing["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|image| image["key"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(listed, keys);
}
