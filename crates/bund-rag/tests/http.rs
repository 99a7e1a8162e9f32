//! Router tests for /upload, /rag, /clear and /health

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use bund_rag::server::RagServer;

use common::{long_paragraph, Harness, RecordingLlm};

const BOUNDARY: &str = "bund-rag-test-boundary";

fn multipart_body(files: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (filename, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn upload_request(files: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(files)))
        .unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let harness = Harness::new();
    let router = RagServer::from_state(harness.state.clone()).router();

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_upload_then_rag() {
    let harness = Harness::new();
    let router = RagServer::from_state(harness.state.clone()).router();
    let paragraph = long_paragraph();

    let response = router
        .clone()
        .oneshot(upload_request(&[("story.md", paragraph.as_str())]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Successfully uploaded 1 file(s) in 3 chunks to the vector store"
    );

    let response = router
        .oneshot(json_request("/rag", json!({ "user_query": "lighthouse" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["response"], RecordingLlm::ANSWER);

    let prompt = harness.llm.last_prompt().unwrap();
    assert!(prompt.contains("The lighthouse keeper counted the ship."));
}

#[tokio::test]
async fn test_unsupported_upload_is_500_with_detail() {
    let harness = Harness::new();
    let router = RagServer::from_state(harness.state.clone()).router();

    let response = router
        .oneshot(upload_request(&[("diagram.xyz", "not a document")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().starts_with("Unsupported file format"));
    assert_eq!(harness.stored_points().await, 0);
}

#[tokio::test]
async fn test_clear_message_and_effect() {
    let harness = Harness::new();
    let router = RagServer::from_state(harness.state.clone()).router();

    router
        .clone()
        .oneshot(upload_request(&[("a.txt", "harbour"), ("b.txt", "bakery")]))
        .await
        .unwrap();
    assert_eq!(harness.stored_points().await, 2);

    let response = router
        .oneshot(Request::builder().method("POST").uri("/clear").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Successfully cleared files and in-memory collection"
    );
    assert_eq!(harness.stored_points().await, 0);
    assert_eq!(harness.uploaded_files(), 0);
}

#[tokio::test]
async fn test_rag_rejects_missing_field() {
    let harness = Harness::new();
    let router = RagServer::from_state(harness.state.clone()).router();

    let response = router
        .oneshot(json_request("/rag", json!({ "question": "wrong key" })))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_cors_headers_on_traced_routes() {
    let harness = Harness::new();
    let router = RagServer::from_state(harness.state.clone()).router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_router_without_cors() {
    let harness = Harness::with_config(|config| config.server.enable_cors = false);
    let router = RagServer::from_state(harness.state.clone()).router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
