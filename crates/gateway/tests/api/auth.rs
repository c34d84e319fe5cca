use crate::helpers::{api_get, spawn_app, MockMetobs};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use metobs_gateway::metobs::ParameterResponse;
use tower::ServiceExt;

fn bare_get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn requests_without_a_key_are_unauthorized() {
    let app = spawn_app(MockMetobs::new());
    let response = app.oneshot(bare_get("/api/stations")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn requests_with_an_unknown_key_are_forbidden() {
    let app = spawn_app(MockMetobs::new());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/stations")
                .header("X-API-Key", "not-the-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn requests_with_the_configured_key_pass_the_gate() {
    let mut metobs = MockMetobs::new();
    metobs
        .expect_stations()
        .returning(|_| Ok(ParameterResponse::default()));

    let app = spawn_app(metobs);
    let response = app.oneshot(api_get("/api/stations")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn openapi_document_is_served_without_a_key() {
    let app = spawn_app(MockMetobs::new());
    let response = app.oneshot(bare_get("/openapi/v1.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = crate::helpers::body_json(response).await;
    assert!(body["paths"]["/api/stations"].is_object());
}

#[tokio::test]
async fn scalar_docs_are_served_without_a_key() {
    let app = spawn_app(MockMetobs::new());
    let response = app.oneshot(bare_get("/scalar")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
