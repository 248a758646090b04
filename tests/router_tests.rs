//! In-process router tests driving the assembled app with `oneshot`
//! requests, no TCP listener involved.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use decor_portal::{
    AppConfig, AppState, MemoryRepository, MockStorageService, create_router,
    repository::RepositoryState,
    storage::StorageState,
};
use std::sync::Arc;
use tower::ServiceExt;

fn test_router() -> Router {
    let state = AppState {
        repo: Arc::new(MemoryRepository::new()) as RepositoryState,
        storage: Arc::new(MockStorageService::new()) as StorageState,
        config: AppConfig::default(),
    };
    create_router(state)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_router();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = test_router();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // The correlation header is generated when absent and propagated back.
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_public_reads_are_open() {
    let app = test_router();

    for uri in ["/api/events", "/api/event-category", "/api/testimonials", "/api/gallery"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "expected open read for {uri}");
    }
}

#[tokio::test]
async fn test_mutations_sit_behind_the_perimeter() {
    let app = test_router();

    for (method, uri) in [
        ("POST", "/api/events"),
        ("POST", "/api/event-category"),
        ("POST", "/api/gallery"),
        ("GET", "/api/users"),
        ("GET", "/api/contact"),
        ("DELETE", "/api/events/000000000000000000000000"),
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::SEE_OTHER,
            "expected login redirect for {method} {uri}"
        );
        assert_eq!(response.headers().get("location").unwrap(), "/login");
    }
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
