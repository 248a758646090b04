use decor_portal::{
    AppConfig, AppState, MemoryRepository, MockStorageService, create_router,
    models::{NewTestimonial, Testimonial},
    repository::RepositoryState,
    storage::StorageState,
};
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub repo: RepositoryState,
}

async fn spawn_app() -> TestApp {
    let repo = Arc::new(MemoryRepository::new()) as RepositoryState;
    let storage = Arc::new(MockStorageService::new()) as StorageState;
    let config = AppConfig::default();

    let state = AppState {
        repo: repo.clone(),
        storage,
        config,
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address, repo }
}

#[tokio::test]
async fn test_contact_submission() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/contact", app.address))
        .json(&serde_json::json!({
            "name": "Priya", "whatsapp": "+919900112233", "queryFor": "Wedding",
            "date": "2026-09-12", "location": "Pune"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Submitted");
    assert_eq!(body["contact"]["name"], "Priya");
}

#[tokio::test]
async fn test_contact_rejects_missing_or_blank_fields() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Whitespace-only counts as missing.
    let blank = client
        .post(format!("{}/api/contact", app.address))
        .json(&serde_json::json!({
            "name": "Priya", "whatsapp": "  ", "queryFor": "Wedding",
            "date": "2026-09-12", "location": "Pune"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank.status(), 400);
    let body: serde_json::Value = blank.json().await.unwrap();
    assert_eq!(body["error"], "All fields are required");

    // A structurally missing field fails typed deserialization before the
    // handler runs.
    let missing = client
        .post(format!("{}/api/contact", app.address))
        .json(&serde_json::json!({
            "name": "Priya", "queryFor": "Wedding",
            "date": "2026-09-12", "location": "Pune"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 422);
}

#[tokio::test]
async fn test_testimonials_list_newest_first_without_credentials() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    for name in ["First", "Second", "Third"] {
        app.repo
            .create_testimonial(NewTestimonial {
                name: name.to_string(),
                message: "Lovely decor".to_string(),
                video_url: "/uploads/1-clip.mp4".to_string(),
            })
            .await
            .unwrap();
    }

    let list: Vec<Testimonial> = client
        .get(format!("{}/api/testimonials", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0].name, "Third");
    assert_eq!(list[2].name, "First");
}

#[tokio::test]
async fn test_unknown_ids_are_404() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    for path in [
        "/api/events/000000000000000000000000",
        "/api/event-category/000000000000000000000000",
        "/api/gallery/000000000000000000000000",
    ] {
        let resp = client
            .get(format!("{}{}", app.address, path))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404, "expected 404 for {path}");
    }
}
