use decor_portal::{
    AppConfig, AppState, MemoryRepository, MockStorageService, auth, create_router,
    models::{GalleryImage, NewUser, Testimonial},
    repository::RepositoryState,
    storage::StorageState,
};
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub repo: RepositoryState,
    pub storage: Arc<MockStorageService>,
}

/// Storage failure modes are switchable per test, so the mock is built by
/// the caller and kept reachable for assertions.
async fn spawn_app(storage: MockStorageService) -> TestApp {
    let repo = Arc::new(MemoryRepository::new()) as RepositoryState;
    let storage = Arc::new(storage);
    let config = AppConfig::default();

    let state = AppState {
        repo: repo.clone(),
        storage: storage.clone() as StorageState,
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

    TestApp {
        address,
        repo,
        storage,
    }
}

async fn admin_token(app: &TestApp, client: &reqwest::Client) -> String {
    app.repo
        .create_user(NewUser {
            name: "Admin".to_string(),
            email: "admin@decor.test".to_string(),
            password_hash: auth::hash_password("hunter2").unwrap(),
            role: "admin".to_string(),
        })
        .await
        .unwrap();
    let resp = client
        .post(format!("{}/api/users/login", app.address))
        .json(&serde_json::json!({"email": "admin@decor.test", "password": "hunter2"}))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

fn video_form() -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .text("name", "Asha")
        .text("message", "Beautiful wedding setup")
        .part(
            "video",
            reqwest::multipart::Part::bytes(vec![0u8; 16]).file_name("clip.mp4"),
        )
}

#[tokio::test]
async fn test_testimonial_upload() {
    let app = spawn_app(MockStorageService::new()).await;
    let client = reqwest::Client::new();
    let token = admin_token(&app, &client).await;

    let resp = client
        .post(format!("{}/api/testimonials", app.address))
        .bearer_auth(&token)
        .multipart(video_form())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let testimonial: Testimonial = resp.json().await.unwrap();
    assert_eq!(testimonial.name, "Asha");
    assert!(testimonial.video_url.starts_with("/uploads/"));
    assert!(testimonial.video_url.ends_with("clip.mp4"));

    // The file went through the storage layer.
    assert_eq!(app.storage.saved_paths(), vec![testimonial.video_url]);
}

#[tokio::test]
async fn test_testimonial_requires_all_parts() {
    let app = spawn_app(MockStorageService::new()).await;
    let client = reqwest::Client::new();
    let token = admin_token(&app, &client).await;

    // No video file.
    let no_video = reqwest::multipart::Form::new()
        .text("name", "Asha")
        .text("message", "Beautiful");
    let resp = client
        .post(format!("{}/api/testimonials", app.address))
        .bearer_auth(&token)
        .multipart(no_video)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // No message text.
    let no_message = reqwest::multipart::Form::new().text("name", "Asha").part(
        "video",
        reqwest::multipart::Part::bytes(vec![0u8; 16]).file_name("clip.mp4"),
    );
    let resp = client
        .post(format!("{}/api/testimonials", app.address))
        .bearer_auth(&token)
        .multipart(no_message)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_gallery_upload_and_listing() {
    let app = spawn_app(MockStorageService::new()).await;
    let client = reqwest::Client::new();
    let token = admin_token(&app, &client).await;

    let form = reqwest::multipart::Form::new()
        .text("title", "Mandap")
        .text("description", "Floral arch")
        .part(
            "file",
            reqwest::multipart::Part::bytes(vec![1u8; 16]).file_name("arch.jpg"),
        );
    let resp = client
        .post(format!("{}/api/gallery", app.address))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let image: GalleryImage = resp.json().await.unwrap();
    assert!(image.path.starts_with("/uploadGallery/"));
    assert_eq!(image.title.as_deref(), Some("Mandap"));

    // Publicly listable.
    let list: Vec<GalleryImage> = client
        .get(format!("{}/api/gallery", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, image.id);
}

#[tokio::test]
async fn test_gallery_upload_requires_file() {
    let app = spawn_app(MockStorageService::new()).await;
    let client = reqwest::Client::new();
    let token = admin_token(&app, &client).await;

    let form = reqwest::multipart::Form::new().text("title", "Mandap");
    let resp = client
        .post(format!("{}/api/gallery", app.address))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "No file uploaded");
}

#[tokio::test]
async fn test_gallery_delete_survives_unlink_failure() {
    // Saves succeed but removals fail, as when the backing file has
    // already disappeared out-of-band.
    let app = spawn_app(MockStorageService::failing_removal()).await;
    let client = reqwest::Client::new();
    let token = admin_token(&app, &client).await;

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(vec![1u8; 16]).file_name("arch.jpg"),
    );
    let image: GalleryImage = client
        .post(format!("{}/api/gallery", app.address))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // The request still succeeds and the record is gone.
    let del = client
        .delete(format!("{}/api/gallery/{}", app.address, image.id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(del.status(), 200);

    let gone = client
        .get(format!("{}/api/gallery/{}", app.address, image.id))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), 404);

    // Deleting again is a 404, not an error.
    let again = client
        .delete(format!("{}/api/gallery/{}", app.address, image.id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), 404);
}
