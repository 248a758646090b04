use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod storage;

// Module for routing segregation (Public, Admin).
pub mod routes;
use routes::{admin, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the application entry point
// and the integration tests.
pub use config::AppConfig;
pub use repository::{MemoryRepository, MongoRepository, RepositoryState};
pub use storage::{LocalStorage, MockStorageService, StorageState};

/// Uploaded testimonial videos can be large; the default 2 MB body limit
/// would reject them.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the
/// application from the `#[utoipa::path]` and `ToSchema` decorations.
/// The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login,
        handlers::get_users, handlers::create_user, handlers::get_user_detail,
        handlers::update_user, handlers::delete_user,
        handlers::get_events, handlers::get_event_detail, handlers::create_event,
        handlers::update_event, handlers::delete_event,
        handlers::get_event_categories, handlers::get_event_category_detail,
        handlers::create_event_category, handlers::update_event_category,
        handlers::delete_event_category,
        handlers::get_testimonials, handlers::create_testimonial,
        handlers::update_testimonial, handlers::delete_testimonial,
        handlers::create_contact, handlers::get_contacts,
        handlers::get_gallery, handlers::get_gallery_image,
        handlers::upload_gallery_image, handlers::delete_gallery_image,
    ),
    components(
        schemas(
            models::User, models::Event, models::EventCategory, models::Testimonial,
            models::Contact, models::GalleryImage,
            models::LoginRequest, models::CreateUserRequest, models::UpdateUserRequest,
            models::CreateEventRequest, models::UpdateEventRequest,
            models::CreateEventCategoryRequest, models::UpdateEventCategoryRequest,
            models::UpdateTestimonialRequest, models::CreateContactRequest,
            models::LoginResponse, models::UserEnvelope, models::ContactEnvelope,
            models::ContactList, models::MessageResponse,
        )
    ),
    tags(
        (name = "decor-portal", description = "Event decoration portal API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe container holding all application services and
/// configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: abstracts the document store.
    pub repo: RepositoryState,
    /// Storage Layer: abstracts the upload filesystem.
    pub storage: StorageState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Let extractors pull individual components out of the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// require_session_token
///
/// The route perimeter for the admin surface: requests without a session
/// token (cookie or bearer header) are redirected to the login page before
/// any handler runs.
///
/// *Presence only*: the token is not validated here. Signature validation
/// and the admin-role check happen independently inside each handler via
/// the `Session` extractor, so a forged token passes this layer but is
/// rejected at the next one.
async fn require_session_token(request: Request, next: Next) -> Response {
    if auth::session_token(request.headers()).is_none() {
        return Redirect::to("/login").into_response();
    }
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // Static file service for uploaded media. Records store paths such as
    // "/uploads/<ts>-clip.mp4"; these are served straight from the public
    // directory.
    let uploads_dir = ServeDir::new(state.config.public_dir.join("uploads"));
    let gallery_dir = ServeDir::new(state.config.public_dir.join("uploadGallery"));

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: no middleware applied.
        .merge(public::public_routes())
        // Admin Routes: behind the session-token perimeter. Merging (rather
        // than nesting) keeps the original public paths while the layer
        // applies only to the admin methods.
        .merge(admin::admin_routes().route_layer(middleware::from_fn(require_session_token)))
        // Uploaded media is publicly servable once stored.
        .nest_service("/uploads", uploads_dir)
        .nest_service("/uploadGallery", gallery_dir)
        // Multipart video uploads exceed the default body limit.
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        // Apply the Unified State to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (applied outermost)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID generation: a unique UUID per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request tracing: wraps the request/response lifecycle in
                // a span carrying the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS layer
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes the `TraceLayer` span: every log line for a single request is
/// correlated by the `x-request-id` header alongside method and URI.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
