use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Admin Router Module
///
/// The back-office mutation surface plus the two admin-only reads (user
/// listing and contact submissions).
///
/// Access Control:
/// This router is mounted behind the session-token perimeter middleware in
/// `lib.rs`, which redirects token-less requests to /login. The perimeter
/// checks presence only; each handler then validates the token through the
/// `Session` extractor and calls `require_admin()`, so a forged or
/// non-admin token passes the perimeter but is rejected with 401/403 here.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // Credential store. Reads exclude the password hash; creation
        // hashes the plaintext before persisting.
        .route(
            "/api/users",
            get(handlers::get_users).post(handlers::create_user),
        )
        .route(
            "/api/users/{id}",
            get(handlers::get_user_detail)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // Event (service) mutations. The read side of the same paths is
        // served by the public router.
        .route("/api/events", post(handlers::create_event))
        .route(
            "/api/events/{id}",
            put(handlers::update_event).delete(handlers::delete_event),
        )
        // Event-category mutations.
        .route(
            "/api/event-category",
            post(handlers::create_event_category),
        )
        .route(
            "/api/event-category/{id}",
            put(handlers::update_event_category).delete(handlers::delete_event_category),
        )
        // Testimonial mutations. Creation is a multipart upload (video file).
        .route("/api/testimonials", post(handlers::create_testimonial))
        .route(
            "/api/testimonials/{id}",
            put(handlers::update_testimonial).delete(handlers::delete_testimonial),
        )
        // GET /api/contact
        // Dashboard listing of contact submissions, newest first.
        .route("/api/contact", get(handlers::get_contacts))
        // Gallery: multipart upload and the two-step delete (record first,
        // then best-effort file unlink).
        .route("/api/gallery", post(handlers::upload_gallery_image))
        .route("/api/gallery/{id}", delete(handlers::delete_gallery_image))
}
