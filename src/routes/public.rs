use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// The unauthenticated surface: everything the marketing site renders, plus
/// the contact form (the single anonymous mutation) and the login endpoint.
/// Read handlers return full collections; no pagination is applied at this
/// scale.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring.
        .route("/health", get(|| async { "ok" }))
        // POST /api/users/login
        // Credential verification and session-token issuance. Lives under
        // the users path but is deliberately outside the admin perimeter.
        .route("/api/users/login", post(handlers::login))
        // GET /api/events, GET /api/events/{id}
        // The decoration services shown on the site.
        .route("/api/events", get(handlers::get_events))
        .route("/api/events/{id}", get(handlers::get_event_detail))
        // GET /api/event-category?eventName=..., GET /api/event-category/{id}
        // Priced packages, optionally filtered by exact event name.
        .route("/api/event-category", get(handlers::get_event_categories))
        .route(
            "/api/event-category/{id}",
            get(handlers::get_event_category_detail),
        )
        // GET /api/testimonials
        // Customer video testimonials, newest first.
        .route("/api/testimonials", get(handlers::get_testimonials))
        // GET /api/gallery, GET /api/gallery/{id}
        // Uploaded gallery images.
        .route("/api/gallery", get(handlers::get_gallery))
        .route("/api/gallery/{id}", get(handlers::get_gallery_image))
        // POST /api/contact
        // Anonymous contact-form submission.
        .route("/api/contact", post(handlers::create_contact))
}
