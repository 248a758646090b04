use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to the Document Store) ---

/// UserRecord
///
/// The canonical user document in the `users` collection, including the
/// password hash. This struct never leaves the repository/auth boundary;
/// every read surface works with the hash-free [`User`] summary instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    /// Salted one-way hash, never the plaintext password.
    pub password: String,
    /// RBAC field: "admin" or "user".
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// The summary exposed by every read path and embedded in session
    /// tokens. Dropping the hash here is what guarantees the "password never
    /// returned in reads" invariant.
    pub fn summary(&self) -> User {
        User {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
            created_at: self.created_at,
        }
    }
}

/// User
///
/// Hash-free user summary returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Event
///
/// A decoration service offered by the business ("Wedding", "Birthday", ...).
/// `icon` and `images` hold durable image references: stored paths or
/// embedded `data:` URLs.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// EventCategory
///
/// A priced package under an Event. `event_name` is a free-text link to an
/// Event's name; no referential integrity is enforced, matching the
/// schema-less store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventCategory {
    #[serde(rename = "_id")]
    pub id: String,
    pub event_name: String,
    pub category_name: String,
    pub description: String,
    pub images: Vec<String>,
    /// Non-negative by convention only.
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Testimonial
///
/// A customer video testimonial. `video_url` is the relative path of the
/// uploaded video under the public directory.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub message: String,
    pub video_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contact
///
/// An enquiry submitted from the public contact form. Created anonymously,
/// read by the admin dashboard, never updated or deleted in-app.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub whatsapp: String,
    pub query_for: String,
    pub date: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

/// GalleryImage
///
/// An uploaded gallery image; `path` is the stored file's relative path
/// under the public directory.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    #[serde(rename = "_id")]
    pub id: String,
    pub filename: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Credentials submitted to `POST /api/users/login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// CreateUserRequest
///
/// Admin payload for adding a user. `role` defaults to "user" when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

/// UpdateUserRequest
///
/// Partial update: only provided fields change. A supplied password is
/// re-hashed before it reaches the repository.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// NewUser
///
/// Repository input assembled by the user-creation handler after the
/// plaintext password has been hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// CreateEventRequest
///
/// `images` defaults to an empty list; `icon` may be empty.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateEventRequest {
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
    pub images: Option<Vec<String>>,
}

/// UpdateEventRequest
///
/// Partial update with merge semantics; an empty payload is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateEventRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

/// CreateEventCategoryRequest
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventCategoryRequest {
    pub event_name: String,
    pub category_name: String,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub price: Option<f64>,
}

/// UpdateEventCategoryRequest
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventCategoryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// NewTestimonial
///
/// Repository input assembled by the multipart upload handler, after the
/// video file has been written to storage.
#[derive(Debug, Clone)]
pub struct NewTestimonial {
    pub name: String,
    pub message: String,
    pub video_url: String,
}

/// UpdateTestimonialRequest
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTestimonialRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// CreateContactRequest
///
/// All five fields are required at submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    pub name: String,
    pub whatsapp: String,
    pub query_for: String,
    pub date: String,
    pub location: String,
}

/// NewGalleryImage
///
/// Repository input assembled by the gallery upload handler.
#[derive(Debug, Clone)]
pub struct NewGalleryImage {
    pub filename: String,
    pub path: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

// --- Response Envelopes (Output Schemas) ---

/// LoginResponse
///
/// The session token plus the hash-free user summary. The caller persists
/// the token client-side; a matching `Set-Cookie` header is also emitted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: User,
}

/// UserEnvelope
///
/// `{message, user}` wrapper used by the user create/update endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserEnvelope {
    pub message: String,
    pub user: User,
}

/// ContactEnvelope
///
/// `{message, contact}` wrapper returned on contact submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactEnvelope {
    pub message: String,
    pub contact: Contact,
}

/// MessageResponse
///
/// `{message}` body returned by delete endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// ContactList
///
/// `{contacts}` wrapper for the admin dashboard listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactList {
    pub contacts: Vec<Contact>,
}
