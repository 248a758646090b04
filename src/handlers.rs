use crate::{
    AppState,
    auth::{self, Session},
    error::ApiError,
    models::{
        ContactEnvelope, ContactList, CreateContactRequest, CreateEventCategoryRequest,
        CreateEventRequest, CreateUserRequest, Event, EventCategory, GalleryImage, LoginRequest,
        LoginResponse, MessageResponse, NewGalleryImage, NewTestimonial, NewUser, Testimonial,
        UpdateEventCategoryRequest, UpdateEventRequest, UpdateTestimonialRequest,
        UpdateUserRequest, User, UserEnvelope,
    },
};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use std::collections::HashMap;

// --- Filter Structs ---

/// CategoryFilter
///
/// Accepted query parameters for the public category listing
/// (GET /api/event-category). The filter is an exact, case-sensitive match
/// on the linked event name.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct CategoryFilter {
    #[serde(rename = "eventName")]
    pub event_name: Option<String>,
}

// --- Validation Helpers ---

/// Rejects the request when any required field is empty or whitespace.
fn require_all(values: &[&str]) -> Result<(), ApiError> {
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(ApiError::Validation("All fields are required".to_string()));
    }
    Ok(())
}

/// Boundary normalization for image references. Durable representations
/// (embedded `data:` URLs, stored paths, http(s) URLs) pass through
/// unchanged; ephemeral client-local `blob:` handles cannot be dereferenced
/// server-side and are rejected before anything reaches the store. Applying
/// this twice is a no-op.
fn durable_image_ref(value: String) -> Result<String, ApiError> {
    if value.starts_with("blob:") {
        return Err(ApiError::Validation(
            "Image references must be durable (data URL or stored path)".to_string(),
        ));
    }
    Ok(value)
}

fn durable_image_refs(values: Vec<String>) -> Result<Vec<String>, ApiError> {
    values.into_iter().map(durable_image_ref).collect()
}

/// Collected multipart form content: plain text fields by name, and file
/// fields as (original filename, bytes) by name.
struct FormContent {
    texts: HashMap<String, String>,
    files: HashMap<String, (String, Vec<u8>)>,
}

async fn collect_multipart(mut multipart: Multipart) -> Result<FormContent, ApiError> {
    let mut texts = HashMap::new();
    let mut files = HashMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::Validation("Malformed multipart body".to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::Validation("Malformed multipart body".to_string()))?;
                files.insert(name, (filename, bytes.to_vec()));
            }
            None => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::Validation("Malformed multipart body".to_string()))?;
                texts.insert(name, text);
            }
        }
    }
    Ok(FormContent { texts, files })
}

// --- Auth Gate ---

/// login
///
/// [Public Route] Verifies credentials and issues the signed session token.
///
/// *Enumeration resistance*: unknown email and wrong password produce the
/// same generic 401; the response never reveals which check failed.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_all(&[&payload.email, &payload.password])?;

    let record = state
        .repo
        .find_user_by_email(&payload.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !auth::verify_password(&payload.password, &record.password) {
        return Err(ApiError::InvalidCredentials);
    }

    let user = record.summary();
    let token = auth::issue_session_token(&user, &state.config.jwt_secret)?;
    tracing::info!(email = %user.email, "login successful");

    // The token is returned in the body (the client persists it) and also
    // set as the session cookie the route perimeter looks for.
    let cookie = format!("token={}; Path=/; HttpOnly; SameSite=Lax", token);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            message: "Login successful".to_string(),
            token,
            user,
        }),
    ))
}

// --- Users (Credential Store, admin only) ---

/// get_users
///
/// [Admin Route] Lists all users. Responses never include the password hash.
#[utoipa::path(
    get,
    path = "/api/users",
    responses((status = 200, description = "All users", body = [User]))
)]
pub async fn get_users(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
    session.require_admin()?;
    Ok(Json(state.repo.list_users().await?))
}

/// create_user
///
/// [Admin Route] Adds a user. The email must be unused; the password is
/// hashed before it reaches the repository. Role defaults to "user".
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserEnvelope),
        (status = 400, description = "Missing fields or duplicate email")
    )
)]
pub async fn create_user(
    session: Session,
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    session.require_admin()?;
    require_all(&[&payload.name, &payload.email, &payload.password])?;

    if state
        .repo
        .find_user_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Validation("User already exists".to_string()));
    }

    let user = state
        .repo
        .create_user(NewUser {
            name: payload.name,
            email: payload.email,
            password_hash: auth::hash_password(&payload.password)?,
            role: payload.role.unwrap_or_else(|| "user".to_string()),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            message: "User created".to_string(),
            user,
        }),
    ))
}

/// get_user_detail
///
/// [Admin Route] Single user by id, password excluded.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = User),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user_detail(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    session.require_admin()?;
    state
        .repo
        .get_user(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("User"))
}

/// update_user
///
/// [Admin Route] Partial update. A supplied non-empty password is re-hashed;
/// omitted fields stay unchanged. A supplied email must not belong to a
/// different user, keeping the uniqueness invariant that creation enforces.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserEnvelope),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_user(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut payload): Json<UpdateUserRequest>,
) -> Result<Json<UserEnvelope>, ApiError> {
    session.require_admin()?;

    // Moving to an email another user already owns would break login
    // resolution; moving to one's own current email is a no-op.
    if let Some(email) = payload.email.as_deref() {
        if let Some(existing) = state.repo.find_user_by_email(email).await? {
            if existing.id != id {
                return Err(ApiError::Validation("User already exists".to_string()));
            }
        }
    }

    // An empty password field means "leave it alone", not "blank it".
    payload.password = match payload.password.filter(|p| !p.trim().is_empty()) {
        Some(plain) => Some(auth::hash_password(&plain)?),
        None => None,
    };

    let user = state
        .repo
        .update_user(&id, payload)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(UserEnvelope {
        message: "User updated".to_string(),
        user,
    }))
}

/// delete_user
///
/// [Admin Route] Removes a user record.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_user(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    session.require_admin()?;
    if state.repo.delete_user(&id).await? {
        Ok(Json(MessageResponse {
            message: "User deleted".to_string(),
        }))
    } else {
        Err(ApiError::NotFound("User"))
    }
}

// --- Events (Services) ---

/// get_events
///
/// [Public Route] Lists all decoration services.
#[utoipa::path(
    get,
    path = "/api/events",
    responses((status = 200, description = "All events", body = [Event]))
)]
pub async fn get_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(state.repo.list_events().await?))
}

/// get_event_detail
///
/// [Public Route] Single service by id.
#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Found", body = Event),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_event_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    state
        .repo
        .get_event(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Event"))
}

/// create_event
///
/// [Admin Route] Adds a service. Image references are normalized at the
/// boundary: ephemeral `blob:` handles are rejected, durable references
/// pass through unchanged.
#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Created", body = Event),
        (status = 400, description = "Missing fields or ephemeral image reference")
    )
)]
pub async fn create_event(
    session: Session,
    State(state): State<AppState>,
    Json(mut payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    session.require_admin()?;
    require_all(&[&payload.name, &payload.description])?;

    payload.icon = payload.icon.map(durable_image_ref).transpose()?;
    payload.images = payload.images.map(durable_image_refs).transpose()?;
    let event = state.repo.create_event(payload).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// update_event
///
/// [Admin Route] Partial update with merge semantics; an empty payload
/// leaves every field unchanged.
#[utoipa::path(
    put,
    path = "/api/events/{id}",
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated", body = Event),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_event(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut payload): Json<UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    session.require_admin()?;
    payload.icon = payload.icon.map(durable_image_ref).transpose()?;
    payload.images = payload.images.map(durable_image_refs).transpose()?;
    state
        .repo
        .update_event(&id, payload)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Event"))
}

/// delete_event
///
/// [Admin Route] Removes a service.
#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_event(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    session.require_admin()?;
    if state.repo.delete_event(&id).await? {
        Ok(Json(MessageResponse {
            message: "Event deleted".to_string(),
        }))
    } else {
        Err(ApiError::NotFound("Event"))
    }
}

// --- Event Categories ---

/// get_event_categories
///
/// [Public Route] Lists categories, optionally filtered by the exact
/// (case-sensitive) event name.
#[utoipa::path(
    get,
    path = "/api/event-category",
    params(CategoryFilter),
    responses((status = 200, description = "Categories", body = [EventCategory]))
)]
pub async fn get_event_categories(
    State(state): State<AppState>,
    Query(filter): Query<CategoryFilter>,
) -> Result<Json<Vec<EventCategory>>, ApiError> {
    let categories = state
        .repo
        .list_event_categories(filter.event_name.as_deref())
        .await?;
    Ok(Json(categories))
}

/// get_event_category_detail
///
/// [Public Route] Single category by id.
#[utoipa::path(
    get,
    path = "/api/event-category/{id}",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Found", body = EventCategory),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_event_category_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventCategory>, ApiError> {
    state
        .repo
        .get_event_category(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Category"))
}

/// create_event_category
///
/// [Admin Route] Adds a priced package under an event name. The link is
/// free text; no referential integrity against Events is enforced.
#[utoipa::path(
    post,
    path = "/api/event-category",
    request_body = CreateEventCategoryRequest,
    responses(
        (status = 201, description = "Created", body = EventCategory),
        (status = 400, description = "Missing fields")
    )
)]
pub async fn create_event_category(
    session: Session,
    State(state): State<AppState>,
    Json(mut payload): Json<CreateEventCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    session.require_admin()?;
    require_all(&[&payload.event_name, &payload.category_name])?;

    payload.images = payload.images.map(durable_image_refs).transpose()?;
    let category = state.repo.create_event_category(payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// update_event_category
///
/// [Admin Route] Partial update with merge semantics.
#[utoipa::path(
    put,
    path = "/api/event-category/{id}",
    request_body = UpdateEventCategoryRequest,
    responses(
        (status = 200, description = "Updated", body = EventCategory),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_event_category(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut payload): Json<UpdateEventCategoryRequest>,
) -> Result<Json<EventCategory>, ApiError> {
    session.require_admin()?;
    payload.images = payload.images.map(durable_image_refs).transpose()?;
    state
        .repo
        .update_event_category(&id, payload)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Category"))
}

/// delete_event_category
///
/// [Admin Route] Removes a category.
#[utoipa::path(
    delete,
    path = "/api/event-category/{id}",
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_event_category(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    session.require_admin()?;
    if state.repo.delete_event_category(&id).await? {
        Ok(Json(MessageResponse {
            message: "Deleted".to_string(),
        }))
    } else {
        Err(ApiError::NotFound("Category"))
    }
}

// --- Testimonials ---

/// get_testimonials
///
/// [Public Route] Lists testimonials, newest first.
#[utoipa::path(
    get,
    path = "/api/testimonials",
    responses((status = 200, description = "Testimonials", body = [Testimonial]))
)]
pub async fn get_testimonials(
    State(state): State<AppState>,
) -> Result<Json<Vec<Testimonial>>, ApiError> {
    Ok(Json(state.repo.list_testimonials().await?))
}

/// create_testimonial
///
/// [Admin Route] Multipart upload: `name`, `message` and a `video` file, all
/// required. The video is written to the public uploads directory first;
/// the record then stores the resulting relative path. The two steps are
/// not atomic, so a crash in between can orphan the file.
#[utoipa::path(
    post,
    path = "/api/testimonials",
    responses(
        (status = 201, description = "Testimonial saved", body = Testimonial),
        (status = 400, description = "Missing fields")
    )
)]
pub async fn create_testimonial(
    session: Session,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    session.require_admin()?;
    let form = collect_multipart(multipart).await?;

    let name = form.texts.get("name").cloned().unwrap_or_default();
    let message = form.texts.get("message").cloned().unwrap_or_default();
    let Some((filename, bytes)) = form.files.get("video") else {
        return Err(ApiError::Validation("All fields are required".to_string()));
    };
    require_all(&[&name, &message])?;

    let stored = state.storage.save("uploads", filename, bytes).await?;
    tracing::info!(path = %stored.path, "testimonial video stored");

    let testimonial = state
        .repo
        .create_testimonial(NewTestimonial {
            name,
            message,
            video_url: stored.path,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(testimonial)))
}

/// update_testimonial
///
/// [Admin Route] Partial update; the stored video file is untouched.
#[utoipa::path(
    put,
    path = "/api/testimonials/{id}",
    request_body = UpdateTestimonialRequest,
    responses(
        (status = 200, description = "Updated", body = Testimonial),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_testimonial(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTestimonialRequest>,
) -> Result<Json<Testimonial>, ApiError> {
    session.require_admin()?;
    state
        .repo
        .update_testimonial(&id, payload)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Testimonial"))
}

/// delete_testimonial
///
/// [Admin Route] Removes the record only; the video file is left behind.
#[utoipa::path(
    delete,
    path = "/api/testimonials/{id}",
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_testimonial(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    session.require_admin()?;
    if state.repo.delete_testimonial(&id).await? {
        Ok(Json(MessageResponse {
            message: "Deleted successfully".to_string(),
        }))
    } else {
        Err(ApiError::NotFound("Testimonial"))
    }
}

// --- Contacts ---

/// create_contact
///
/// [Public Route] The single anonymous mutation: a contact-form submission.
/// All five fields must be non-empty.
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Submitted", body = ContactEnvelope),
        (status = 400, description = "Missing fields")
    )
)]
pub async fn create_contact(
    State(state): State<AppState>,
    Json(payload): Json<CreateContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_all(&[
        &payload.name,
        &payload.whatsapp,
        &payload.query_for,
        &payload.date,
        &payload.location,
    ])?;

    let contact = state.repo.create_contact(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ContactEnvelope {
            message: "Submitted".to_string(),
            contact,
        }),
    ))
}

/// get_contacts
///
/// [Admin Route] Dashboard listing of all submissions, newest first.
#[utoipa::path(
    get,
    path = "/api/contact",
    responses((status = 200, description = "Submissions", body = ContactList))
)]
pub async fn get_contacts(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<ContactList>, ApiError> {
    session.require_admin()?;
    Ok(Json(ContactList {
        contacts: state.repo.list_contacts().await?,
    }))
}

// --- Gallery ---

/// get_gallery
///
/// [Public Route] Lists all gallery images.
#[utoipa::path(
    get,
    path = "/api/gallery",
    responses((status = 200, description = "Gallery", body = [GalleryImage]))
)]
pub async fn get_gallery(
    State(state): State<AppState>,
) -> Result<Json<Vec<GalleryImage>>, ApiError> {
    Ok(Json(state.repo.list_gallery_images().await?))
}

/// get_gallery_image
///
/// [Public Route] Single gallery image by id.
#[utoipa::path(
    get,
    path = "/api/gallery/{id}",
    params(("id" = String, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Found", body = GalleryImage),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_gallery_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GalleryImage>, ApiError> {
    state
        .repo
        .get_gallery_image(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Image"))
}

/// upload_gallery_image
///
/// [Admin Route] Multipart upload: a `file` field (required) plus optional
/// `title` and `description`. The image lands in the public gallery
/// directory under a timestamp-prefixed name.
#[utoipa::path(
    post,
    path = "/api/gallery",
    responses(
        (status = 201, description = "Uploaded", body = GalleryImage),
        (status = 400, description = "No file uploaded")
    )
)]
pub async fn upload_gallery_image(
    session: Session,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    session.require_admin()?;
    let form = collect_multipart(multipart).await?;

    let Some((filename, bytes)) = form.files.get("file") else {
        return Err(ApiError::Validation("No file uploaded".to_string()));
    };

    let stored = state.storage.save("uploadGallery", filename, bytes).await?;
    tracing::info!(path = %stored.path, "gallery image stored");

    let image = state
        .repo
        .add_gallery_image(NewGalleryImage {
            filename: stored.filename,
            path: stored.path,
            title: form.texts.get("title").cloned().filter(|t| !t.is_empty()),
            description: form
                .texts
                .get("description")
                .cloned()
                .filter(|d| !d.is_empty()),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// delete_gallery_image
///
/// [Admin Route] Two independent fallible steps: the record is removed
/// first, then the backing file unlink is attempted. A failed unlink is
/// logged and does not fail the request; the record stays gone either way.
#[utoipa::path(
    delete,
    path = "/api/gallery/{id}",
    responses(
        (status = 200, description = "Image deleted", body = MessageResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_gallery_image(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    session.require_admin()?;

    let Some(image) = state.repo.delete_gallery_image(&id).await? else {
        return Err(ApiError::NotFound("Image"));
    };

    if let Err(e) = state.storage.remove(&image.path).await {
        tracing::warn!(path = %image.path, error = %e, "gallery file removal failed");
    }

    Ok(Json(MessageResponse {
        message: "Image deleted successfully".to_string(),
    }))
}
