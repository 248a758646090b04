use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, Database,
    bson::{doc, oid::ObjectId},
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::RepoError;
use crate::models::{
    Contact, CreateContactRequest, CreateEventCategoryRequest, CreateEventRequest, Event,
    EventCategory, GalleryImage, NewGalleryImage, NewTestimonial, NewUser, Testimonial,
    UpdateEventCategoryRequest, UpdateEventRequest, UpdateTestimonialRequest, UpdateUserRequest,
    User, UserRecord,
};

/// Repository
///
/// Abstract contract for all persistence operations against the document
/// store. Handlers interact with this trait only, which keeps them agnostic
/// of the backing implementation (MongoDB in production, in-memory for
/// tests).
///
/// Update methods implement merge semantics: unspecified fields stay
/// unchanged, and an empty partial payload returns the entity as-is.
/// Concurrent writers race with last-write-wins; no conflict detection.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users (Credential Store) ---
    /// Lists hash-free user summaries.
    async fn list_users(&self) -> Result<Vec<User>, RepoError>;
    async fn get_user(&self, id: &str) -> Result<Option<User>, RepoError>;
    /// Exact-match lookup used by the login flow; the only read returning
    /// the password hash.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;
    /// Inserts a user whose password is already hashed.
    async fn create_user(&self, new: NewUser) -> Result<User, RepoError>;
    /// Partial update; a present `password` must already be hashed.
    async fn update_user(&self, id: &str, req: UpdateUserRequest)
    -> Result<Option<User>, RepoError>;
    async fn delete_user(&self, id: &str) -> Result<bool, RepoError>;

    // --- Events (Services) ---
    async fn list_events(&self) -> Result<Vec<Event>, RepoError>;
    async fn get_event(&self, id: &str) -> Result<Option<Event>, RepoError>;
    async fn create_event(&self, req: CreateEventRequest) -> Result<Event, RepoError>;
    async fn update_event(
        &self,
        id: &str,
        req: UpdateEventRequest,
    ) -> Result<Option<Event>, RepoError>;
    async fn delete_event(&self, id: &str) -> Result<bool, RepoError>;

    // --- Event Categories ---
    /// Optional exact, case-sensitive filter on `eventName`.
    async fn list_event_categories(
        &self,
        event_name: Option<&str>,
    ) -> Result<Vec<EventCategory>, RepoError>;
    async fn get_event_category(&self, id: &str) -> Result<Option<EventCategory>, RepoError>;
    async fn create_event_category(
        &self,
        req: CreateEventCategoryRequest,
    ) -> Result<EventCategory, RepoError>;
    async fn update_event_category(
        &self,
        id: &str,
        req: UpdateEventCategoryRequest,
    ) -> Result<Option<EventCategory>, RepoError>;
    async fn delete_event_category(&self, id: &str) -> Result<bool, RepoError>;

    // --- Testimonials ---
    /// Newest first.
    async fn list_testimonials(&self) -> Result<Vec<Testimonial>, RepoError>;
    async fn create_testimonial(&self, new: NewTestimonial) -> Result<Testimonial, RepoError>;
    async fn update_testimonial(
        &self,
        id: &str,
        req: UpdateTestimonialRequest,
    ) -> Result<Option<Testimonial>, RepoError>;
    async fn delete_testimonial(&self, id: &str) -> Result<bool, RepoError>;

    // --- Contacts ---
    /// Newest first.
    async fn list_contacts(&self) -> Result<Vec<Contact>, RepoError>;
    async fn create_contact(&self, req: CreateContactRequest) -> Result<Contact, RepoError>;

    // --- Gallery ---
    async fn list_gallery_images(&self) -> Result<Vec<GalleryImage>, RepoError>;
    async fn get_gallery_image(&self, id: &str) -> Result<Option<GalleryImage>, RepoError>;
    async fn add_gallery_image(&self, new: NewGalleryImage) -> Result<GalleryImage, RepoError>;
    /// Removes the record and returns it so the caller can attempt the
    /// best-effort file unlink afterwards.
    async fn delete_gallery_image(&self, id: &str) -> Result<Option<GalleryImage>, RepoError>;
}

/// RepositoryState
///
/// The shared handle placed in the application state.
pub type RepositoryState = Arc<dyn Repository>;

// --- Entity construction and merge helpers (shared by both backends) ---

fn new_id() -> String {
    ObjectId::new().to_hex()
}

fn build_user(new: NewUser) -> UserRecord {
    let now = Utc::now();
    UserRecord {
        id: new_id(),
        name: new.name,
        email: new.email,
        password: new.password_hash,
        role: new.role,
        created_at: now,
        updated_at: now,
    }
}

fn build_event(req: CreateEventRequest) -> Event {
    let now = Utc::now();
    Event {
        id: new_id(),
        name: req.name,
        description: req.description,
        icon: req.icon.unwrap_or_default(),
        images: req.images.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    }
}

fn build_event_category(req: CreateEventCategoryRequest) -> EventCategory {
    let now = Utc::now();
    EventCategory {
        id: new_id(),
        event_name: req.event_name,
        category_name: req.category_name,
        description: req.description.unwrap_or_default(),
        images: req.images.unwrap_or_default(),
        price: req.price.unwrap_or(0.0),
        created_at: now,
        updated_at: now,
    }
}

fn build_testimonial(new: NewTestimonial) -> Testimonial {
    let now = Utc::now();
    Testimonial {
        id: new_id(),
        name: new.name,
        message: new.message,
        video_url: new.video_url,
        created_at: now,
        updated_at: now,
    }
}

fn build_contact(req: CreateContactRequest) -> Contact {
    Contact {
        id: new_id(),
        name: req.name,
        whatsapp: req.whatsapp,
        query_for: req.query_for,
        date: req.date,
        location: req.location,
        created_at: Utc::now(),
    }
}

fn build_gallery_image(new: NewGalleryImage) -> GalleryImage {
    GalleryImage {
        id: new_id(),
        filename: new.filename,
        path: new.path,
        title: new.title,
        description: new.description,
        created_at: Utc::now(),
    }
}

// Each merge helper applies the provided fields and reports whether anything
// changed, so an empty partial payload never rewrites the document.

fn merge_user(record: &mut UserRecord, req: UpdateUserRequest) -> bool {
    let mut changed = false;
    if let Some(name) = req.name {
        record.name = name;
        changed = true;
    }
    if let Some(email) = req.email {
        record.email = email;
        changed = true;
    }
    if let Some(password_hash) = req.password {
        record.password = password_hash;
        changed = true;
    }
    if let Some(role) = req.role {
        record.role = role;
        changed = true;
    }
    if changed {
        record.updated_at = Utc::now();
    }
    changed
}

fn merge_event(event: &mut Event, req: UpdateEventRequest) -> bool {
    let mut changed = false;
    if let Some(name) = req.name {
        event.name = name;
        changed = true;
    }
    if let Some(description) = req.description {
        event.description = description;
        changed = true;
    }
    if let Some(icon) = req.icon {
        event.icon = icon;
        changed = true;
    }
    if let Some(images) = req.images {
        event.images = images;
        changed = true;
    }
    if changed {
        event.updated_at = Utc::now();
    }
    changed
}

fn merge_event_category(category: &mut EventCategory, req: UpdateEventCategoryRequest) -> bool {
    let mut changed = false;
    if let Some(event_name) = req.event_name {
        category.event_name = event_name;
        changed = true;
    }
    if let Some(category_name) = req.category_name {
        category.category_name = category_name;
        changed = true;
    }
    if let Some(description) = req.description {
        category.description = description;
        changed = true;
    }
    if let Some(images) = req.images {
        category.images = images;
        changed = true;
    }
    if let Some(price) = req.price {
        category.price = price;
        changed = true;
    }
    if changed {
        category.updated_at = Utc::now();
    }
    changed
}

fn merge_testimonial(testimonial: &mut Testimonial, req: UpdateTestimonialRequest) -> bool {
    let mut changed = false;
    if let Some(name) = req.name {
        testimonial.name = name;
        changed = true;
    }
    if let Some(message) = req.message {
        testimonial.message = message;
        changed = true;
    }
    if let Some(video_url) = req.video_url {
        testimonial.video_url = video_url;
        changed = true;
    }
    if changed {
        testimonial.updated_at = Utc::now();
    }
    changed
}

/// MongoRepository
///
/// The production implementation backed by the MongoDB document store. Every
/// entity maps onto its own collection; updates are read-merge-replace,
/// which is exactly the last-write-wins discipline the data model accepts.
pub struct MongoRepository {
    db: Database,
}

impl MongoRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        Self {
            db: client.database(db_name),
        }
    }

    fn users(&self) -> Collection<UserRecord> {
        self.db.collection("users")
    }
    fn events(&self) -> Collection<Event> {
        self.db.collection("events")
    }
    fn event_categories(&self) -> Collection<EventCategory> {
        self.db.collection("event_categories")
    }
    fn testimonials(&self) -> Collection<Testimonial> {
        self.db.collection("testimonials")
    }
    fn contacts(&self) -> Collection<Contact> {
        self.db.collection("contacts")
    }
    fn gallery(&self) -> Collection<GalleryImage> {
        self.db.collection("gallery_images")
    }
}

#[async_trait]
impl Repository for MongoRepository {
    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        let records: Vec<UserRecord> = self.users().find(doc! {}).await?.try_collect().await?;
        Ok(records.iter().map(UserRecord::summary).collect())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, RepoError> {
        let record = self.users().find_one(doc! { "_id": id }).await?;
        Ok(record.as_ref().map(UserRecord::summary))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.users().find_one(doc! { "email": email }).await?)
    }

    async fn create_user(&self, new: NewUser) -> Result<User, RepoError> {
        let record = build_user(new);
        self.users().insert_one(&record).await?;
        Ok(record.summary())
    }

    async fn update_user(
        &self,
        id: &str,
        req: UpdateUserRequest,
    ) -> Result<Option<User>, RepoError> {
        let Some(mut record) = self.users().find_one(doc! { "_id": id }).await? else {
            return Ok(None);
        };
        if merge_user(&mut record, req) {
            self.users().replace_one(doc! { "_id": id }, &record).await?;
        }
        Ok(Some(record.summary()))
    }

    async fn delete_user(&self, id: &str) -> Result<bool, RepoError> {
        let result = self.users().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_events(&self) -> Result<Vec<Event>, RepoError> {
        Ok(self.events().find(doc! {}).await?.try_collect().await?)
    }

    async fn get_event(&self, id: &str) -> Result<Option<Event>, RepoError> {
        Ok(self.events().find_one(doc! { "_id": id }).await?)
    }

    async fn create_event(&self, req: CreateEventRequest) -> Result<Event, RepoError> {
        let event = build_event(req);
        self.events().insert_one(&event).await?;
        Ok(event)
    }

    async fn update_event(
        &self,
        id: &str,
        req: UpdateEventRequest,
    ) -> Result<Option<Event>, RepoError> {
        let Some(mut event) = self.events().find_one(doc! { "_id": id }).await? else {
            return Ok(None);
        };
        if merge_event(&mut event, req) {
            self.events().replace_one(doc! { "_id": id }, &event).await?;
        }
        Ok(Some(event))
    }

    async fn delete_event(&self, id: &str) -> Result<bool, RepoError> {
        let result = self.events().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_event_categories(
        &self,
        event_name: Option<&str>,
    ) -> Result<Vec<EventCategory>, RepoError> {
        let filter = match event_name {
            // Exact, case-sensitive match.
            Some(name) => doc! { "eventName": name },
            None => doc! {},
        };
        Ok(self
            .event_categories()
            .find(filter)
            .await?
            .try_collect()
            .await?)
    }

    async fn get_event_category(&self, id: &str) -> Result<Option<EventCategory>, RepoError> {
        Ok(self.event_categories().find_one(doc! { "_id": id }).await?)
    }

    async fn create_event_category(
        &self,
        req: CreateEventCategoryRequest,
    ) -> Result<EventCategory, RepoError> {
        let category = build_event_category(req);
        self.event_categories().insert_one(&category).await?;
        Ok(category)
    }

    async fn update_event_category(
        &self,
        id: &str,
        req: UpdateEventCategoryRequest,
    ) -> Result<Option<EventCategory>, RepoError> {
        let Some(mut category) = self.event_categories().find_one(doc! { "_id": id }).await?
        else {
            return Ok(None);
        };
        if merge_event_category(&mut category, req) {
            self.event_categories()
                .replace_one(doc! { "_id": id }, &category)
                .await?;
        }
        Ok(Some(category))
    }

    async fn delete_event_category(&self, id: &str) -> Result<bool, RepoError> {
        let result = self.event_categories().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_testimonials(&self) -> Result<Vec<Testimonial>, RepoError> {
        Ok(self
            .testimonials()
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await?
            .try_collect()
            .await?)
    }

    async fn create_testimonial(&self, new: NewTestimonial) -> Result<Testimonial, RepoError> {
        let testimonial = build_testimonial(new);
        self.testimonials().insert_one(&testimonial).await?;
        Ok(testimonial)
    }

    async fn update_testimonial(
        &self,
        id: &str,
        req: UpdateTestimonialRequest,
    ) -> Result<Option<Testimonial>, RepoError> {
        let Some(mut testimonial) = self.testimonials().find_one(doc! { "_id": id }).await? else {
            return Ok(None);
        };
        if merge_testimonial(&mut testimonial, req) {
            self.testimonials()
                .replace_one(doc! { "_id": id }, &testimonial)
                .await?;
        }
        Ok(Some(testimonial))
    }

    async fn delete_testimonial(&self, id: &str) -> Result<bool, RepoError> {
        let result = self.testimonials().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, RepoError> {
        Ok(self
            .contacts()
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await?
            .try_collect()
            .await?)
    }

    async fn create_contact(&self, req: CreateContactRequest) -> Result<Contact, RepoError> {
        let contact = build_contact(req);
        self.contacts().insert_one(&contact).await?;
        Ok(contact)
    }

    async fn list_gallery_images(&self) -> Result<Vec<GalleryImage>, RepoError> {
        Ok(self.gallery().find(doc! {}).await?.try_collect().await?)
    }

    async fn get_gallery_image(&self, id: &str) -> Result<Option<GalleryImage>, RepoError> {
        Ok(self.gallery().find_one(doc! { "_id": id }).await?)
    }

    async fn add_gallery_image(&self, new: NewGalleryImage) -> Result<GalleryImage, RepoError> {
        let image = build_gallery_image(new);
        self.gallery().insert_one(&image).await?;
        Ok(image)
    }

    async fn delete_gallery_image(&self, id: &str) -> Result<Option<GalleryImage>, RepoError> {
        let Some(image) = self.gallery().find_one(doc! { "_id": id }).await? else {
            return Ok(None);
        };
        self.gallery().delete_one(doc! { "_id": id }).await?;
        Ok(Some(image))
    }
}

/// MemoryRepository
///
/// In-process implementation over plain maps, used by the test suite the
/// same way the mock storage service stands in for the real one. Shares the
/// construction and merge helpers with the MongoDB backend so both exhibit
/// identical semantics.
#[derive(Default)]
pub struct MemoryRepository {
    users: RwLock<HashMap<String, UserRecord>>,
    events: RwLock<HashMap<String, Event>>,
    event_categories: RwLock<HashMap<String, EventCategory>>,
    testimonials: RwLock<HashMap<String, Testimonial>>,
    contacts: RwLock<HashMap<String, Contact>>,
    gallery: RwLock<HashMap<String, GalleryImage>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        let users = self.users.read().expect("lock poisoned");
        Ok(users.values().map(UserRecord::summary).collect())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().expect("lock poisoned");
        Ok(users.get(id).map(UserRecord::summary))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let users = self.users.read().expect("lock poisoned");
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, RepoError> {
        let record = build_user(new);
        let summary = record.summary();
        self.users
            .write()
            .expect("lock poisoned")
            .insert(record.id.clone(), record);
        Ok(summary)
    }

    async fn update_user(
        &self,
        id: &str,
        req: UpdateUserRequest,
    ) -> Result<Option<User>, RepoError> {
        let mut users = self.users.write().expect("lock poisoned");
        let Some(record) = users.get_mut(id) else {
            return Ok(None);
        };
        merge_user(record, req);
        Ok(Some(record.summary()))
    }

    async fn delete_user(&self, id: &str) -> Result<bool, RepoError> {
        Ok(self
            .users
            .write()
            .expect("lock poisoned")
            .remove(id)
            .is_some())
    }

    async fn list_events(&self) -> Result<Vec<Event>, RepoError> {
        let events = self.events.read().expect("lock poisoned");
        Ok(events.values().cloned().collect())
    }

    async fn get_event(&self, id: &str) -> Result<Option<Event>, RepoError> {
        let events = self.events.read().expect("lock poisoned");
        Ok(events.get(id).cloned())
    }

    async fn create_event(&self, req: CreateEventRequest) -> Result<Event, RepoError> {
        let event = build_event(req);
        self.events
            .write()
            .expect("lock poisoned")
            .insert(event.id.clone(), event.clone());
        Ok(event)
    }

    async fn update_event(
        &self,
        id: &str,
        req: UpdateEventRequest,
    ) -> Result<Option<Event>, RepoError> {
        let mut events = self.events.write().expect("lock poisoned");
        let Some(event) = events.get_mut(id) else {
            return Ok(None);
        };
        merge_event(event, req);
        Ok(Some(event.clone()))
    }

    async fn delete_event(&self, id: &str) -> Result<bool, RepoError> {
        Ok(self
            .events
            .write()
            .expect("lock poisoned")
            .remove(id)
            .is_some())
    }

    async fn list_event_categories(
        &self,
        event_name: Option<&str>,
    ) -> Result<Vec<EventCategory>, RepoError> {
        let categories = self.event_categories.read().expect("lock poisoned");
        Ok(categories
            .values()
            .filter(|c| event_name.is_none_or(|name| c.event_name == name))
            .cloned()
            .collect())
    }

    async fn get_event_category(&self, id: &str) -> Result<Option<EventCategory>, RepoError> {
        let categories = self.event_categories.read().expect("lock poisoned");
        Ok(categories.get(id).cloned())
    }

    async fn create_event_category(
        &self,
        req: CreateEventCategoryRequest,
    ) -> Result<EventCategory, RepoError> {
        let category = build_event_category(req);
        self.event_categories
            .write()
            .expect("lock poisoned")
            .insert(category.id.clone(), category.clone());
        Ok(category)
    }

    async fn update_event_category(
        &self,
        id: &str,
        req: UpdateEventCategoryRequest,
    ) -> Result<Option<EventCategory>, RepoError> {
        let mut categories = self.event_categories.write().expect("lock poisoned");
        let Some(category) = categories.get_mut(id) else {
            return Ok(None);
        };
        merge_event_category(category, req);
        Ok(Some(category.clone()))
    }

    async fn delete_event_category(&self, id: &str) -> Result<bool, RepoError> {
        Ok(self
            .event_categories
            .write()
            .expect("lock poisoned")
            .remove(id)
            .is_some())
    }

    async fn list_testimonials(&self) -> Result<Vec<Testimonial>, RepoError> {
        let testimonials = self.testimonials.read().expect("lock poisoned");
        let mut all: Vec<Testimonial> = testimonials.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn create_testimonial(&self, new: NewTestimonial) -> Result<Testimonial, RepoError> {
        let testimonial = build_testimonial(new);
        self.testimonials
            .write()
            .expect("lock poisoned")
            .insert(testimonial.id.clone(), testimonial.clone());
        Ok(testimonial)
    }

    async fn update_testimonial(
        &self,
        id: &str,
        req: UpdateTestimonialRequest,
    ) -> Result<Option<Testimonial>, RepoError> {
        let mut testimonials = self.testimonials.write().expect("lock poisoned");
        let Some(testimonial) = testimonials.get_mut(id) else {
            return Ok(None);
        };
        merge_testimonial(testimonial, req);
        Ok(Some(testimonial.clone()))
    }

    async fn delete_testimonial(&self, id: &str) -> Result<bool, RepoError> {
        Ok(self
            .testimonials
            .write()
            .expect("lock poisoned")
            .remove(id)
            .is_some())
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, RepoError> {
        let contacts = self.contacts.read().expect("lock poisoned");
        let mut all: Vec<Contact> = contacts.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn create_contact(&self, req: CreateContactRequest) -> Result<Contact, RepoError> {
        let contact = build_contact(req);
        self.contacts
            .write()
            .expect("lock poisoned")
            .insert(contact.id.clone(), contact.clone());
        Ok(contact)
    }

    async fn list_gallery_images(&self) -> Result<Vec<GalleryImage>, RepoError> {
        let gallery = self.gallery.read().expect("lock poisoned");
        Ok(gallery.values().cloned().collect())
    }

    async fn get_gallery_image(&self, id: &str) -> Result<Option<GalleryImage>, RepoError> {
        let gallery = self.gallery.read().expect("lock poisoned");
        Ok(gallery.get(id).cloned())
    }

    async fn add_gallery_image(&self, new: NewGalleryImage) -> Result<GalleryImage, RepoError> {
        let image = build_gallery_image(new);
        self.gallery
            .write()
            .expect("lock poisoned")
            .insert(image.id.clone(), image.clone());
        Ok(image)
    }

    async fn delete_gallery_image(&self, id: &str) -> Result<Option<GalleryImage>, RepoError> {
        Ok(self.gallery.write().expect("lock poisoned").remove(id))
    }
}
