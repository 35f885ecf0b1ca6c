//! Per-entity endpoints
//!
//! Each entity implements [`Resource`], which gives it the generic list / get
//! / create / update / delete operations on [`QueryClient`]. Writes invalidate
//! the entity itself plus whatever else their result changes (a returned
//! booking frees a copy, for instance).

use std::collections::BTreeMap;

use libris_core::table::SortState;
use libris_core::{envelope, Paged, QueryKey, SessionUser};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::models::{
    Administrator, Book, BookCopy, Booking, BookingStatus, Category, DashboardStats, LoginRequest,
    LoginResponse, Notification, Student,
};
use crate::query::{Fetched, Mutation, QueryClient};
use crate::transport::{FilePart, Method};
use crate::{ApiError, Result};

/// An entity with standard REST endpoints under `PATH`
pub trait Resource: Serialize + DeserializeOwned + 'static {
    /// Cache entity name
    const ENTITY: &'static str;
    /// Collection path, e.g. `/books`
    const PATH: &'static str;
    /// Other entities whose cached data a write to this one changes
    const ALSO_INVALIDATES: &'static [&'static str] = &[];

    fn item_path(id: u64) -> String {
        format!("{}/{}", Self::PATH, id)
    }
}

impl Resource for Book {
    const ENTITY: &'static str = "books";
    const PATH: &'static str = "/books";
    const ALSO_INVALIDATES: &'static [&'static str] = &["statistics"];
}

impl Resource for BookCopy {
    const ENTITY: &'static str = "copies";
    const PATH: &'static str = "/book-copies";
    const ALSO_INVALIDATES: &'static [&'static str] = &["books"];
}

impl Resource for Category {
    const ENTITY: &'static str = "categories";
    const PATH: &'static str = "/categories";
}

impl Resource for Booking {
    const ENTITY: &'static str = "bookings";
    const PATH: &'static str = "/bookings";
    const ALSO_INVALIDATES: &'static [&'static str] = &["copies", "books", "statistics"];
}

impl Resource for Student {
    const ENTITY: &'static str = "students";
    const PATH: &'static str = "/students";
    const ALSO_INVALIDATES: &'static [&'static str] = &["statistics"];
}

impl Resource for Administrator {
    const ENTITY: &'static str = "administrators";
    const PATH: &'static str = "/admins";
}

impl Resource for Notification {
    const ENTITY: &'static str = "notifications";
    const PATH: &'static str = "/notifications";
}

// ============================================================================
// List parameters
// ============================================================================

/// Server-side list parameters
///
/// `page` is 1-based here and sent zero-based on the wire.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListParams {
    pub page: Option<usize>,
    pub size: Option<usize>,
    pub search: String,
    pub sort: Option<SortState>,
    pub filters: BTreeMap<String, String>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: usize, size: usize) -> Self {
        self.page = Some(page.max(1));
        self.size = Some(size);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn sort(mut self, sort: Option<SortState>) -> Self {
        self.sort = sort;
        self
    }

    pub fn filter(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.filters.insert(name.into(), value.to_string());
        self
    }

    /// Cache key for `entity` with these parameters
    pub fn key(&self, entity: &str) -> QueryKey {
        let mut key = QueryKey::new(entity)
            .param_opt("page", self.page.map(|p| p - 1))
            .param_opt("size", self.size)
            .param("search", self.search.trim());
        if let Some(sort) = &self.sort {
            key = key.param("sort", format!("{},{}", sort.column, sort.direction.as_str()));
        }
        for (name, value) in &self.filters {
            key = key.param(name.clone(), value);
        }
        key
    }
}

// ============================================================================
// Generic operations
// ============================================================================

impl QueryClient {
    /// Cached list read; `None` while another read of the same key runs
    pub async fn list<R: Resource>(&self, params: &ListParams) -> Result<Option<Paged<R>>> {
        let key = params.key(R::ENTITY);
        match self.fetch(&key, R::PATH).await?.into_value() {
            Some(value) => Ok(Some(envelope::decode_list(value)?)),
            None => Ok(None),
        }
    }

    /// Decode whatever list is cached for `params`
    pub fn cached_list<R: Resource>(&self, params: &ListParams) -> Option<Result<Paged<R>>> {
        self.data(&params.key(R::ENTITY))
            .map(|value| envelope::decode_list(value).map_err(ApiError::from))
    }

    pub async fn get<R: Resource>(&self, id: u64) -> Result<Option<R>> {
        let key = QueryKey::new(R::ENTITY).param("id", id);
        match self.fetch_with(&key, &R::item_path(id), None).await?.into_value() {
            Some(value) => Ok(Some(envelope::decode_item(value)?)),
            None => Ok(None),
        }
    }

    fn write<R: Resource>(&self, method: Method, path: String) -> Mutation {
        let mut mutation = Mutation::new(method, path).invalidates(R::ENTITY);
        for entity in R::ALSO_INVALIDATES {
            mutation = mutation.invalidates(*entity);
        }
        mutation
    }

    pub async fn create<R: Resource, B: Serialize + ?Sized>(&self, body: &B) -> Result<Value> {
        let mutation = self.write::<R>(Method::Post, R::PATH.to_string()).json(body)?;
        Ok(envelope::unwrap_item(self.mutate(mutation).await?))
    }

    pub async fn update<R: Resource, B: Serialize + ?Sized>(&self, id: u64, body: &B) -> Result<Value> {
        let mutation = self.write::<R>(Method::Patch, R::item_path(id)).json(body)?;
        Ok(envelope::unwrap_item(self.mutate(mutation).await?))
    }

    pub async fn delete<R: Resource>(&self, id: u64) -> Result<()> {
        self.mutate(self.write::<R>(Method::Delete, R::item_path(id)))
            .await
            .map(|_| ())
    }

    // ========================================================================
    // Special endpoints
    // ========================================================================

    /// Copies of one book
    pub async fn copies_of(&self, book_id: u64) -> Result<Option<Paged<BookCopy>>> {
        self.list::<BookCopy>(&ListParams::new().filter("bookId", book_id))
            .await
    }

    pub async fn approve_booking(&self, id: u64) -> Result<()> {
        self.booking_transition(id, "approve").await
    }

    pub async fn reject_booking(&self, id: u64, reason: Option<&str>) -> Result<()> {
        let mut mutation = self.write::<Booking>(Method::Patch, format!("/bookings/{}/reject", id));
        if let Some(reason) = reason.filter(|r| !r.trim().is_empty()) {
            mutation = mutation.json(&serde_json::json!({ "reason": reason }))?;
        }
        self.mutate(mutation).await.map(|_| ())
    }

    pub async fn return_booking(&self, id: u64) -> Result<()> {
        self.booking_transition(id, "return").await
    }

    async fn booking_transition(&self, id: u64, action: &str) -> Result<()> {
        let mutation = self.write::<Booking>(Method::Patch, format!("/bookings/{}/{}", id, action));
        self.mutate(mutation).await?;
        info!(booking_id = id, action, "Booking updated");
        Ok(())
    }

    /// Bookings filtered by status
    pub async fn bookings(
        &self,
        params: ListParams,
        status: Option<BookingStatus>,
    ) -> Result<Option<Paged<Booking>>> {
        let params = match status {
            Some(status) => params.filter("status", status.as_str()),
            None => params,
        };
        self.list::<Booking>(&params).await
    }

    pub async fn mark_notification_read(&self, id: u64) -> Result<()> {
        let mutation = self.write::<Notification>(Method::Patch, format!("/notifications/{}/read", id));
        self.mutate(mutation).await.map(|_| ())
    }

    pub async fn dashboard_stats(&self) -> Result<Option<DashboardStats>> {
        let key = QueryKey::new("statistics");
        match self.fetch(&key, "/statistics/dashboard").await? {
            Fetched::Fresh(value) | Fetched::Cached(value) => Ok(Some(envelope::decode_item(value)?)),
            Fetched::InFlight => Ok(None),
        }
    }

    // ========================================================================
    // Auth
    // ========================================================================

    pub async fn login(&self, phone: &str, password: &str) -> Result<LoginResponse> {
        let request = LoginRequest {
            phone: phone.to_string(),
            password: password.to_string(),
        };
        let value = self.api().post("/auth/login", &request).await?;
        let response: LoginResponse = envelope::decode_item(value)?;
        info!(user_id = response.user.id, "Login succeeded");
        Ok(response)
    }

    /// Current user; confirms the stored credential is still valid
    pub async fn me(&self) -> Result<SessionUser> {
        self.api().get_item("/auth/me").await
    }

    pub async fn update_profile<B: Serialize + ?Sized>(&self, body: &B) -> Result<SessionUser> {
        let value = self.api().patch("/auth/me", body).await?;
        Ok(envelope::decode_item(value)?)
    }

    /// Tell the backend; local state is cleared regardless of the outcome
    pub async fn logout(&self) -> Result<()> {
        let result = self.api().post("/auth/logout", &Value::Null).await.map(|_| ());
        self.clear();
        result
    }

    // ========================================================================
    // Files
    // ========================================================================

    pub async fn upload_image(&self, file: FilePart) -> Result<String> {
        self.api().upload("/files/upload/image", file).await
    }

    pub async fn upload_pdf(&self, file: FilePart) -> Result<String> {
        self.api().upload("/files/upload/pdf", file).await
    }

    /// Public URL of an uploaded file, for images and catalog downloads
    pub fn file_url(&self, path: &str) -> Result<String> {
        Ok(self.api().config().public_url(path)?)
    }
}

/// Build a multipart file part under the backend's `file` field
pub fn file_part(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> FilePart {
    FilePart {
        field: "file".to_string(),
        file_name: file_name.into(),
        mime: mime.into(),
        bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Body;
    use libris_core::table::SortDirection;

    #[test]
    fn test_list_params_key() {
        let params = ListParams::new()
            .page(2, 20)
            .search("  Navoiy ")
            .filter("categoryId", 4);
        let key = params.key("books");
        assert_eq!(key.entity(), "books");
        assert_eq!(key.to_string(), "books?categoryId=4&page=1&search=Navoiy&size=20");
    }

    #[test]
    fn test_list_params_sort() {
        let params = ListParams::new().sort(Some(SortState {
            column: "title".into(),
            direction: SortDirection::Descending,
        }));
        assert_eq!(params.key("books").params().get("sort").map(String::as_str), Some("title,desc"));
    }

    #[test]
    fn test_resource_paths() {
        assert_eq!(Book::item_path(5), "/books/5");
        assert_eq!(BookCopy::PATH, "/book-copies");
        assert_eq!(Administrator::PATH, "/admins");
        assert!(Booking::ALSO_INVALIDATES.contains(&"copies"));
    }

    #[test]
    fn test_file_part() {
        let part = file_part("a.pdf", "application/pdf", vec![1]);
        assert_eq!(part.field, "file");
        assert!(matches!(Body::from(part), Body::Multipart(_)));
    }
}
