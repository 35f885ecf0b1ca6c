//! Entity models of the Libris backend
//!
//! Field names follow the backend's camelCase JSON. Everything the backend
//! may omit is optional or defaulted so that partial payloads still decode.

use chrono::{DateTime, NaiveDate, Utc};
use libris_core::{Role, SessionUser};
use serde::{Deserialize, Serialize};

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub book_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub category: Option<Category>,
    /// Uploaded cover path
    #[serde(default, alias = "imageUrl", alias = "coverImage")]
    pub image: Option<String>,
    /// Uploaded PDF path, when the book is downloadable
    #[serde(default, alias = "pdfUrl", alias = "filePath")]
    pub pdf: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub published_year: Option<i32>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub total_copies: Option<u32>,
    #[serde(default)]
    pub available_copies: Option<u32>,
}

impl Book {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    pub fn is_downloadable(&self) -> bool {
        self.pdf.as_deref().is_some_and(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CopyStatus {
    #[default]
    Available,
    Borrowed,
    Reserved,
    Lost,
}

impl CopyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Available => "AVAILABLE",
            CopyStatus::Borrowed => "BORROWED",
            CopyStatus::Reserved => "RESERVED",
            CopyStatus::Lost => "LOST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCopy {
    pub id: u64,
    #[serde(default)]
    pub book_id: Option<u64>,
    #[serde(default, alias = "inventoryNo")]
    pub inventory_number: String,
    #[serde(default)]
    pub status: CopyStatus,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

// ============================================================================
// Circulation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Returned,
    Overdue,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Approved,
        BookingStatus::Rejected,
        BookingStatus::Returned,
        BookingStatus::Overdue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::Returned => "RETURNED",
            BookingStatus::Overdue => "OVERDUE",
        }
    }

    pub fn can_approve(&self) -> bool {
        *self == BookingStatus::Pending
    }

    pub fn can_return(&self) -> bool {
        matches!(self, BookingStatus::Approved | BookingStatus::Overdue)
    }
}

/// Short form of a person embedded in other payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRef {
    pub id: u64,
    #[serde(default, alias = "name")]
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: u64,
    #[serde(default, alias = "user")]
    pub student: Option<PersonRef>,
    #[serde(default)]
    pub book: Option<Book>,
    #[serde(default)]
    pub copy_id: Option<u64>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub returned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Booking {
    /// Past due and not yet returned
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status.can_return() && self.due_date.is_some_and(|d| d < today)
    }
}

// ============================================================================
// People
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: u64,
    #[serde(alias = "name")]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub course: Option<u8>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Administrator {
    pub id: u64,
    #[serde(alias = "name")]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "isRead")]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Auth and statistics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(alias = "accessToken")]
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    pub month: String,
    #[serde(default)]
    pub bookings: u64,
    #[serde(default)]
    pub returns: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_books: u64,
    pub total_copies: u64,
    pub total_students: u64,
    pub active_bookings: u64,
    pub pending_bookings: u64,
    pub overdue_bookings: u64,
    pub monthly: Vec<MonthlyPoint>,
    pub by_category: Vec<CategoryCount>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_book_decodes_partial_payload() {
        let book: Book = serde_json::from_value(json!({
            "id": 3,
            "title": "O'tkan kunlar",
            "author": "Abdulla Qodiriy",
            "category": {"id": 1, "name": "Roman"},
            "pdfUrl": "uploads/otkan.pdf"
        }))
        .unwrap();
        assert_eq!(book.category_name(), Some("Roman"));
        assert!(book.is_downloadable());
        assert_eq!(book.isbn, None);
    }

    #[test]
    fn test_booking_overdue() {
        let booking: Booking = serde_json::from_value(json!({
            "id": 9,
            "status": "APPROVED",
            "dueDate": "2024-03-01",
            "student": {"id": 2, "name": "Ali"}
        }))
        .unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert!(booking.is_overdue(today));
        assert!(booking.status.can_return());
        assert!(!booking.status.can_approve());
        assert_eq!(booking.student.unwrap().full_name, "Ali");
    }

    #[test]
    fn test_stats_default_fields() {
        let stats: DashboardStats = serde_json::from_value(json!({"totalBooks": 120})).unwrap();
        assert_eq!(stats.total_books, 120);
        assert!(stats.monthly.is_empty());
    }

    #[test]
    fn test_student_defaults_active() {
        let student: Student =
            serde_json::from_value(json!({"id": 1, "fullName": "Ali", "phone": "+998"})).unwrap();
        assert!(student.active);
    }
}
