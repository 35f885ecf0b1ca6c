//! Console pages
//!
//! One module per screen. Pages are thin: a hook reads the entity, the
//! records go to a [`DataTable`](crate::components::DataTable), and edits go
//! through an [`AutoForm`](crate::components::AutoForm) whose submission is
//! sent by a mutation. Invalidation refreshes every mounted list.

pub mod admins;
pub mod book_detail;
pub mod bookings;
pub mod books;
pub mod catalog;
pub mod categories;
pub mod dashboard;
pub mod login;
pub mod not_found;
pub mod notifications;
pub mod profile;
pub mod students;

pub use admins::AdminsPage;
pub use book_detail::BookDetailPage;
pub use bookings::BookingsPage;
pub use books::BooksPage;
pub use catalog::CatalogPage;
pub use categories::CategoriesPage;
pub use dashboard::DashboardPage;
pub use login::LoginPage;
pub use not_found::NotFoundPage;
pub use notifications::NotificationsPage;
pub use profile::ProfilePage;
pub use students::StudentsPage;

use leptos::*;
use libris_client::{ApiError, ListParams, QueryClient, Result};
use libris_core::form::{values_to_json, FormValues};
use libris_core::table::{Column, Pin};
use libris_core::{to_record, Message, Paged, Record};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::components::Submission;
use crate::files::read_file;
use crate::hooks::Query;
use crate::state::{AppContext, ToastKind};

/// Rows requested per list screen; the table paginates locally
pub const LIST_PAGE_SIZE: usize = 500;

/// Key of the computed column holding row buttons
pub const ACTIONS_COLUMN: &str = "actions";

/// Parameters of a full list read
pub fn list_params() -> ListParams {
    ListParams::new().page(1, LIST_PAGE_SIZE)
}

// ============================================================================
// Records
// ============================================================================

/// Typed entities as table records
pub fn records<T: Serialize>(items: &[T]) -> Vec<Record> {
    items
        .iter()
        .filter_map(|item| match to_record(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Skipping unserializable row");
                None
            }
        })
        .collect()
}

/// Records of a list query, recomputed only when the data changes
pub fn record_rows<T>(query: Query<Paged<T>>) -> Signal<Vec<Record>>
where
    T: Serialize + Clone + 'static,
{
    create_memo(move |_| {
        query
            .data
            .with(|page| page.as_ref().map(|p| records(&p.items)).unwrap_or_default())
    })
    .into()
}

pub fn record_id(record: &Record) -> Option<u64> {
    record.get("id").and_then(Value::as_u64)
}

/// Column of per-row buttons, drawn by a cell renderer
pub fn actions_column(title: &str) -> Column {
    Column::new(ACTIONS_COLUMN, title)
        .computed(|_| None)
        .not_searchable()
        .pin(Pin::Right)
        .width("1%")
}

// ============================================================================
// Payloads
// ============================================================================

/// Submitted values as a JSON object body
pub fn payload(values: &FormValues) -> Map<String, Value> {
    match values_to_json(values) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Turn numeric strings (select values) into JSON numbers
pub fn numeric(body: &mut Map<String, Value>, fields: &[&str]) {
    for field in fields {
        let parsed = body
            .get(*field)
            .and_then(Value::as_str)
            .and_then(|s| s.trim().parse::<u64>().ok());
        if let Some(n) = parsed {
            body.insert(field.to_string(), Value::from(n));
        }
    }
}

/// Mask of the local part of an Uzbek mobile number
pub const PHONE_MASK: &str = "(99) 999-99-99";

const COUNTRY_CODE: &str = "+998";

/// Local masked number with the country code the backend stores
pub fn international_phone(local: &str) -> String {
    let local = local.trim();
    if local.starts_with('+') || local.is_empty() {
        local.to_string()
    } else {
        format!("{} {}", COUNTRY_CODE, local)
    }
}

/// Stored number reduced to the part the phone mask edits
pub fn local_phone(stored: &str) -> String {
    stored
        .trim()
        .strip_prefix(COUNTRY_CODE)
        .map(str::trim_start)
        .unwrap_or(stored.trim())
        .to_string()
}

/// Replace the masked `phone` field of a body with its international form
pub fn phone_payload(body: &mut Map<String, Value>) {
    let phone = body.get("phone").and_then(Value::as_str).map(international_phone);
    if let Some(phone) = phone {
        body.insert("phone".into(), Value::String(phone));
    }
}

/// Copy of `record` with the phone reduced for editing
pub fn editable_phone(mut record: Record) -> Record {
    let local = record.get("phone").and_then(Value::as_str).map(local_phone);
    if let Some(local) = local {
        record.insert("phone".into(), Value::String(local));
    }
    record
}

/// Which upload endpoint a file goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Pdf,
}

/// Upload the file picked for `field` and store its backend path in `body`
///
/// Without a new file the field keeps a previously stored path; picked-file
/// metadata never reaches the backend.
pub async fn attach_upload(
    client: &QueryClient,
    submission: &Submission,
    field: &str,
    kind: UploadKind,
    body: &mut Map<String, Value>,
) -> Result<()> {
    let Some(file) = submission.file(field) else {
        if body.get(field).is_some_and(|v| !v.is_string()) {
            body.remove(field);
        }
        return Ok(());
    };
    let part = read_file(file).await?;
    let path = match kind {
        UploadKind::Image => client.upload_image(part).await?,
        UploadKind::Pdf => client.upload_pdf(part).await?,
    };
    body.insert(field.to_string(), Value::String(path));
    Ok(())
}

// ============================================================================
// Page helpers
// ============================================================================

/// Create/edit dialog state shared by the CRUD screens
#[derive(Clone, Copy)]
pub struct Editor {
    pub open: RwSignal<bool>,
    /// Record being edited; `None` when creating
    pub target: RwSignal<Option<Record>>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            open: create_rw_signal(false),
            target: create_rw_signal(None),
        }
    }

    pub fn create(&self) {
        self.target.set(None);
        self.open.set(true);
    }

    pub fn edit(&self, record: Record) {
        self.target.set(Some(record));
        self.open.set(true);
    }

    pub fn close(&self) {
        self.open.set(false);
    }

    pub fn editing_id(&self) -> Option<u64> {
        self.target.with_untracked(|t| t.as_ref().and_then(record_id))
    }
}

/// Run `f` each time `action` completes successfully
pub fn on_success<I, O>(action: Action<I, std::result::Result<O, ApiError>>, f: impl Fn(&O) + 'static)
where
    I: 'static,
    O: 'static,
{
    create_effect(move |_| {
        action.value().with(|outcome| {
            if let Some(Ok(value)) = outcome {
                untrack(|| f(value));
            }
        })
    });
}

/// Success toast in the current locale
pub fn notify(ctx: &AppContext, message: Message) {
    ctx.toast(ToastKind::Success, ctx.locale.get_untracked().t(message));
}

/// Localized text, reactive to the current locale
pub fn label(ctx: &AppContext, message: Message) -> Signal<String> {
    let locale = ctx.locale;
    Signal::derive(move || locale.get().t(message).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_core::form::FieldValue;
    use serde_json::json;

    #[derive(Serialize)]
    struct Row {
        id: u64,
        title: &'static str,
    }

    #[test]
    fn test_records_from_typed_rows() {
        let rows = records(&[Row { id: 4, title: "Kecha va kunduz" }]);
        assert_eq!(rows.len(), 1);
        assert_eq!(record_id(&rows[0]), Some(4));
        assert_eq!(rows[0]["title"], json!("Kecha va kunduz"));
    }

    #[test]
    fn test_payload_keeps_numbers_numeric() {
        let mut values = FormValues::new();
        values.insert("pageCount".into(), FieldValue::Number(320.0));
        values.insert("title".into(), FieldValue::text("Alpomish"));
        let body = payload(&values);
        assert_eq!(body["pageCount"], json!(320));
        assert_eq!(body["title"], json!("Alpomish"));
    }

    #[test]
    fn test_numeric_converts_select_ids() {
        let mut body = Map::new();
        body.insert("categoryId".into(), json!("7"));
        body.insert("title".into(), json!("12 stul"));
        numeric(&mut body, &["categoryId", "missing"]);
        assert_eq!(body["categoryId"], json!(7));
        assert_eq!(body["title"], json!("12 stul"));
    }

    #[test]
    fn test_phone_country_code_round_trip() {
        assert_eq!(international_phone("(90) 123-45-67"), "+998 (90) 123-45-67");
        assert_eq!(international_phone("+7 900 000"), "+7 900 000");
        assert_eq!(local_phone("+998 (90) 123-45-67"), "(90) 123-45-67");
        assert_eq!(local_phone("(90) 123-45-67"), "(90) 123-45-67");
    }

    #[test]
    fn test_phone_payload_adds_country_code() {
        let mut body = Map::new();
        body.insert("phone".into(), json!("(91) 765-43-21"));
        phone_payload(&mut body);
        assert_eq!(body["phone"], json!("+998 (91) 765-43-21"));
    }

    #[test]
    fn test_actions_column_is_not_searchable() {
        let column = actions_column("");
        assert_eq!(column.key, ACTIONS_COLUMN);
        assert!(!column.searchable);
        assert_eq!(column.pin, Some(Pin::Right));
    }

    #[test]
    fn test_list_params_request_first_page() {
        let params = list_params();
        assert_eq!(params.page, Some(1));
        assert_eq!(params.size, Some(LIST_PAGE_SIZE));
    }
}
