//! Bookings: approve, reject with a reason, and register returns

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use leptos::*;
use libris_client::models::{Booking, BookingStatus};
use libris_client::{ListParams, Resource};
use libris_core::form::{Field, FieldKind, FormSchema};
use libris_core::table::{CellFormat, Column, FilterOption, SelectionMode, TableOptions};
use libris_core::{Locale, Message, QueryKey, Record};
use serde_json::Value;

use super::{actions_column, label, list_params, notify, on_success, record_id, record_rows, ACTIONS_COLUMN};
use crate::components::{AutoForm, CellRenderers, DataTable, Modal, Submission};
use crate::hooks::{use_mutation, use_query};
use crate::state::AppContext;

/// Row transition requested from the actions column
#[derive(Debug, Clone, PartialEq)]
enum Transition {
    Approve(u64),
    Reject(u64, Option<String>),
    Return(u64),
}

fn booking_status(record: &Record) -> Option<BookingStatus> {
    record
        .get("status")
        .and_then(|s| serde_json::from_value(s.clone()).ok())
}

/// Parameters of the list read for a status filter
fn bookings_params(status: Option<BookingStatus>) -> ListParams {
    match status {
        Some(status) => list_params().filter("status", status.as_str()),
        None => list_params(),
    }
}

fn bookings_key(status: &Option<BookingStatus>) -> QueryKey {
    bookings_params(*status).key(Booking::ENTITY)
}

/// Approved bookings past their due date show as overdue
fn display_status(record: &Record, today: NaiveDate) -> Option<Value> {
    let booking: Booking = serde_json::from_value(Value::Object(record.clone())).ok()?;
    let status = if booking.is_overdue(today) {
        BookingStatus::Overdue
    } else {
        booking.status
    };
    Some(Value::from(status.as_str()))
}

fn reject_schema(locale: Locale) -> FormSchema {
    FormSchema::new(
        "booking-reject",
        vec![Field::new("reason", locale.t(Message::Reason), FieldKind::Textarea { rows: 3 })],
    )
}

fn booking_columns(locale: Locale) -> Vec<Column> {
    let t = |m: Message| locale.t(m);
    vec![
        Column::new("id", "#")
            .format(CellFormat::Number)
            .sortable()
            .width("64px"),
        Column::new("student", t(Message::Student))
            .path("student.fullName")
            .sortable(),
        Column::new("phone", t(Message::Phone))
            .path("student.phone")
            .hidden(),
        Column::new("book", t(Message::Book)).path("book.title").sortable(),
        Column::new("status", t(Message::Status))
            .computed(|record| display_status(record, Utc::now().date_naive()))
            .format(CellFormat::Badge)
            .filter_options(
                BookingStatus::ALL
                    .iter()
                    .map(|s| FilterOption::new(s.as_str(), s.as_str()))
                    .collect(),
            ),
        Column::new("createdAt", t(Message::CreatedAt))
            .format(CellFormat::Date)
            .sortable(),
        Column::new("dueDate", t(Message::DueDate))
            .format(CellFormat::Date)
            .sortable(),
        Column::new("comment", t(Message::Reason)).hidden(),
        actions_column(t(Message::Actions)),
    ]
}

#[component]
pub fn BookingsPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let status = create_rw_signal(None::<BookingStatus>);
    let bookings = use_query(
        move || status.get(),
        bookings_key,
        |client, status| async move { client.bookings(list_params(), status).await },
    );
    let rows = record_rows(bookings);
    let rejecting = create_rw_signal(None::<u64>);

    let transition = use_mutation(|client, input: &Transition| {
        let input = input.clone();
        async move {
            match input {
                Transition::Approve(id) => client.approve_booking(id).await,
                Transition::Reject(id, reason) => client.reject_booking(id, reason.as_deref()).await,
                Transition::Return(id) => client.return_booking(id).await,
            }
        }
    });
    let done_ctx = ctx.clone();
    on_success(transition, move |_| {
        rejecting.set(None);
        notify(&done_ctx, Message::Saved);
    });

    let tr = store_value(ctx.clone());
    let cells = move || {
        CellRenderers::new().with(ACTIONS_COLUMN, move |record: &Record| {
            let id = record_id(record).unwrap_or_default();
            let status = booking_status(record);
            let t = move |m: Message| tr.with_value(|c| c.t(m));
            view! {
                <div class="row-actions">
                    {status.is_some_and(|s| s.can_approve()).then(|| view! {
                        <button class="btn btn-success" on:click=move |_| transition.dispatch(Transition::Approve(id))>
                            {move || t(Message::Approve)}
                        </button>
                        <button class="btn btn-danger" on:click=move |_| rejecting.set(Some(id))>
                            {move || t(Message::Reject)}
                        </button>
                    })}
                    {status.is_some_and(|s| s.can_return()).then(|| view! {
                        <button class="btn btn-secondary" on:click=move |_| transition.dispatch(Transition::Return(id))>
                            {move || t(Message::Return)}
                        </button>
                    })}
                </div>
            }
        })
    };

    let locale = ctx.locale;
    let title = label(&ctx, Message::Bookings);
    let status_filter = move || {
        view! {
            <select
                class="status-filter"
                aria-label=move || locale.get().t(Message::Status)
                prop:value=move || status.get().map(|s| s.as_str()).unwrap_or_default()
                on:change=move |ev| {
                    let value = event_target_value(&ev);
                    status.set(BookingStatus::ALL.into_iter().find(|s| s.as_str() == value));
                }
            >
                <option value="">{move || locale.get().t(Message::All)}</option>
                {BookingStatus::ALL.into_iter().map(|s| view! {
                    <option value=s.as_str()>{s.as_str()}</option>
                }).collect_view()}
            </select>
        }
    };

    let table = move || {
        let locale = locale.get();
        view! {
            <DataTable
                columns=booking_columns(locale)
                rows=rows
                loading=bookings.loading
                options=TableOptions::new()
                    .row_key("id")
                    .selectable(SelectionMode::Single)
                    .searchable()
                    .with_column_visibility()
                    .with_fullscreen()
                cells=cells()
                title=title
                export_name="bookings.csv"
            >
                {status_filter()}
            </DataTable>
        }
    };

    let reject_form = move || {
        view! {
            <AutoForm
                schema=Arc::new(reject_schema(locale.get_untracked()))
                on_submit=Callback::new(move |submission: Submission| {
                    let reason = submission.values.get("reason").map(|v| v.as_text());
                    if let Some(id) = rejecting.get_untracked() {
                        transition.dispatch(Transition::Reject(id, reason));
                    }
                })
                on_cancel=Callback::new(move |_| rejecting.set(None))
                submit_label=label(&tr.get_value(), Message::Reject)
                busy=transition.pending()
            />
        }
    };

    view! {
        <div class="page bookings-page">
            {table}
            <Modal
                open=Signal::derive(move || rejecting.with(Option::is_some))
                title=label(&ctx, Message::Reject)
                on_close=Callback::new(move |_| rejecting.set(None))
            >
                {reject_form}
            </Modal>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_status_filter_changes_cache_key() {
        assert_ne!(bookings_key(&None), bookings_key(&Some(BookingStatus::Pending)));
        assert_eq!(
            bookings_key(&Some(BookingStatus::Approved)),
            list_params().filter("status", "APPROVED").key("bookings")
        );
    }

    #[test]
    fn test_display_status_marks_overdue() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let late = record(json!({"id": 1, "status": "APPROVED", "dueDate": "2024-05-01"}));
        let fine = record(json!({"id": 2, "status": "APPROVED", "dueDate": "2024-05-20"}));
        assert_eq!(display_status(&late, today), Some(json!("OVERDUE")));
        assert_eq!(display_status(&fine, today), Some(json!("APPROVED")));
    }

    #[test]
    fn test_booking_status_from_record() {
        let pending = record(json!({"id": 3, "status": "PENDING"}));
        assert_eq!(booking_status(&pending), Some(BookingStatus::Pending));
        assert_eq!(booking_status(&record(json!({"id": 4}))), None);
    }
}
