//! Notifications

use leptos::*;
use libris_client::models::Notification;
use libris_core::table::{CellFormat, Column, FilterOption, SelectionMode, TableOptions};
use libris_core::{Locale, Message, Record};
use serde_json::Value;

use super::{actions_column, label, list_params, notify, on_success, record_id, record_rows, ACTIONS_COLUMN};
use crate::components::icons::CheckIcon;
use crate::components::{CellRenderers, DataTable};
use crate::hooks::{use_list, use_mutation};
use crate::state::AppContext;

fn is_unread(record: &Record) -> bool {
    !record.get("read").and_then(Value::as_bool).unwrap_or(false)
}

/// Ids among `records` that still need marking
fn unread_ids(records: &[Record]) -> Vec<u64> {
    records
        .iter()
        .filter(|r| is_unread(r))
        .filter_map(record_id)
        .collect()
}

fn notification_columns(locale: Locale) -> Vec<Column> {
    let t = |m: Message| locale.t(m);
    vec![
        Column::new("title", t(Message::Title)).sortable(),
        Column::new("message", t(Message::Body)),
        Column::new("createdAt", t(Message::CreatedAt))
            .format(CellFormat::Date)
            .sortable(),
        Column::new("read", t(Message::MarkRead))
            .format(CellFormat::Boolean {
                yes: t(Message::Yes).to_string(),
                no: t(Message::No).to_string(),
            })
            .filter_options(vec![
                FilterOption::new(t(Message::Yes), "true"),
                FilterOption::new(t(Message::No), "false"),
            ]),
        actions_column(t(Message::Actions)),
    ]
}

#[component]
pub fn NotificationsPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let notifications = use_list::<Notification>(list_params);
    let rows = record_rows(notifications);
    let selected = create_rw_signal(Vec::<u64>::new());

    let mark_read = use_mutation(|client, ids: &Vec<u64>| {
        let ids = ids.clone();
        async move {
            for id in &ids {
                client.mark_notification_read(*id).await?;
            }
            Ok(ids.len())
        }
    });
    let done_ctx = ctx.clone();
    on_success(mark_read, move |_| {
        selected.set(Vec::new());
        notify(&done_ctx, Message::Saved);
    });

    let cells = move || {
        CellRenderers::new().with(ACTIONS_COLUMN, move |record: &Record| {
            let id = record_id(record).unwrap_or_default();
            is_unread(record).then(|| {
                view! {
                    <button class="btn btn-icon" on:click=move |_| mark_read.dispatch(vec![id])>
                        <CheckIcon/>
                    </button>
                }
            })
        })
    };

    let locale = ctx.locale;
    let title = label(&ctx, Message::Notifications);
    let table = move || {
        let locale = locale.get();
        let on_change = Callback::new(move |(_, records): (Vec<_>, Vec<Record>)| {
            selected.set(unread_ids(&records));
        });
        view! {
            <DataTable
                columns=notification_columns(locale)
                rows=rows
                loading=notifications.loading
                options=TableOptions::new()
                    .row_key("id")
                    .selectable(SelectionMode::Multiple)
                    .searchable()
                cells=cells()
                on_change=on_change
                title=title
            >
                <Show when=move || selected.with(|s| !s.is_empty())>
                    <button
                        class="btn btn-primary"
                        disabled=move || mark_read.pending().get()
                        on:click=move |_| mark_read.dispatch(selected.get_untracked())
                    >
                        {move || format!("{} ({})", locale.t(Message::MarkRead), selected.with(Vec::len))}
                    </button>
                </Show>
            </DataTable>
        }
    };

    view! { <div class="page notifications-page">{table}</div> }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_unread_ids_skip_read_rows() {
        let rows = vec![
            record(json!({"id": 1, "read": false})),
            record(json!({"id": 2, "read": true})),
            record(json!({"id": 3})),
        ];
        assert_eq!(unread_ids(&rows), vec![1, 3]);
    }

    #[test]
    fn test_read_column_filters_on_flag() {
        let columns = notification_columns(Locale::Ru);
        let read = columns.iter().find(|c| c.key == "read").unwrap();
        assert!(read.filter.is_some());
        assert!(columns.iter().any(|c| c.key == ACTIONS_COLUMN));
    }
}
