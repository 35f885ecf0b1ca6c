//! Book detail: bibliographic data and the physical copies of one book

use std::sync::Arc;

use leptos::*;
use leptos_router::{use_params_map, A};
use libris_client::models::{Book, BookCopy, CopyStatus};
use libris_client::{ListParams, Resource};
use libris_core::form::{Field, FieldKind, FormSchema, SelectOption};
use libris_core::table::{CellFormat, Column, FilterOption, TableOptions};
use libris_core::{Locale, Message, Record};
use serde_json::Value;

use super::{actions_column, label, notify, on_success, payload, record_id, record_rows, Editor, ACTIONS_COLUMN};
use crate::components::icons::{EditIcon, PlusIcon, TrashIcon};
use crate::components::{
    AutoForm, Badge, BadgeVariant, CellRenderers, ConfirmDialog, DataTable, ErrorState, InfoRow, LoadingSpinner,
    Modal, Submission, TableCard,
};
use crate::hooks::{use_item, use_mutation, use_query};
use crate::state::AppContext;

const COPY_STATUSES: [CopyStatus; 4] = [
    CopyStatus::Available,
    CopyStatus::Borrowed,
    CopyStatus::Reserved,
    CopyStatus::Lost,
];

fn copy_schema(locale: Locale) -> FormSchema {
    let t = |m: Message| locale.t(m);
    let statuses = COPY_STATUSES
        .iter()
        .map(|s| SelectOption::new(s.as_str(), s.as_str()))
        .collect();
    FormSchema::new(
        "book-copy",
        vec![
            Field::new("inventoryNumber", t(Message::InventoryNumber), FieldKind::Text).required(),
            Field::new("status", t(Message::Status), FieldKind::select(statuses)).required(),
            Field::new("condition", t(Message::Condition), FieldKind::Text),
            Field::new("location", t(Message::Location), FieldKind::Text),
        ],
    )
}

fn copy_columns(locale: Locale) -> Vec<Column> {
    let t = |m: Message| locale.t(m);
    vec![
        Column::new("inventoryNumber", t(Message::InventoryNumber)).sortable(),
        Column::new("status", t(Message::Status))
            .format(CellFormat::Badge)
            .filter_options(
                COPY_STATUSES
                    .iter()
                    .map(|s| FilterOption::new(s.as_str(), s.as_str()))
                    .collect(),
            ),
        Column::new("condition", t(Message::Condition)),
        Column::new("location", t(Message::Location)).sortable(),
        actions_column(t(Message::Actions)),
    ]
}

/// Copies of `book_id`, under the same cache key the copies endpoint uses
fn copies_key(book_id: &u64) -> libris_core::QueryKey {
    ListParams::new().filter("bookId", book_id).key(BookCopy::ENTITY)
}

#[component]
pub fn BookDetailPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let params = use_params_map();
    let book_id = move || {
        params.with(|p| {
            p.get("id")
                .and_then(|id| id.parse::<u64>().ok())
                .unwrap_or_default()
        })
    };

    let book = use_item::<Book>(book_id);
    let copies = use_query(book_id, copies_key, |client, id| async move {
        client.copies_of(id).await
    });
    let rows = record_rows(copies);

    let editor = Editor::new();
    let pending_delete = create_rw_signal(None::<u64>);

    let save = use_mutation(move |client, input: &(Option<u64>, Submission)| {
        let (id, submission) = input.clone();
        let book = book_id();
        async move {
            let mut body = payload(&submission.values);
            body.insert("bookId".into(), Value::from(book));
            match id {
                Some(id) => client.update::<BookCopy, _>(id, &body).await,
                None => client.create::<BookCopy, _>(&body).await,
            }
        }
    });
    let remove = use_mutation(|client, id: &u64| {
        let id = *id;
        async move { client.delete::<BookCopy>(id).await }
    });

    let saved_ctx = ctx.clone();
    on_success(save, move |_| {
        editor.close();
        notify(&saved_ctx, Message::Saved);
    });
    let removed_ctx = ctx.clone();
    on_success(remove, move |_| {
        pending_delete.set(None);
        notify(&removed_ctx, Message::Deleted);
    });

    let url_ctx = store_value(ctx.clone());
    let summary = move || {
        book.data.get().map(|b| {
            let cover = b
                .image
                .as_deref()
                .and_then(|path| url_ctx.with_value(|c| c.query.file_url(path).ok()));
            let category = b.category_name().unwrap_or("-").to_string();
            let copies = format!(
                "{} / {}",
                b.available_copies.unwrap_or_default(),
                b.total_copies.unwrap_or_default()
            );
            let (flag, variant) = if b.is_downloadable() {
                (Message::Yes, BadgeVariant::Success)
            } else {
                (Message::No, BadgeVariant::Default)
            };
            let ctx = url_ctx.get_value();
            view! {
                <div class="book-summary">
                    {cover.map(|src| view! { <img class="book-cover" src=src alt=b.title.clone()/> })}
                    <div class="book-info">
                        <h2 class="book-title">{b.title.clone()}</h2>
                        <InfoRow label=label(&ctx, Message::Author)>{b.author.clone()}</InfoRow>
                        <InfoRow label=label(&ctx, Message::Category)>{category}</InfoRow>
                        <InfoRow label=label(&ctx, Message::Isbn)>{b.isbn.clone().unwrap_or_default()}</InfoRow>
                        <InfoRow label=label(&ctx, Message::Publisher)>{b.publisher.clone().unwrap_or_default()}</InfoRow>
                        <InfoRow label=label(&ctx, Message::PublishedYear)>
                            {b.published_year.map(|y| y.to_string()).unwrap_or_default()}
                        </InfoRow>
                        <InfoRow label=label(&ctx, Message::AvailableCopies)>{copies}</InfoRow>
                        <InfoRow label=label(&ctx, Message::Downloadable)>
                            <Badge text=ctx.locale.get_untracked().t(flag) variant=variant/>
                        </InfoRow>
                        {b.description.clone().map(|d| view! { <p class="book-description">{d}</p> })}
                    </div>
                </div>
            }
        })
    };

    let cells = move || {
        CellRenderers::new().with(ACTIONS_COLUMN, move |record: &Record| {
            let id = record_id(record).unwrap_or_default();
            let record = record.clone();
            view! {
                <div class="row-actions">
                    <button class="btn btn-icon" on:click=move |_| editor.edit(record.clone())>
                        <EditIcon/>
                    </button>
                    <button class="btn btn-icon btn-danger" on:click=move |_| pending_delete.set(Some(id))>
                        <TrashIcon/>
                    </button>
                </div>
            }
        })
    };

    let locale = ctx.locale;
    let table = move || {
        let locale = locale.get();
        view! {
            <DataTable
                columns=copy_columns(locale)
                rows=rows
                loading=copies.loading
                options=TableOptions::new().row_key("id").searchable()
                cells=cells()
                title=label(&url_ctx.get_value(), Message::Copies)
                export_name="copies.csv"
            >
                <button class="btn btn-primary" on:click=move |_| editor.create()>
                    <PlusIcon/>
                    {locale.t(Message::Create)}
                </button>
            </DataTable>
        }
    };

    let form = move || {
        let schema = Arc::new(copy_schema(locale.get_untracked()));
        view! {
            <AutoForm
                schema=schema
                initial=editor.target.get().unwrap_or_default()
                on_submit=Callback::new(move |submission: Submission| save.dispatch((editor.editing_id(), submission)))
                on_cancel=Callback::new(move |_| editor.close())
                busy=save.pending()
            />
        }
    };
    let back = move || url_ctx.with_value(|c| c.href("books"));

    view! {
        <div class="page book-detail-page">
            <A href=back class="btn btn-link">{move || locale.get().t(Message::Back)}</A>
            <TableCard title=label(&ctx, Message::Book)>
                <Show when=move || book.loading.get() && book.data.with(Option::is_none)>
                    <LoadingSpinner/>
                </Show>
                <Show when=move || book.error.with(Option::is_some)>
                    <ErrorState
                        message=book.error.get_untracked().unwrap_or_default()
                        retry=Callback::new(move |_| book.refetch())
                    />
                </Show>
                {summary}
            </TableCard>
            {table}
            <Modal open=editor.open title=label(&ctx, Message::Copies) on_close=Callback::new(move |_| editor.close())>
                {form}
            </Modal>
            <ConfirmDialog
                open=Signal::derive(move || pending_delete.with(Option::is_some))
                on_confirm=Callback::new(move |_| {
                    if let Some(id) = pending_delete.get_untracked() {
                        remove.dispatch(id);
                    }
                })
                on_cancel=Callback::new(move |_| pending_delete.set(None))
                busy=remove.pending()
            />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copies_key_matches_endpoint_params() {
        let key = copies_key(&12);
        assert_eq!(key, ListParams::new().filter("bookId", 12).key("copies"));
    }

    #[test]
    fn test_copy_schema_requires_inventory_number() {
        let schema = copy_schema(Locale::En);
        assert!(schema.field("inventoryNumber").unwrap().required);
        assert_eq!(schema.step_count(), 1);
    }

    #[test]
    fn test_copy_status_filter_lists_every_status() {
        let columns = copy_columns(Locale::En);
        let status = columns.iter().find(|c| c.key == "status").unwrap();
        match &status.filter {
            Some(libris_core::table::ColumnFilter::Options(options)) => assert_eq!(options.len(), 4),
            other => panic!("unexpected filter {:?}", other),
        }
    }
}
