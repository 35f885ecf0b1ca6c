//! Books: catalog management with a three-step form and file uploads

use std::rc::Rc;
use std::sync::Arc;

use chrono::Duration;
use leptos::*;
use leptos_router::A;
use libris_client::models::{Book, Category};
use libris_core::form::{Breakpoint, Condition, Field, FieldKind, FieldValue, FormSchema, SelectOption};
use libris_core::table::{CellFormat, Column, PaginationConfig, SelectionMode, TableOptions};
use libris_core::{display_text, Locale, Message, Record};
use serde_json::Value;

use super::{
    actions_column, attach_upload, list_params, notify, numeric, on_success, payload,
    record_id, record_rows, Editor, UploadKind, ACTIONS_COLUMN,
};
use crate::components::icons::{EditIcon, PlusIcon, TrashIcon};
use crate::components::{AutoForm, CellRenderer, CellRenderers, ConfirmDialog, DataTable, ErrorState, Modal, Submission};
use crate::hooks::{use_list, use_mutation};
use crate::state::AppContext;

/// Seconds between autosaves of a new-book draft
const DRAFT_AUTOSAVE_SECS: i64 = 30;

pub(crate) fn language_options() -> Vec<SelectOption> {
    Locale::ALL
        .into_iter()
        .map(|l| SelectOption::new(l.label(), l.code()))
        .collect()
}

/// Book form; only the create form keeps a draft
pub(crate) fn book_schema(locale: Locale, categories: &[Category], creating: bool) -> FormSchema {
    let t = |m: Message| locale.t(m);
    let category_options = categories
        .iter()
        .map(|c| SelectOption::new(c.name.clone(), c.id.to_string()))
        .collect();
    let whole_number = |min: f64, max: Option<f64>| FieldKind::Number {
        min: Some(min),
        max,
        step: Some(1.0),
    };

    let fields = vec![
        Field::new("title", t(Message::Title), FieldKind::Text)
            .required()
            .cols(Breakpoint::Md, 8),
        Field::new("author", t(Message::Author), FieldKind::Text)
            .required()
            .cols(Breakpoint::Md, 4),
        Field::new("categoryId", t(Message::Category), FieldKind::select(category_options))
            .required()
            .cols(Breakpoint::Md, 6),
        Field::new("isbn", t(Message::Isbn), FieldKind::Text)
            .mask("999-9-99999-999-9")
            .placeholder("978-9-94336-012-1")
            .cols(Breakpoint::Md, 6),
        Field::new("language", t(Message::Language), FieldKind::select(language_options()))
            .cols(Breakpoint::Md, 4),
        Field::new("publisher", t(Message::Publisher), FieldKind::Text)
            .step(1)
            .cols(Breakpoint::Md, 6),
        Field::new("publishedYear", t(Message::PublishedYear), whole_number(1000.0, Some(2100.0)))
            .step(1)
            .cols(Breakpoint::Md, 3),
        Field::new("pageCount", t(Message::PageCount), whole_number(1.0, None))
            .step(1)
            .cols(Breakpoint::Md, 3),
        Field::new("totalCopies", t(Message::TotalCopies), whole_number(0.0, None))
            .step(1)
            .cols(Breakpoint::Md, 4),
        Field::new("description", t(Message::Description), FieldKind::textarea()).step(1),
        Field::new("image", t(Message::Cover), FieldKind::file("image/*"))
            .step(2)
            .group(t(Message::Files)),
        Field::new("downloadable", t(Message::Downloadable), FieldKind::Switch)
            .step(2)
            .group(t(Message::Files)),
        Field::new("pdf", t(Message::PdfFile), FieldKind::file("application/pdf"))
            .step(2)
            .group(t(Message::Files))
            .visible_when("downloadable", Condition::Equals(FieldValue::Bool(true))),
    ];

    let id = if creating { "book-new" } else { "book-edit" };
    let schema = FormSchema::new(id, fields).steps([
        t(Message::MainInfo),
        t(Message::Details),
        t(Message::Files),
    ]);
    if creating {
        schema.persisted().autosave_every(Duration::seconds(DRAFT_AUTOSAVE_SECS))
    } else {
        schema
    }
}

/// Book record prepared for the edit form
fn edit_record(mut record: Record) -> Record {
    if record.get("categoryId").map_or(true, Value::is_null) {
        if let Some(id) = record.get("category").and_then(|c| c.get("id")).cloned() {
            record.insert("categoryId".into(), id);
        }
    }
    let has_pdf = record
        .get("pdf")
        .and_then(Value::as_str)
        .is_some_and(|p| !p.is_empty());
    record.insert("downloadable".into(), Value::Bool(has_pdf));
    record
}

pub(crate) fn book_columns(locale: Locale) -> Vec<Column> {
    let t = |m: Message| locale.t(m);
    vec![
        Column::new("image", t(Message::Cover))
            .format(CellFormat::Image)
            .not_searchable()
            .width("64px"),
        Column::new("title", t(Message::Title)).sortable(),
        Column::new("author", t(Message::Author))
            .sortable()
            .filter_distinct(),
        Column::new("category", t(Message::Category))
            .path("category.name")
            .sortable()
            .filter_distinct(),
        Column::new("isbn", t(Message::Isbn)).hidden(),
        Column::new("language", t(Message::Language))
            .filter_distinct()
            .hidden(),
        Column::new("publishedYear", t(Message::PublishedYear))
            .format(CellFormat::Number)
            .sortable()
            .hidden(),
        Column::new("availableCopies", t(Message::AvailableCopies))
            .format(CellFormat::Number)
            .sortable(),
        Column::new("totalCopies", t(Message::TotalCopies))
            .format(CellFormat::Number)
            .sortable(),
        actions_column(t(Message::Actions)),
    ]
}

#[component]
pub fn BooksPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let books = use_list::<Book>(list_params);
    let categories = use_list::<Category>(list_params);
    let rows = record_rows(books);

    let editor = Editor::new();
    let pending_delete = create_rw_signal(Vec::<u64>::new());
    let selected = create_rw_signal(Vec::<u64>::new());

    let save = use_mutation(|client, input: &(Option<u64>, Submission)| {
        let (id, submission) = input.clone();
        async move {
            let mut body = payload(&submission.values);
            attach_upload(&client, &submission, "image", UploadKind::Image, &mut body).await?;
            attach_upload(&client, &submission, "pdf", UploadKind::Pdf, &mut body).await?;
            if body.remove("downloadable") != Some(Value::Bool(true)) {
                body.insert("pdf".into(), Value::Null);
            }
            numeric(&mut body, &["categoryId"]);
            match id {
                Some(id) => client.update::<Book, _>(id, &body).await,
                None => client.create::<Book, _>(&body).await,
            }
        }
    });
    let remove = use_mutation(|client, id: &u64| {
        let id = *id;
        async move { client.delete::<Book>(id).await }
    });

    let saved_ctx = ctx.clone();
    on_success(save, move |_| {
        editor.close();
        notify(&saved_ctx, Message::Saved);
    });
    let removed_ctx = ctx.clone();
    on_success(remove, move |_| {
        pending_delete.set(Vec::new());
        selected.set(Vec::new());
        notify(&removed_ctx, Message::Deleted);
    });

    let submit = Callback::new(move |submission: Submission| {
        save.dispatch((editor.editing_id(), submission));
    });
    let confirm_delete = Callback::new(move |_| {
        for id in pending_delete.get_untracked() {
            remove.dispatch(id);
        }
    });

    let href_ctx = store_value(ctx.clone());
    let cells = move || {
        CellRenderers::new().with(ACTIONS_COLUMN, move |record: &Record| {
            let id = record_id(record).unwrap_or_default();
            let record = record.clone();
            let detail = href_ctx.with_value(|c| c.href(&format!("books/{}", id)));
            view! {
                <div class="row-actions">
                    <A href=detail class="btn btn-link">{move || href_ctx.with_value(|c| c.t(Message::Details))}</A>
                    <button class="btn btn-icon" on:click=move |_| editor.edit(edit_record(record.clone()))>
                        <EditIcon/>
                    </button>
                    <button class="btn btn-icon btn-danger" on:click=move |_| pending_delete.set(vec![id])>
                        <TrashIcon/>
                    </button>
                </div>
            }
        })
    };
    let expanded: CellRenderer = Rc::new(|record: &Record| {
        let description = record.get("description").map(display_text).unwrap_or_default();
        let publisher = record.get("publisher").map(display_text).unwrap_or_default();
        view! {
            <div class="row-detail">
                <p class="row-detail-publisher">{publisher}</p>
                <p>{description}</p>
            </div>
        }
        .into_view()
    });

    let locale = ctx.locale;
    let table = move || {
        let locale = locale.get();
        let options = TableOptions::new()
            .row_key("id")
            .paginated(PaginationConfig::default())
            .selectable(SelectionMode::Multiple)
            .searchable()
            .with_column_visibility()
            .with_fullscreen()
            .expandable();
        let on_change = Callback::new(move |(_, records): (Vec<_>, Vec<Record>)| {
            selected.set(records.iter().filter_map(record_id).collect());
        });
        view! {
            <DataTable
                columns=book_columns(locale)
                rows=rows
                loading=books.loading
                options=options
                cells=cells()
                expanded=expanded.clone()
                on_change=on_change
                export_name="books.csv"
            >
                <Show when=move || selected.with(|s| !s.is_empty())>
                    <button class="btn btn-danger" on:click=move |_| pending_delete.set(selected.get_untracked())>
                        <TrashIcon/>
                        {move || format!("{} ({})", locale.t(Message::Delete), selected.with(Vec::len))}
                    </button>
                </Show>
                <button class="btn btn-primary" on:click=move |_| editor.create()>
                    <PlusIcon/>
                    {locale.t(Message::Create)}
                </button>
            </DataTable>
        }
    };

    let form_ctx = store_value(ctx.clone());
    let form = move || {
        let locale = form_ctx.with_value(|c| c.locale.get_untracked());
        let initial = editor.target.get();
        let cats = categories.data.with(|c| c.as_ref().map(|p| p.items.clone()).unwrap_or_default());
        let schema = Arc::new(book_schema(locale, &cats, initial.is_none()));
        view! {
            <AutoForm
                schema=schema
                initial=initial.unwrap_or_default()
                on_submit=submit
                on_cancel=Callback::new(move |_| editor.close())
                busy=save.pending()
                history=true
            />
        }
    };
    let dialog_title = Signal::derive(move || {
        let message = if editor.target.with(Option::is_some) { Message::Edit } else { Message::Create };
        locale.get().t(message).to_string()
    });

    view! {
        <div class="page books-page">
            <Show when=move || books.error.with(Option::is_some)>
                <ErrorState
                    message=books.error.get_untracked().unwrap_or_default()
                    retry=Callback::new(move |_| books.refetch())
                />
            </Show>
            {table}
            <Modal open=editor.open title=dialog_title on_close=Callback::new(move |_| editor.close()) wide=true>
                {form}
            </Modal>
            <ConfirmDialog
                open=Signal::derive(move || pending_delete.with(|p| !p.is_empty()))
                on_confirm=confirm_delete
                on_cancel=Callback::new(move |_| pending_delete.set(Vec::new()))
                busy=remove.pending()
            />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn category(id: u64, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            description: None,
            book_count: None,
        }
    }

    #[test]
    fn test_book_schema_steps_and_draft() {
        let schema = book_schema(Locale::En, &[category(1, "Roman")], true);
        assert_eq!(schema.step_count(), 3);
        assert!(schema.persist);
        assert_eq!(schema.autosave, Some(Duration::seconds(DRAFT_AUTOSAVE_SECS)));
        match &schema.field("categoryId").unwrap().kind {
            FieldKind::Select { options, .. } => assert_eq!(options[0].value, "1"),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_edit_schema_is_not_persisted() {
        let schema = book_schema(Locale::Uz, &[], false);
        assert!(!schema.persist);
        assert!(schema.autosave.is_none());
    }

    #[test]
    fn test_edit_record_binds_category_and_pdf_switch() {
        let record = json!({
            "id": 2,
            "title": "Sariq devni minib",
            "category": {"id": 5, "name": "Bolalar"},
            "pdf": "uploads/sariq.pdf"
        });
        let record = edit_record(record.as_object().unwrap().clone());
        assert_eq!(record["categoryId"], json!(5));
        assert_eq!(record["downloadable"], json!(true));
    }

    #[test]
    fn test_book_columns_end_with_actions() {
        let columns = book_columns(Locale::Ru);
        assert_eq!(columns.last().unwrap().key, ACTIONS_COLUMN);
        assert_eq!(columns[1].title, "Название");
    }
}
