//! Categories

use std::sync::Arc;

use leptos::*;
use libris_client::models::Category;
use libris_core::form::{Field, FieldKind, FormSchema};
use libris_core::table::{CellFormat, Column, TableOptions};
use libris_core::{Locale, Message, Record};

use super::{
    actions_column, label, list_params, notify, on_success, payload, record_id, record_rows,
    Editor, ACTIONS_COLUMN,
};
use crate::components::icons::{EditIcon, PlusIcon, TrashIcon};
use crate::components::{AutoForm, CellRenderers, ConfirmDialog, DataTable, Modal, Submission};
use crate::hooks::{use_list, use_mutation};
use crate::state::AppContext;

fn category_schema(locale: Locale) -> FormSchema {
    FormSchema::new(
        "category",
        vec![
            Field::new("name", locale.t(Message::Name), FieldKind::Text).required(),
            Field::new("description", locale.t(Message::Description), FieldKind::textarea()),
        ],
    )
}

fn category_columns(locale: Locale) -> Vec<Column> {
    vec![
        Column::new("name", locale.t(Message::Name)).sortable(),
        Column::new("description", locale.t(Message::Description)),
        Column::new("bookCount", locale.t(Message::BookCount))
            .format(CellFormat::Number)
            .sortable()
            .width("120px"),
        actions_column(locale.t(Message::Actions)),
    ]
}

#[component]
pub fn CategoriesPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let categories = use_list::<Category>(list_params);
    let rows = record_rows(categories);

    let editor = Editor::new();
    let pending_delete = create_rw_signal(None::<u64>);

    let save = use_mutation(|client, input: &(Option<u64>, Submission)| {
        let (id, submission) = input.clone();
        async move {
            let body = payload(&submission.values);
            match id {
                Some(id) => client.update::<Category, _>(id, &body).await,
                None => client.create::<Category, _>(&body).await,
            }
        }
    });
    let remove = use_mutation(|client, id: &u64| {
        let id = *id;
        async move { client.delete::<Category>(id).await }
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
    let title = label(&ctx, Message::Categories);
    let table = move || {
        let locale = locale.get();
        view! {
            <DataTable
                columns=category_columns(locale)
                rows=rows
                loading=categories.loading
                options=TableOptions::new().row_key("id").searchable().with_column_visibility()
                cells=cells()
                title=title
                export_name="categories.csv"
            >
                <button class="btn btn-primary" on:click=move |_| editor.create()>
                    <PlusIcon/>
                    {locale.t(Message::Create)}
                </button>
            </DataTable>
        }
    };

    let form = move || {
        view! {
            <AutoForm
                schema=Arc::new(category_schema(locale.get_untracked()))
                initial=editor.target.get().unwrap_or_default()
                on_submit=Callback::new(move |submission: Submission| {
                    save.dispatch((editor.editing_id(), submission))
                })
                on_cancel=Callback::new(move |_| editor.close())
                busy=save.pending()
            />
        }
    };

    view! {
        <div class="page categories-page">
            {table}
            <Modal open=editor.open title=title on_close=Callback::new(move |_| editor.close())>
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
