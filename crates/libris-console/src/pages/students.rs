//! Students

use std::sync::Arc;

use chrono::Duration;
use leptos::*;
use libris_client::models::Student;
use libris_core::form::{Breakpoint, Field, FieldKind, FieldValue, FormSchema};
use libris_core::table::{CellFormat, Column, PaginationConfig, TableOptions};
use libris_core::{Locale, Message, Record};

use super::{
    actions_column, editable_phone, label, list_params, notify, on_success, payload, phone_payload,
    record_id, record_rows, Editor, ACTIONS_COLUMN, PHONE_MASK,
};
use crate::components::icons::{EditIcon, PlusIcon, TrashIcon};
use crate::components::{AutoForm, CellRenderers, ConfirmDialog, DataTable, Modal, Submission};
use crate::hooks::{use_list, use_mutation};
use crate::state::AppContext;

fn student_schema(locale: Locale, creating: bool) -> FormSchema {
    let t = |m: Message| locale.t(m);
    let mut password = Field::new("password", t(Message::Password), FieldKind::Password)
        .cols(Breakpoint::Md, 6)
        .validate_with(|value, _| {
            let text = value.as_text();
            (!text.is_empty() && text.len() < 6).then(|| "min 6".to_string())
        });
    if creating {
        password = password.required();
    }

    let fields = vec![
        Field::new("fullName", t(Message::FullName), FieldKind::Text)
            .required()
            .cols(Breakpoint::Md, 6),
        Field::new("phone", t(Message::Phone), FieldKind::Tel)
            .required()
            .mask(PHONE_MASK)
            .placeholder("(90) 123-45-67")
            .cols(Breakpoint::Md, 6),
        Field::new("studentId", t(Message::StudentId), FieldKind::Text)
            .mask("aa-999999")
            .cols(Breakpoint::Md, 4),
        Field::new("faculty", t(Message::Faculty), FieldKind::Text).cols(Breakpoint::Md, 4),
        Field::new("group", t(Message::Group), FieldKind::Text).cols(Breakpoint::Md, 4),
        Field::new(
            "course",
            t(Message::Course),
            FieldKind::Range {
                min: 1.0,
                max: 6.0,
                step: 1.0,
            },
        )
        .default_value(FieldValue::Number(1.0))
        .cols(Breakpoint::Md, 6),
        Field::new("active", t(Message::Active), FieldKind::Switch)
            .default_value(FieldValue::Bool(true))
            .cols(Breakpoint::Md, 6),
        password,
    ];

    let schema = FormSchema::new(if creating { "student-new" } else { "student-edit" }, fields);
    if creating {
        schema.persisted().autosave_every(Duration::seconds(20))
    } else {
        schema
    }
}

fn student_columns(locale: Locale) -> Vec<Column> {
    let t = |m: Message| locale.t(m);
    vec![
        Column::new("fullName", t(Message::FullName)).sortable(),
        Column::new("phone", t(Message::Phone)),
        Column::new("studentId", t(Message::StudentId)).sortable(),
        Column::new("faculty", t(Message::Faculty))
            .sortable()
            .filter_distinct(),
        Column::new("group", t(Message::Group)).filter_distinct(),
        Column::new("course", t(Message::Course))
            .format(CellFormat::Number)
            .sortable()
            .filter_distinct(),
        Column::new("active", t(Message::Active)).format(CellFormat::Boolean {
            yes: t(Message::Yes).to_string(),
            no: t(Message::No).to_string(),
        }),
        actions_column(t(Message::Actions)),
    ]
}

#[component]
pub fn StudentsPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let students = use_list::<Student>(list_params);
    let rows = record_rows(students);

    let editor = Editor::new();
    let pending_delete = create_rw_signal(None::<u64>);

    let save = use_mutation(|client, input: &(Option<u64>, Submission)| {
        let (id, submission) = input.clone();
        async move {
            let mut body = payload(&submission.values);
            phone_payload(&mut body);
            if body.get("password").is_some_and(|p| p.is_null()) {
                body.remove("password");
            }
            match id {
                Some(id) => client.update::<Student, _>(id, &body).await,
                None => client.create::<Student, _>(&body).await,
            }
        }
    });
    let remove = use_mutation(|client, id: &u64| {
        let id = *id;
        async move { client.delete::<Student>(id).await }
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
    let title = label(&ctx, Message::Students);
    let table = move || {
        let locale = locale.get();
        view! {
            <DataTable
                columns=student_columns(locale)
                rows=rows
                loading=students.loading
                options=TableOptions::new()
                    .row_key("id")
                    .paginated(PaginationConfig::default().with_page_size(20))
                    .searchable()
                    .with_column_visibility()
                    .with_fullscreen()
                cells=cells()
                title=title
                export_name="students.csv"
            >
                <button class="btn btn-primary" on:click=move |_| editor.create()>
                    <PlusIcon/>
                    {locale.t(Message::Create)}
                </button>
            </DataTable>
        }
    };

    let form = move || {
        let initial = editor.target.get();
        let schema = Arc::new(student_schema(locale.get_untracked(), initial.is_none()));
        view! {
            <AutoForm
                schema=schema
                initial=initial.map(editable_phone).unwrap_or_default()
                on_submit=Callback::new(move |submission: Submission| {
                    save.dispatch((editor.editing_id(), submission))
                })
                on_cancel=Callback::new(move |_| editor.close())
                busy=save.pending()
                history=true
            />
        }
    };

    view! {
        <div class="page students-page">
            {table}
            <Modal open=editor.open title=title on_close=Callback::new(move |_| editor.close()) wide=true>
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
    use libris_core::form::{FormState, RawInput};

    #[test]
    fn test_password_required_only_when_creating() {
        assert!(student_schema(Locale::En, true).field("password").unwrap().required);
        assert!(!student_schema(Locale::En, false).field("password").unwrap().required);
    }

    #[test]
    fn test_phone_is_masked() {
        let mut form = FormState::new(Arc::new(student_schema(Locale::En, true)));
        form.input("phone", RawInput::text("901234567"));
        assert_eq!(form.value("phone").unwrap().as_text(), "(90) 123-45-67");
    }

    #[test]
    fn test_short_password_rejected() {
        let mut form = FormState::new(Arc::new(student_schema(Locale::En, false)));
        assert!(form.input("password", RawInput::text("abc")).is_some());
        assert!(form.input("password", RawInput::text("abcdef")).is_none());
    }
}
