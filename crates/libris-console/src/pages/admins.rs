//! Administrators (super admin only)

use std::sync::Arc;

use leptos::*;
use libris_client::models::Administrator;
use libris_core::form::{Breakpoint, Field, FieldKind, FieldValue, FormSchema, SelectOption};
use libris_core::session::Role;
use libris_core::table::{CellFormat, Column, FilterOption, TableOptions};
use libris_core::{Locale, Message, Record};

use super::{
    actions_column, editable_phone, label, list_params, notify, on_success, payload, phone_payload,
    record_id, record_rows, Editor, ACTIONS_COLUMN, PHONE_MASK,
};
use crate::components::icons::{EditIcon, PlusIcon, TrashIcon};
use crate::components::{AutoForm, CellRenderers, ConfirmDialog, DataTable, Modal, Submission};
use crate::hooks::{use_list, use_mutation};
use crate::state::AppContext;

const STAFF_ROLES: [(Role, &str); 2] = [(Role::Admin, "ADMIN"), (Role::SuperAdmin, "SUPER_ADMIN")];

fn role_options() -> Vec<SelectOption> {
    STAFF_ROLES
        .iter()
        .map(|(role, wire)| SelectOption::new(role.as_str(), *wire))
        .collect()
}

fn admin_schema(locale: Locale, creating: bool) -> FormSchema {
    let t = |m: Message| locale.t(m);
    let mut password = Field::new("password", t(Message::Password), FieldKind::Password);
    if creating {
        password = password.required();
    }
    FormSchema::new(
        "administrator",
        vec![
            Field::new("fullName", t(Message::FullName), FieldKind::Text)
                .required()
                .cols(Breakpoint::Md, 6),
            Field::new("phone", t(Message::Phone), FieldKind::Tel)
                .required()
                .mask(PHONE_MASK)
                .placeholder("(90) 123-45-67")
                .cols(Breakpoint::Md, 6),
            Field::new("role", t(Message::Role), FieldKind::select(role_options()))
                .required()
                .default_value(FieldValue::text("ADMIN"))
                .cols(Breakpoint::Md, 6),
            password.cols(Breakpoint::Md, 6),
        ],
    )
}

fn admin_columns(locale: Locale) -> Vec<Column> {
    let t = |m: Message| locale.t(m);
    vec![
        Column::new("fullName", t(Message::FullName)).sortable(),
        Column::new("phone", t(Message::Phone)),
        Column::new("role", t(Message::Role))
            .format(CellFormat::Badge)
            .filter_options(
                STAFF_ROLES
                    .iter()
                    .map(|(role, wire)| FilterOption::new(role.as_str(), *wire))
                    .collect(),
            ),
        actions_column(t(Message::Actions)),
    ]
}

#[component]
pub fn AdminsPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let admins = use_list::<Administrator>(list_params);
    let rows = record_rows(admins);

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
                Some(id) => client.update::<Administrator, _>(id, &body).await,
                None => client.create::<Administrator, _>(&body).await,
            }
        }
    });
    let remove = use_mutation(|client, id: &u64| {
        let id = *id;
        async move { client.delete::<Administrator>(id).await }
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

    // Nobody deletes their own account from here
    let own_id = ctx.user().map(|u| u.id);
    let cells = move || {
        CellRenderers::new().with(ACTIONS_COLUMN, move |record: &Record| {
            let id = record_id(record).unwrap_or_default();
            let record = record.clone();
            view! {
                <div class="row-actions">
                    <button class="btn btn-icon" on:click=move |_| editor.edit(record.clone())>
                        <EditIcon/>
                    </button>
                    {(own_id != Some(id)).then(|| view! {
                        <button class="btn btn-icon btn-danger" on:click=move |_| pending_delete.set(Some(id))>
                            <TrashIcon/>
                        </button>
                    })}
                </div>
            }
        })
    };

    let locale = ctx.locale;
    let title = label(&ctx, Message::Administrators);
    let table = move || {
        let locale = locale.get();
        view! {
            <DataTable
                columns=admin_columns(locale)
                rows=rows
                loading=admins.loading
                options=TableOptions::new().row_key("id").searchable()
                cells=cells()
                title=title
                export_name="administrators.csv"
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
        let schema = Arc::new(admin_schema(locale.get_untracked(), initial.is_none()));
        view! {
            <AutoForm
                schema=schema
                initial=initial.map(editable_phone).unwrap_or_default()
                on_submit=Callback::new(move |submission: Submission| {
                    save.dispatch((editor.editing_id(), submission))
                })
                on_cancel=Callback::new(move |_| editor.close())
                busy=save.pending()
            />
        }
    };

    view! {
        <div class="page admins-page">
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

#[cfg(test)]
mod tests {
    use super::*;
    use libris_core::form::{FormState, RawInput};

    #[test]
    fn test_role_options_use_wire_values() {
        let values: Vec<_> = role_options().into_iter().map(|o| o.value).collect();
        assert_eq!(values, vec!["ADMIN", "SUPER_ADMIN"]);
        for (role, wire) in STAFF_ROLES {
            let parsed: Role = serde_json::from_value(serde_json::json!(wire)).unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        let mut form = FormState::new(Arc::new(admin_schema(Locale::En, true)));
        assert!(form.input("role", RawInput::text("ROOT")).is_some());
        assert!(form.input("role", RawInput::text("SUPER_ADMIN")).is_none());
    }
}
