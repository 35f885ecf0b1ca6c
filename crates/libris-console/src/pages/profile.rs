//! Profile of the signed-in user

use std::sync::Arc;

use leptos::*;
use libris_core::form::{Field, FieldKind, FormSchema};
use libris_core::{to_record, Locale, Message, Record, SessionUser};
use serde_json::Value;

use super::{editable_phone, label, notify, on_success, payload, phone_payload, PHONE_MASK};
use crate::components::{Avatar, AutoForm, Badge, BadgeVariant, Submission, TableCard};
use crate::hooks::use_mutation;
use crate::state::AppContext;

fn profile_schema(locale: Locale) -> FormSchema {
    let t = |m: Message| locale.t(m);
    FormSchema::new(
        "profile",
        vec![
            Field::new("fullName", t(Message::FullName), FieldKind::Text).required(),
            Field::new("phone", t(Message::Phone), FieldKind::Tel)
                .required()
                .mask(PHONE_MASK)
                .placeholder("(90) 123-45-67"),
            Field::new("password", t(Message::Password), FieldKind::Password)
                .validate_with(|value, _| {
                    let text = value.as_text();
                    (!text.is_empty() && text.len() < 6).then(|| "min 6".to_string())
                }),
        ],
    )
}

/// Form values for a user; the password always starts empty
fn profile_record(user: &SessionUser) -> Record {
    let mut record = to_record(user).unwrap_or_default();
    record.remove("password");
    editable_phone(record)
}

/// Body of a profile update; an empty password keeps the current one
fn profile_body(submission: &Submission) -> serde_json::Map<String, Value> {
    let mut body = payload(&submission.values);
    phone_payload(&mut body);
    if body.get("password").map_or(true, Value::is_null) {
        body.remove("password");
    }
    body
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let save = use_mutation(|client, submission: &Submission| {
        let body = profile_body(submission);
        async move { client.update_profile(&body).await }
    });
    let saved_ctx = ctx.clone();
    on_success(save, move |user| {
        saved_ctx.set_user(user.clone());
        notify(&saved_ctx, Message::Saved);
    });

    let locale = ctx.locale;
    let session = ctx.session;
    let card = move || {
        session.with(|s| s.as_ref().map(|s| s.user.clone())).map(|user| {
            let initials = user.initials();
            let role = user.role.as_str();
            view! {
                <div class="profile-summary">
                    <Avatar initials=initials/>
                    <div>
                        <h2>{user.full_name.clone()}</h2>
                        <Badge text=role variant=BadgeVariant::for_status(role)/>
                    </div>
                </div>
            }
        })
    };

    // Re-created when the locale or the user changes
    let form = move || {
        let user = session.with(|s| s.as_ref().map(|s| s.user.clone()))?;
        Some(view! {
            <AutoForm
                schema=Arc::new(profile_schema(locale.get()))
                initial=profile_record(&user)
                on_submit=Callback::new(move |submission: Submission| save.dispatch(submission))
                busy=save.pending()
            />
        })
    };

    view! {
        <div class="page profile-page">
            <TableCard title=label(&ctx, Message::Profile)>
                {card}
                {form}
            </TableCard>
        </div>
    }
}
